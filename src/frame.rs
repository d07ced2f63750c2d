//! Frame data handed to the pipeline by the capture driver

use std::time::Instant;

use image::RgbaImage;

use crate::geometry::{CropRect, ImageSize};

/// A single frame of RGBA pixels
#[derive(Debug)]
pub struct Frame {
    /// Raw RGBA pixel data, row-major
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when the frame was captured
    pub timestamp: Instant,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    pub fn size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }

    /// Extract the pixel crop for one rectangle, clamped to frame bounds.
    /// Rows missing from a short data buffer stay zeroed.
    pub fn crop(&self, rect: &CropRect) -> RgbaImage {
        let (x, y, width, height) = rect.pixel_bounds();

        let x = x.min(self.width);
        let y = y.min(self.height);
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);

        let row_bytes = (width * 4) as usize;
        let mut buffer = vec![0u8; (width * height * 4) as usize];

        for row in 0..height {
            let src_start = (((y + row) * self.width + x) * 4) as usize;
            let src_end = src_start + row_bytes;
            if src_end <= self.data.len() {
                let dst_start = row as usize * row_bytes;
                buffer[dst_start..dst_start + row_bytes]
                    .copy_from_slice(&self.data[src_start..src_end]);
            }
        }

        RgbaImage::from_raw(width, height, buffer)
            .expect("crop buffer sized to its dimensions")
    }
}
