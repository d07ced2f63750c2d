//! Observation geometry
//!
//! Converts detector output (per-character quadrilaterals in normalized image
//! coordinates) into pixel-space crop rectangles for the recognizer.

use crate::error::PipelineError;

/// A point in normalized image coordinates, both axes in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four corner points of one character's quadrilateral, normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterBox {
    pub bottom_left: Point2D,
    pub bottom_right: Point2D,
    pub top_left: Point2D,
    pub top_right: Point2D,
}

/// One detected line/run of text: its character boxes in reading order.
///
/// Produced by the external detector, one per candidate text region per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextObservation {
    pub character_boxes: Vec<CharacterBox>,
}

impl TextObservation {
    pub fn new(character_boxes: Vec<CharacterBox>) -> Self {
        Self { character_boxes }
    }

    /// An observation with no character boxes contributes no crop
    pub fn is_empty(&self) -> bool {
        self.character_boxes.is_empty()
    }
}

/// Pixel dimensions of the source frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned crop rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Integer pixel bounds (x, y, width, height), rounded to nearest
    pub fn pixel_bounds(&self) -> (u32, u32, u32, u32) {
        (
            self.x.round() as u32,
            self.y.round() as u32,
            self.width.round() as u32,
            self.height.round() as u32,
        )
    }
}

/// Reduce a frame's text observations to pixel-space crop rectangles.
///
/// Per observation: the union bounding box of its character quadrilaterals is
/// taken in normalized space and scaled to pixels. Observations with no
/// character boxes are skipped; input order is otherwise preserved. Pure
/// function, safe to call from the capture callback thread.
///
/// Coordinates are a producer-guaranteed precondition: all corner points must
/// lie in [0, 1]. Use [`reduce_observations_checked`] when the producer is
/// untrusted.
pub fn reduce_observations(
    observations: &[TextObservation],
    image_size: ImageSize,
) -> Vec<CropRect> {
    observations
        .iter()
        .filter_map(|observation| reduce_one(observation, image_size))
        .collect()
}

/// Validating variant of [`reduce_observations`].
///
/// Rejects non-finite or out-of-[0, 1] corner coordinates with
/// [`PipelineError::InvalidGeometry`] instead of propagating garbage bounds.
pub fn reduce_observations_checked(
    observations: &[TextObservation],
    image_size: ImageSize,
) -> Result<Vec<CropRect>, PipelineError> {
    for (index, observation) in observations.iter().enumerate() {
        for character_box in &observation.character_boxes {
            validate_box(index, character_box)?;
        }
    }
    Ok(reduce_observations(observations, image_size))
}

fn reduce_one(observation: &TextObservation, image_size: ImageSize) -> Option<CropRect> {
    if observation.is_empty() {
        return None;
    }

    let mut x_min = f64::INFINITY;
    let mut x_max: f64 = 0.0;
    let mut y_min = f64::INFINITY;
    let mut y_max: f64 = 0.0;

    // x bounds come from the bottom corners, y bounds from the right-side
    // corners; top_left is not consulted.
    for rect in &observation.character_boxes {
        x_min = x_min.min(rect.bottom_left.x);
        x_max = x_max.max(rect.bottom_right.x);
        y_min = y_min.min(rect.bottom_right.y);
        y_max = y_max.max(rect.top_right.y);
    }

    let width = f64::from(image_size.width);
    let height = f64::from(image_size.height);

    Some(CropRect {
        x: x_min * width,
        y: y_min * height,
        width: (x_max - x_min) * width,
        height: (y_max - y_min) * height,
    })
}

fn validate_box(observation: usize, character_box: &CharacterBox) -> Result<(), PipelineError> {
    let corners = [
        ("bottom_left", character_box.bottom_left),
        ("bottom_right", character_box.bottom_right),
        ("top_left", character_box.top_left),
        ("top_right", character_box.top_right),
    ];
    for (name, point) in corners {
        for (axis, value) in [("x", point.x), ("y", point.y)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::InvalidGeometry {
                    observation,
                    detail: format!("{name}.{axis} = {value} outside normalized range"),
                });
            }
        }
    }
    Ok(())
}
