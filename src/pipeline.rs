//! Frame processing pipeline
//!
//! Wires the external detector and recognizer to the crop reducer and the
//! result aggregator: detect, reduce to crops, recognize each crop, aggregate.
//! The entry point is plain-function shaped so any frame-capture driver can
//! invoke it from its callback thread.

use std::time::Instant;

use anyhow::Result;
use image::RgbaImage;
use tracing::{debug, warn};

use crate::aggregate::ResultAggregator;
use crate::frame::Frame;
use crate::geometry::{reduce_observations, TextObservation};

/// Detects candidate text regions in a frame.
///
/// Observations for a single frame are delivered atomically as one sequence.
pub trait Detector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<TextObservation>>;
}

/// Recognizes the text inside one pixel crop
pub trait Recognizer {
    fn recognize(&mut self, crop: &RgbaImage) -> Result<String>;
}

/// Orchestrates one frame cycle: detect, reduce, recognize, aggregate.
///
/// Collaborators are injected at construction; there are no ambient services.
pub struct FramePipeline<D: Detector, R: Recognizer> {
    detector: D,
    recognizer: R,
    aggregator: ResultAggregator,
}

impl<D: Detector, R: Recognizer> FramePipeline<D, R> {
    pub fn new(detector: D, recognizer: R, aggregator: ResultAggregator) -> Self {
        Self {
            detector,
            recognizer,
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &ResultAggregator {
        &self.aggregator
    }

    /// The current aggregated string, readable synchronously at any time
    pub fn current_text(&self) -> String {
        self.aggregator.current()
    }

    /// Run one frame through the pipeline.
    ///
    /// Never fails: a detector error degrades to an empty observation set and
    /// a recognizer error to an empty fragment, so every frame still produces
    /// a cycle that overwrites the aggregate.
    pub fn process_frame(&mut self, frame: &Frame) {
        let start = Instant::now();

        let observations = match self.detector.detect(frame) {
            Ok(observations) => observations,
            Err(error) => {
                warn!("detector failed, treating frame as empty: {error:#}");
                Vec::new()
            }
        };

        let crops = reduce_observations(&observations, frame.size());

        let mut fragments = Vec::with_capacity(crops.len());
        for rect in &crops {
            let crop = frame.crop(rect);
            let text = match self.recognizer.recognize(&crop) {
                Ok(text) => text,
                Err(error) => {
                    debug!("recognizer failed on crop, using empty fragment: {error:#}");
                    String::new()
                }
            };
            fragments.push(text.trim_matches(|c: char| c == '\n' || c == '\r').to_string());
        }

        self.aggregator.push_cycle(&fragments);

        debug!(
            observations = observations.len(),
            crops = crops.len(),
            frame_age = ?frame.timestamp.elapsed(),
            elapsed = ?start.elapsed(),
            "frame cycle complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CharacterBox, Point2D};
    use anyhow::anyhow;

    fn observation(left: f64, right: f64, bottom: f64, top: f64) -> TextObservation {
        TextObservation::new(vec![CharacterBox {
            bottom_left: Point2D::new(left, bottom),
            bottom_right: Point2D::new(right, bottom),
            top_left: Point2D::new(left, top),
            top_right: Point2D::new(right, top),
        }])
    }

    fn blank_frame() -> Frame {
        Frame::new(vec![0; 100 * 100 * 4], 100, 100)
    }

    struct FixedDetector {
        observations: Vec<TextObservation>,
    }

    impl Detector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<TextObservation>> {
            Ok(self.observations.clone())
        }
    }

    struct FailingDetector;

    impl Detector for FailingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<TextObservation>> {
            Err(anyhow!("camera disconnected"))
        }
    }

    /// Returns canned words in order, one per crop
    struct ScriptedRecognizer {
        words: Vec<Result<String>>,
        next: usize,
    }

    impl ScriptedRecognizer {
        fn new(words: Vec<Result<String>>) -> Self {
            Self { words, next: 0 }
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn recognize(&mut self, _crop: &RgbaImage) -> Result<String> {
            let word = self.words.get_mut(self.next);
            self.next += 1;
            match word {
                Some(word) => std::mem::replace(word, Ok(String::new())),
                None => Ok(String::new()),
            }
        }
    }

    #[test]
    fn test_cycle_joins_fragments_in_crop_order() {
        let detector = FixedDetector {
            observations: vec![
                observation(0.1, 0.3, 0.1, 0.2),
                observation(0.5, 0.7, 0.1, 0.2),
            ],
        };
        let recognizer =
            ScriptedRecognizer::new(vec![Ok("HELLO\n".to_string()), Ok("WORLD".to_string())]);
        let mut pipeline =
            FramePipeline::new(detector, recognizer, ResultAggregator::new());

        pipeline.process_frame(&blank_frame());

        assert_eq!(pipeline.current_text(), "HELLO WORLD");
    }

    #[test]
    fn test_detector_failure_degrades_to_empty_cycle() {
        let mut pipeline = FramePipeline::new(
            FailingDetector,
            ScriptedRecognizer::new(vec![]),
            ResultAggregator::new(),
        );
        pipeline.aggregator().push_cycle(&["STALE".to_string()]);

        pipeline.process_frame(&blank_frame());

        assert_eq!(pipeline.current_text(), "");
    }

    #[test]
    fn test_recognizer_failure_becomes_empty_fragment() {
        let detector = FixedDetector {
            observations: vec![
                observation(0.1, 0.3, 0.1, 0.2),
                observation(0.5, 0.7, 0.1, 0.2),
            ],
        };
        let recognizer = ScriptedRecognizer::new(vec![
            Ok("FIRST".to_string()),
            Err(anyhow!("engine busy")),
        ]);
        let mut pipeline =
            FramePipeline::new(detector, recognizer, ResultAggregator::new());

        pipeline.process_frame(&blank_frame());

        assert_eq!(pipeline.current_text(), "FIRST ");
    }

    #[test]
    fn test_empty_observations_produce_no_fragments() {
        let detector = FixedDetector {
            observations: vec![TextObservation::default()],
        };
        let mut pipeline = FramePipeline::new(
            detector,
            ScriptedRecognizer::new(vec![Ok("UNREACHED".to_string())]),
            ResultAggregator::new(),
        );

        pipeline.process_frame(&blank_frame());

        assert_eq!(pipeline.current_text(), "");
    }
}
