//! scenetext - Live scene-text recognition pipeline
//!
//! Turns per-frame text observations into pixel crops for a recognizer and
//! publishes the aggregated text under a trailing-edge throttle. Detection,
//! recognition, translation, and speech backends are injected collaborators.

mod aggregate;
mod config;
mod error;
mod frame;
mod geometry;
mod pipeline;
mod translate;

use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use image::RgbaImage;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::aggregate::{ResultAggregator, ThrottledPublisher};
use crate::config::PipelineConfig;
use crate::frame::Frame;
use crate::geometry::{CharacterBox, Point2D, TextObservation};
use crate::pipeline::{Detector, FramePipeline, Recognizer};
use crate::translate::{
    Action, Language, SpeechSynthesizer, TranslateSession, Translator, Voice,
};

/// scenetext - live text recognition pipeline demo
#[derive(Parser, Debug)]
#[command(name = "scenetext")]
#[command(about = "Feeds synthetic frames through the recognition pipeline")]
struct Args {
    /// Number of frames to process before exiting
    #[arg(short, long, default_value = "40")]
    frames: u32,

    /// Frame rate of the synthetic source
    #[arg(long, default_value = "15")]
    fps: u32,

    /// Override the configured publish throttle, in milliseconds
    #[arg(long)]
    throttle_ms: Option<u64>,

    /// Translate and synthesize the final text after the capture run
    #[arg(long)]
    speak: bool,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = load_or_create_config();

    let throttle = args
        .throttle_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.throttle_interval());

    info!("scenetext starting...");
    info!(
        language = %config.recognizer.language,
        throttle_ms = throttle.as_millis() as u64,
        "pipeline configuration"
    );

    let aggregator = ResultAggregator::new();
    let publisher = ThrottledPublisher::start(aggregator.clone(), throttle);

    let updates = aggregator.subscribe();
    let printer = thread::spawn(move || {
        for text in updates {
            println!("recognized: {text:?}");
        }
    });

    let mut pipeline = FramePipeline::new(
        DemoDetector,
        DemoRecognizer::new(&config.recognizer.char_whitelist),
        aggregator.clone(),
    );

    let frame_interval = Duration::from_secs(1) / args.fps.max(1);
    for _ in 0..args.frames {
        let frame = Frame::new(vec![0; 640 * 480 * 4], 640, 480);
        pipeline.process_frame(&frame);
        thread::sleep(frame_interval);
    }

    // The action trigger path: read the current value synchronously.
    let result = pipeline.aggregator().current_result();
    info!(
        text = %result.text,
        age_ms = result.updated_at.elapsed().as_millis() as u64,
        "final aggregated text"
    );

    if args.speak {
        translate_and_speak(&result.text, &config)?;
    }

    drop(pipeline);
    drop(aggregator);
    drop(publisher);
    let _ = printer.join();

    info!("scenetext shutdown complete");

    Ok(())
}

/// Load configuration from file, or create and persist the default
fn load_or_create_config() -> PipelineConfig {
    if let Ok(config_dir) = config::get_config_dir() {
        let config_path = config_dir.join("config.toml");
        if config_path.exists() {
            if let Ok(config) = config::load_config(&config_path) {
                info!("Loaded configuration from {:?}", config_path);
                return config;
            }
        } else {
            let config = PipelineConfig::default();
            match config::save_config(&config, &config_path) {
                Ok(()) => info!("Wrote default configuration to {:?}", config_path),
                Err(error) => warn!("Could not write default configuration: {error:#}"),
            }
            return config;
        }
    }
    info!("Using default configuration");
    PipelineConfig::default()
}

/// Run the captured text through the translate-and-speak session with demo
/// collaborators, the same flow the capture trigger hands off to.
fn translate_and_speak(text: &str, config: &PipelineConfig) -> Result<()> {
    let mut session = TranslateSession::new(
        text,
        DemoTranslator,
        DemoSynthesizer,
        config.translation.source_language.clone(),
    );
    session.start()?;

    let Some(voice) = session.state().voices.first().cloned() else {
        warn!("no voices available, skipping translation");
        return Ok(());
    };
    info!(voice = %voice.name, voice_language = %voice.language, "using first available voice");
    session.handle(Action::ChooseVoice(voice))?;
    session.handle(Action::Translate)?;
    session.handle(Action::Speak)?;

    info!(
        translation = %session.state().translation,
        audio_bytes = session.state().audio.as_ref().map_or(0, Vec::len),
        "translate-and-speak complete"
    );
    Ok(())
}

/// Emits a fixed pair of text regions on every frame
struct DemoDetector;

impl Detector for DemoDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<TextObservation>> {
        Ok(vec![
            demo_observation(0.10, 0.45, 0.70, 0.78),
            demo_observation(0.55, 0.90, 0.70, 0.78),
        ])
    }
}

fn demo_observation(left: f64, right: f64, bottom: f64, top: f64) -> TextObservation {
    TextObservation::new(vec![CharacterBox {
        bottom_left: Point2D::new(left, bottom),
        bottom_right: Point2D::new(right, bottom),
        top_left: Point2D::new(left, top),
        top_right: Point2D::new(right, top),
    }])
}

/// Cycles through canned words, one per crop, honoring the whitelist
struct DemoRecognizer {
    whitelist: String,
    calls: usize,
}

impl DemoRecognizer {
    fn new(whitelist: &str) -> Self {
        Self {
            whitelist: whitelist.to_string(),
            calls: 0,
        }
    }
}

impl Recognizer for DemoRecognizer {
    fn recognize(&mut self, _crop: &RgbaImage) -> Result<String> {
        const WORDS: [&str; 4] = ["SCENE", "TEXT", "PIPELINE", "DEMO"];
        let word = WORDS[self.calls % WORDS.len()];
        self.calls += 1;
        if self.whitelist.is_empty() {
            return Ok(word.to_string());
        }
        Ok(word
            .chars()
            .filter(|c| self.whitelist.contains(*c))
            .collect())
    }
}

/// Echo translator standing in for a cloud client
struct DemoTranslator;

impl Translator for DemoTranslator {
    fn list_languages(&mut self) -> Result<Vec<Language>> {
        Ok(vec![
            Language {
                code: "es".to_string(),
                name: "Spanish".to_string(),
            },
            Language {
                code: "fr".to_string(),
                name: "French".to_string(),
            },
        ])
    }

    fn translate(&mut self, text: &str, source: &str, target: &str) -> Result<String> {
        Ok(format!("[{source}->{target}] {text}"))
    }
}

/// Synthesizer standing in for a cloud client; audio is the UTF-8 bytes
struct DemoSynthesizer;

impl SpeechSynthesizer for DemoSynthesizer {
    fn list_voices(&mut self) -> Result<Vec<Voice>> {
        Ok(vec![Voice {
            name: "es-ES_DemoVoice".to_string(),
            language: "es-ES".to_string(),
        }])
    }

    fn synthesize(&mut self, text: &str, _voice: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}
