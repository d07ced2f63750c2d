//! Pipeline configuration
//!
//! User settings stored in TOML format.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Pipeline settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Aggregation and publishing settings
    pub aggregator: AggregatorSettings,
    /// Recognizer settings
    pub recognizer: RecognizerSettings,
    /// Translation settings
    pub translation: TranslationSettings,
}

impl PipelineConfig {
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.aggregator.throttle_ms)
    }
}

/// Settings for the result aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorSettings {
    /// Minimum interval between published updates, in milliseconds
    pub throttle_ms: u64,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self { throttle_ms: 300 }
    }
}

/// Settings handed to the recognizer backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognizerSettings {
    /// Recognition language code (e.g. "eng")
    pub language: String,
    /// Characters the recognizer is allowed to emit; empty means unrestricted
    pub char_whitelist: String,
}

impl Default for RecognizerSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            char_whitelist:
                "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz1234567890()!?.,"
                    .to_string(),
        }
    }
}

/// Settings for the translation stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationSettings {
    /// Language the captured text is assumed to be in
    pub source_language: String,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "scenetext", "SceneText")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: PipelineConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &PipelineConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();

        assert_eq!(config.aggregator.throttle_ms, 300);
        assert_eq!(config.throttle_interval(), Duration::from_millis(300));
        assert_eq!(config.recognizer.language, "eng");
        assert!(config.recognizer.char_whitelist.contains("abc"));
        assert_eq!(config.translation.source_language, "en");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PipelineConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: PipelineConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.aggregator.throttle_ms, config.aggregator.throttle_ms);
        assert_eq!(parsed.recognizer.language, config.recognizer.language);
        assert_eq!(
            parsed.translation.source_language,
            config.translation.source_language
        );
    }

    #[test]
    fn test_config_file_roundtrip() {
        let mut config = PipelineConfig::default();
        config.aggregator.throttle_ms = 150;
        config.recognizer.language = "deu".to_string();

        let file = NamedTempFile::new().unwrap();
        save_config(&config, file.path()).unwrap();
        let loaded = load_config(file.path()).unwrap();

        assert_eq!(loaded.aggregator.throttle_ms, 150);
        assert_eq!(loaded.recognizer.language, "deu");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = load_config(Path::new("/nonexistent/scenetext-config.toml"));
        assert!(result.is_err());
    }
}
