use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{Result, VizError};

pub const DEFAULT_SOURCE: &str = "assets/track.mp3";
pub const DEFAULT_CONFIG_FILE: &str = "barviz.toml";

pub const FFT_SIZE: usize = 256;
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;
pub const SMOOTHING: f32 = 0.8;
pub const MIN_DECIBELS: f32 = -100.0;
pub const MAX_DECIBELS: f32 = -30.0;

pub const DEFAULT_VOLUME: f32 = 0.05;

pub const BACKGROUND: [u8; 3] = [0x1e, 0x1e, 0x1e];
pub const BAR_GAP: f32 = 1.0;
pub const CONTROLS_MARGIN: f32 = 20.0;

// Roughly a quarter second at 48 kHz; the UI drains it every frame.
pub const TAP_CAPACITY: usize = 1 << 14;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub analyser: AnalyserConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_looping")]
    pub looping: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AnalyserConfig {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    #[serde(default = "default_min_decibels")]
    pub min_decibels: f32,
    #[serde(default = "default_max_decibels")]
    pub max_decibels: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            volume: default_volume(),
            looping: default_looping(),
        }
    }
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            smoothing: default_smoothing(),
            min_decibels: default_min_decibels(),
            max_decibels: default_max_decibels(),
        }
    }
}

fn default_source() -> PathBuf { PathBuf::from(DEFAULT_SOURCE) }
fn default_volume() -> f32 { DEFAULT_VOLUME }
fn default_looping() -> bool { true }
fn default_fft_size() -> usize { FFT_SIZE }
fn default_smoothing() -> f32 { SMOOTHING }
fn default_min_decibels() -> f32 { MIN_DECIBELS }
fn default_max_decibels() -> f32 { MAX_DECIBELS }

impl AnalyserConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(VizError::InvalidConfig(format!(
                "fft_size must be a power of two in {}..={}, got {}",
                MIN_FFT_SIZE, MAX_FFT_SIZE, self.fft_size
            )));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(VizError::InvalidConfig(format!(
                "smoothing must be within 0..=1, got {}",
                self.smoothing
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(VizError::InvalidConfig(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| VizError::InvalidConfig(e.to_string()))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Ok(Self::from_toml(&content)?)
    }

    /// Command line values take precedence over the file.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(input) = &cli.input {
            self.player.source = input.clone();
        }
        if let Some(volume) = cli.volume {
            self.player.volume = volume;
        }
        if let Some(fft_size) = cli.fft_size {
            self.analyser.fft_size = fft_size;
        }
        if cli.no_loop {
            self.player.looping = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.volume) {
            return Err(VizError::InvalidConfig(format!(
                "volume must be within 0..=1, got {}",
                self.player.volume
            )));
        }
        self.analyser.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.player.source, PathBuf::from(DEFAULT_SOURCE));
        assert_eq!(config.player.volume, 0.05);
        assert!(config.player.looping);
        assert_eq!(config.analyser, AnalyserConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml("[analyser]\nfft_size = 512\n").unwrap();
        assert_eq!(config.analyser.fft_size, 512);
        assert_eq!(config.analyser.smoothing, SMOOTHING);
        assert_eq!(config.player.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn rejects_bad_fft_size() {
        let mut config = Config::default();
        config.analyser.fft_size = 300;
        assert!(config.validate().is_err());
        config.analyser.fft_size = 16;
        assert!(config.validate().is_err());
        config.analyser.fft_size = 65536;
        assert!(config.validate().is_err());
        config.analyser.fft_size = 2048;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_inverted_decibel_range() {
        let mut config = Config::default();
        config.analyser.min_decibels = -30.0;
        config.analyser.max_decibels = -40.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_volume_and_smoothing() {
        let mut config = Config::default();
        config.player.volume = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analyser.smoothing = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_invalid_config() {
        let err = Config::from_toml("[player\nvolume = ").unwrap_err();
        assert!(matches!(err, VizError::InvalidConfig(_)));
    }

    #[test]
    fn cli_overrides_file() {
        let mut config = Config::from_toml("[player]\nvolume = 0.5\n").unwrap();
        let cli = Cli::parse_from(["barviz", "song.flac", "--volume", "0.2", "--fft-size", "1024", "--no-loop"]);
        config.merge_cli(&cli);
        assert_eq!(config.player.source, PathBuf::from("song.flac"));
        assert_eq!(config.player.volume, 0.2);
        assert_eq!(config.analyser.fft_size, 1024);
        assert!(!config.player.looping);
    }

    #[test]
    fn absent_cli_flags_keep_file_values() {
        let mut config = Config::from_toml("[player]\nvolume = 0.5\nlooping = true\n").unwrap();
        let cli = Cli::parse_from(["barviz"]);
        config.merge_cli(&cli);
        assert_eq!(config.player.volume, 0.5);
        assert!(config.player.looping);
        assert_eq!(config.player.source, PathBuf::from(DEFAULT_SOURCE));
    }
}
