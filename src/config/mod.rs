//! Configuration management for cc-hui
//!
//! Handles loading, parsing and validating the YAML configuration file.
//! Configuration is read once at startup and never reloaded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::info;

use crate::error::{Error, Result};
use crate::mapping::ZoneMapper;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub faders: FaderConfig,
}

/// MIDI port configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MidiConfig {
    /// Controller input port (substring match)
    #[serde(default)]
    pub input_port: String,
    /// Virtual port the DAW listens to for HUI (substring match)
    #[serde(default)]
    pub output_port: String,
    /// Accept CC only on these channels (1-16); all channels when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<u8>>,
}

/// Fader translation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FaderConfig {
    /// CC number → HUI fader zone (0-7)
    #[serde(default = "default_mapping")]
    pub mapping: BTreeMap<u8, u8>,
    /// Quiet period after which a touched fader is released
    #[serde(default = "default_inactivity_timeout_ms")]
    pub inactivity_timeout_ms: u64,
    /// Inactivity check cadence; a tenth of the timeout when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_interval_ms: Option<u64>,
}

impl Default for FaderConfig {
    fn default() -> Self {
        Self {
            mapping: default_mapping(),
            inactivity_timeout_ms: default_inactivity_timeout_ms(),
            tick_interval_ms: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read(path.as_ref()).await?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from built-in defaults.
    ///
    /// Not validated: ports may still be supplied on the command line.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::read(path).await
        } else {
            info!("Config file {} not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    async fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            Error::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Replace port names with non-empty command-line values.
    pub fn apply_overrides(&mut self, input_port: Option<String>, output_port: Option<String>) {
        if let Some(port) = input_port.filter(|p| !p.is_empty()) {
            self.midi.input_port = port;
        }
        if let Some(port) = output_port.filter(|p| !p.is_empty()) {
            self.midi.output_port = port;
        }
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.midi.input_port.is_empty() {
            return Err(Error::Config("MIDI input_port cannot be empty".into()));
        }
        if self.midi.output_port.is_empty() {
            return Err(Error::Config("MIDI output_port cannot be empty".into()));
        }

        if let Some(channels) = &self.midi.channels {
            if let Some(bad) = channels.iter().find(|&&ch| ch == 0 || ch > 16) {
                return Err(Error::Config(format!(
                    "invalid MIDI channel {} (must be 1-16)",
                    bad
                )));
            }
        }

        if self.faders.inactivity_timeout_ms == 0 {
            return Err(Error::Config("inactivity_timeout_ms must be positive".into()));
        }
        if self.faders.tick_interval_ms == Some(0) {
            return Err(Error::Config("tick_interval_ms must be positive".into()));
        }
        if self.faders.mapping.is_empty() {
            return Err(Error::Config("fader mapping cannot be empty".into()));
        }

        self.zone_mapper().map(|_| ())
    }

    pub fn zone_mapper(&self) -> Result<ZoneMapper> {
        ZoneMapper::try_from(&self.faders.mapping)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.faders.inactivity_timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        let millis = self
            .faders
            .tick_interval_ms
            .unwrap_or(self.faders.inactivity_timeout_ms / 10);
        Duration::from_millis(millis.max(1))
    }

    /// Zero-based channel filter for the input port, if configured.
    pub fn channel_filter(&self) -> Option<Vec<u8>> {
        self.midi
            .channels
            .as_ref()
            .map(|chs| chs.iter().map(|ch| ch.saturating_sub(1)).collect())
    }
}

// Default value functions
fn default_inactivity_timeout_ms() -> u64 { 250 }

/// Sparrow 8x60 layout: CC11, CC1, CC2, CC21, CC5, CC3, CC9, CC7 on faders 1-8.
fn default_mapping() -> BTreeMap<u8, u8> {
    [(11, 0), (1, 1), (2, 2), (21, 3), (5, 4), (3, 5), (9, 6), (7, 7)]
        .into_iter()
        .collect()
}
