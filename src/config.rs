use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.json";
pub const DATA_DIR_ENV: &str = "POKER_SEAT_HOME";
const DEFAULT_DIR_NAME: &str = ".poker-seat";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Camera device paths, probed in this order.
    pub devices: Vec<String>,
    pub probe_program: String,
    /// Probe output must mention one of these pixel formats.
    pub formats: Vec<String>,
    pub capture_program: String,
    pub image_path: PathBuf,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            devices: (0..4).map(|index| format!("/dev/video{index}")).collect(),
            probe_program: "v4l2-ctl".to_string(),
            formats: vec!["MJPG".to_string(), "YUYV".to_string()],
            capture_program: "ffmpeg".to_string(),
            image_path: PathBuf::from("/tmp/poker_hand.jpg"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VoiceConfig {
    pub program: String,
    /// Words per minute.
    pub rate: u32,
    pub voice: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            program: "espeak".to_string(),
            rate: 140,
            voice: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OddsConfig {
    /// Monte Carlo samples when equity is simulated from recorded hole cards.
    pub mc_samples: u32,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self { mc_samples: 2_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SeatConfig {
    pub capture: CaptureConfig,
    pub voice: VoiceConfig,
    pub odds: OddsConfig,
    /// Fixed seed for table talk; random when absent.
    pub seed: Option<u64>,
}

impl SeatConfig {
    /// Read `config.json` from `data_dir`. A missing file means defaults; a broken
    /// one is an error.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// `$POKER_SEAT_HOME`, else `$HOME/.poker-seat`, else `./.poker-seat`.
pub fn default_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
