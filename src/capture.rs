use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CaptureConfig;
use crate::error::{SeatError, SeatResult};
use crate::exec::CommandRunner;

/// Where a still frame came from. Carries no card identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureReport {
    pub device: String,
    pub image_path: PathBuf,
}

/// Grabs one webcam frame of the agent's hole cards.
pub struct CardCapture {
    config: CaptureConfig,
    runner: Arc<dyn CommandRunner>,
}

impl CardCapture {
    pub fn new(config: CaptureConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    pub fn image_path(&self) -> &Path {
        &self.config.image_path
    }

    /// First configured device whose probe lists a supported pixel format.
    pub fn detect_device(&self) -> SeatResult<String> {
        for device in &self.config.devices {
            let args = vec![
                "--device".to_string(),
                device.clone(),
                "--list-formats".to_string(),
            ];
            match self.runner.run(&self.config.probe_program, &args) {
                Ok(output) if output.success && self.supports_format(&output.stdout) => {
                    info!(device = device.as_str(), "camera selected");
                    return Ok(device.clone());
                }
                Ok(output) => {
                    debug!(device = device.as_str(), detail = %output.failure_detail(), "camera rejected");
                }
                Err(err) => {
                    debug!(device = device.as_str(), error = %err, "camera probe failed to start");
                }
            }
        }
        Err(SeatError::DeviceNotFound {
            probed: self.config.devices.clone(),
        })
    }

    fn supports_format(&self, probe_output: &str) -> bool {
        self.config
            .formats
            .iter()
            .any(|format| probe_output.contains(format.as_str()))
    }

    /// Overwrites the image from any earlier capture.
    pub fn capture(&self) -> SeatResult<CaptureReport> {
        let device = self.detect_device()?;
        let image_path = self.config.image_path.clone();

        // A stale frame must not pass for a fresh one.
        match fs::remove_file(&image_path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(SeatError::Capture(format!(
                    "cannot clear previous image {}: {err}",
                    image_path.display()
                )));
            }
        }

        let args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "v4l2".to_string(),
            "-i".to_string(),
            device.clone(),
            "-frames:v".to_string(),
            "1".to_string(),
            "-y".to_string(),
            image_path.display().to_string(),
        ];
        let output = self
            .runner
            .run(&self.config.capture_program, &args)
            .map_err(|err| {
                SeatError::Capture(format!(
                    "cannot start {}: {err}",
                    self.config.capture_program
                ))
            })?;
        if !output.success {
            return Err(SeatError::Capture(format!(
                "{} failed with {}",
                self.config.capture_program,
                output.failure_detail()
            )));
        }
        if !image_path.exists() {
            return Err(SeatError::Capture(format!(
                "{} exited cleanly but wrote no image to {}",
                self.config.capture_program,
                image_path.display()
            )));
        }

        info!(device = device.as_str(), path = %image_path.display(), "cards captured");
        Ok(CaptureReport { device, image_path })
    }
}
