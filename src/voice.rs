use std::sync::Arc;

use tracing::info;

use crate::config::VoiceConfig;
use crate::error::{SeatError, SeatResult};
use crate::exec::CommandRunner;

pub struct Voice {
    config: VoiceConfig,
    runner: Arc<dyn CommandRunner>,
}

impl Voice {
    pub fn new(config: VoiceConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Blocks until playback finishes.
    pub fn speak(&self, text: &str) -> SeatResult<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SeatError::validation("nothing to say: text is empty"));
        }

        let mut args = vec!["-s".to_string(), self.config.rate.to_string()];
        if let Some(voice) = &self.config.voice {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        // Keep text that starts with '-' from being read as a flag.
        args.push("--".to_string());
        args.push(text.to_string());

        let output = self.runner.run(&self.config.program, &args).map_err(|err| {
            SeatError::Speech(format!("cannot start {}: {err}", self.config.program))
        })?;
        if !output.success {
            return Err(SeatError::Speech(format!(
                "{} failed with {}",
                self.config.program,
                output.failure_detail()
            )));
        }
        info!(chars = text.len(), "spoke");
        Ok(())
    }
}
