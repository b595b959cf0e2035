use std::path::PathBuf;

use thiserror::Error;

use crate::cards::CardParseError;

#[derive(Error, Debug)]
pub enum SeatError {
    #[error("{0}")]
    Validation(String),

    #[error("no camera device reports a supported frame format (probed: {})", .probed.join(", "))]
    DeviceNotFound { probed: Vec<String> },

    #[error("card capture failed: {0}")]
    Capture(String),

    #[error("cannot persist {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("speech failed: {0}")]
    Speech(String),
}

impl SeatError {
    pub fn validation(message: impl Into<String>) -> Self {
        SeatError::Validation(message.into())
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SeatError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Stable identifier used in tool response envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            SeatError::Validation(_) => "validation",
            SeatError::DeviceNotFound { .. } => "device_not_found",
            SeatError::Capture(_) => "capture",
            SeatError::Persistence { .. } => "persistence",
            SeatError::Speech(_) => "speech",
        }
    }
}

impl From<CardParseError> for SeatError {
    fn from(err: CardParseError) -> Self {
        SeatError::Validation(err.to_string())
    }
}

pub type SeatResult<T> = Result<T, SeatError>;
