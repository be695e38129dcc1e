use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category reported as `error_type` in the result envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    AudioNotFoundError,
    ModelLoadError,
    TranscriptionError,
    /// The user interrupted the process.
    Interrupted,
    /// Anything the task boundary did not anticipate.
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AudioNotFoundError => "AudioNotFoundError",
            ErrorKind::ModelLoadError => "ModelLoadError",
            ErrorKind::TranscriptionError => "TranscriptionError",
            ErrorKind::Interrupted => "Interrupted",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that end a transcription task.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("audio file not found: {}", path.display())]
    AudioNotFound { path: PathBuf },
    #[error("failed to load model '{model}': {message}")]
    ModelLoad { model: String, message: String },
    #[error("transcription failed ({tag}): {message}")]
    Transcription { tag: String, message: String },
}

impl TranscriptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptionError::AudioNotFound { .. } => ErrorKind::AudioNotFoundError,
            TranscriptionError::ModelLoad { .. } => ErrorKind::ModelLoadError,
            TranscriptionError::Transcription { .. } => ErrorKind::TranscriptionError,
        }
    }

    /// Wrap a recognizer failure, keeping the source's type tag.
    pub fn from_recognizer(err: &(dyn std::error::Error + 'static)) -> Self {
        TranscriptionError::Transcription {
            tag: error_tag(err),
            message: err.to_string(),
        }
    }
}

/// Short type name of the innermost error in a source chain.
fn error_tag(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    let debug = format!("{current:?}");
    let tag: String = debug
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if tag.is_empty() {
        "Error".to_string()
    } else {
        tag
    }
}
