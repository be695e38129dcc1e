use serde::{Serialize, Serializer};

use super::error::{ErrorKind, TranscriptionError};
use super::segment::Segment;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelInfo {
    #[serde(rename = "model_name")]
    pub name: String,
    pub device: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranscriptionSuccess {
    pub task_id: Option<String>,
    pub text: String,
    pub language: Option<String>,
    #[serde(rename = "duration")]
    pub duration_seconds: f64,
    #[serde(rename = "processing_time")]
    pub processing_time_ms: u64,
    pub confidence: f64,
    pub segments: Vec<Segment>,
    pub model_info: ModelInfo,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TranscriptionFailure {
    pub task_id: Option<String>,
    #[serde(rename = "error")]
    pub error_message: String,
    #[serde(rename = "error_type")]
    pub error_kind: ErrorKind,
    #[serde(rename = "processing_time")]
    pub processing_time_ms: u64,
}

/// The envelope returned for every task: success or structured failure.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptionResult {
    Success(TranscriptionSuccess),
    Failure(TranscriptionFailure),
}

impl TranscriptionResult {
    pub fn failure(
        task_id: Option<String>,
        error_kind: ErrorKind,
        error_message: impl Into<String>,
        processing_time_ms: u64,
    ) -> Self {
        TranscriptionResult::Failure(TranscriptionFailure {
            task_id,
            error_message: error_message.into(),
            error_kind,
            processing_time_ms,
        })
    }

    pub fn from_error(
        task_id: Option<String>,
        error: &TranscriptionError,
        processing_time_ms: u64,
    ) -> Self {
        Self::failure(task_id, error.kind(), error.to_string(), processing_time_ms)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TranscriptionResult::Success(_))
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            TranscriptionResult::Success(s) => s.task_id.as_deref(),
            TranscriptionResult::Failure(f) => f.task_id.as_deref(),
        }
    }

    pub fn processing_time_ms(&self) -> u64 {
        match self {
            TranscriptionResult::Success(s) => s.processing_time_ms,
            TranscriptionResult::Failure(f) => f.processing_time_ms,
        }
    }

    /// Pretty JSON with two-space indentation and non-ASCII kept literal.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Serialize)]
struct Tagged<'a, T> {
    success: bool,
    #[serde(flatten)]
    body: &'a T,
}

impl Serialize for TranscriptionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TranscriptionResult::Success(body) => Tagged {
                success: true,
                body,
            }
            .serialize(serializer),
            TranscriptionResult::Failure(body) => Tagged {
                success: false,
                body,
            }
            .serialize(serializer),
        }
    }
}
