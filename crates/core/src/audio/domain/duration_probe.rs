use std::path::Path;

use crate::transcription::domain::speech_recognizer::BoxError;

/// Domain interface for reading the playback length of an audio file.
pub trait DurationProbe: Send + Sync {
    /// Duration in seconds.
    fn duration(&self, path: &Path) -> Result<f64, BoxError>;
}
