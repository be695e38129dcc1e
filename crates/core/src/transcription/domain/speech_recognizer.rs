use std::path::Path;

use super::model::{Device, ModelName};
use super::options::TranscribeOptions;
use super::raw_transcription::RawTranscription;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for speech-to-text inference on a loaded model.
///
/// Implementations decode the audio file themselves and block until the
/// whole file has been transcribed.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<RawTranscription, BoxError>;
}

/// Domain interface for loading recognition model weights onto a device.
pub trait ModelLoader: Send + Sync {
    fn load(&self, name: ModelName, device: Device) -> Result<Box<dyn SpeechRecognizer>, BoxError>;
}

/// Domain interface for deciding which device a model is loaded onto.
pub trait DeviceSelector: Send + Sync {
    fn select(&self) -> Device;
}

/// Always selects the same device.
pub struct FixedDevice(pub Device);

impl DeviceSelector for FixedDevice {
    fn select(&self) -> Device {
        self.0
    }
}
