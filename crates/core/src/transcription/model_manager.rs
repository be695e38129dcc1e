use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::transcription::domain::error::TranscriptionError;
use crate::transcription::domain::model::{Device, ModelName};
use crate::transcription::domain::speech_recognizer::{DeviceSelector, ModelLoader, SpeechRecognizer};
use crate::transcription::domain::transcription_result::ModelInfo;

/// A loaded recognition model bound to one device. Never mutated after load.
pub struct ModelHandle {
    name: ModelName,
    device: Device,
    recognizer: Box<dyn SpeechRecognizer>,
}

impl ModelHandle {
    pub fn name(&self) -> ModelName {
        self.name
    }

    pub fn device(&self) -> Device {
        self.device
    }

    pub fn recognizer(&self) -> &dyn SpeechRecognizer {
        self.recognizer.as_ref()
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.name.to_string(),
            device: self.device.to_string(),
        }
    }
}

/// Owns the lazily loaded model for the lifetime of the process.
///
/// The first successful [`ensure_loaded`](Self::ensure_loaded) caches the
/// handle; later calls return it without touching the loader. Loading happens
/// under the slot lock, so concurrent callers trigger at most one load.
/// Failures are not cached.
pub struct ModelManager {
    name: ModelName,
    loader: Box<dyn ModelLoader>,
    device_selector: Box<dyn DeviceSelector>,
    slot: Mutex<Option<Arc<ModelHandle>>>,
}

impl ModelManager {
    pub fn new(
        name: ModelName,
        loader: Box<dyn ModelLoader>,
        device_selector: Box<dyn DeviceSelector>,
    ) -> Self {
        Self {
            name,
            loader,
            device_selector,
            slot: Mutex::new(None),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn ensure_loaded(&self) -> Result<Arc<ModelHandle>, TranscriptionError> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }

        let device = self.device_selector.select();
        log::info!("Loading Whisper model: {} on {device}", self.name);
        let start = Instant::now();

        let recognizer = self.loader.load(self.name, device).map_err(|e| {
            log::error!("Failed to load model {}: {e}", self.name);
            TranscriptionError::ModelLoad {
                model: self.name.to_string(),
                message: e.to_string(),
            }
        })?;

        log::info!(
            "Model loaded in {:.2}s",
            start.elapsed().as_secs_f64()
        );

        let handle = Arc::new(ModelHandle {
            name: self.name,
            device,
            recognizer,
        });
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }
}
