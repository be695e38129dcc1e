use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use super::task_stage::TaskStage;
use crate::audio::domain::duration_probe::DurationProbe;
use crate::transcription::domain::confidence::{
    aggregate_confidence, normalize_segments, round_to, TIMING_DECIMALS,
};
use crate::transcription::domain::error::TranscriptionError;
use crate::transcription::domain::options::TranscribeOptions;
use crate::transcription::domain::raw_transcription::RawTranscription;
use crate::transcription::domain::transcription_result::{
    TranscriptionResult, TranscriptionSuccess,
};
use crate::transcription::model_manager::{ModelHandle, ModelManager};

/// Input to a single transcription task.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptionRequest {
    pub audio_path: PathBuf,
    /// Language code; only `zh`, `en` and `ja` are passed to the model.
    pub language_hint: Option<String>,
    /// Opaque correlation token echoed back in the result.
    pub task_id: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(audio_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_path: audio_path.into(),
            language_hint: None,
            task_id: None,
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language_hint = language;
        self
    }

    pub fn with_task_id(mut self, task_id: Option<String>) -> Self {
        self.task_id = task_id;
        self
    }
}

/// Runs one audio file through validation, model acquisition, transcription
/// and post-processing, and always returns a result envelope.
///
/// Inference on the shared model is serialized, so one instance may serve
/// several threads.
pub struct TranscribeAudioUseCase {
    models: ModelManager,
    duration_probe: Option<Box<dyn DurationProbe>>,
    inference_lock: Mutex<()>,
}

impl TranscribeAudioUseCase {
    pub fn new(models: ModelManager, duration_probe: Option<Box<dyn DurationProbe>>) -> Self {
        Self {
            models,
            duration_probe,
            inference_lock: Mutex::new(()),
        }
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    pub fn process(&self, request: &TranscriptionRequest) -> TranscriptionResult {
        self.process_with_logger(request, &mut NullPipelineLogger)
    }

    pub fn process_with_logger(
        &self,
        request: &TranscriptionRequest,
        logger: &mut dyn PipelineLogger,
    ) -> TranscriptionResult {
        log::info!("Processing audio file: {}", request.audio_path.display());
        logger.stage(TaskStage::Validating);

        if !request.audio_path.exists() {
            let err = TranscriptionError::AudioNotFound {
                path: request.audio_path.clone(),
            };
            log::error!("{err}");
            logger.stage(TaskStage::Failed);
            return TranscriptionResult::from_error(request.task_id.clone(), &err, 0);
        }

        let start = Instant::now();
        match self.run(request, start, logger) {
            Ok(success) => {
                logger.stage(TaskStage::Succeeded);
                TranscriptionResult::Success(success)
            }
            Err(err) => {
                log::error!("Failed to process audio: {err}");
                logger.stage(TaskStage::Failed);
                TranscriptionResult::from_error(request.task_id.clone(), &err, elapsed_ms(start))
            }
        }
    }

    fn run(
        &self,
        request: &TranscriptionRequest,
        start: Instant,
        logger: &mut dyn PipelineLogger,
    ) -> Result<TranscriptionSuccess, TranscriptionError> {
        let step = Instant::now();
        let model = self.models.ensure_loaded()?;
        logger.timing("load", millis_f64(step));
        logger.stage(TaskStage::ModelReady);

        let options = TranscribeOptions::from_hint(request.language_hint.as_deref());

        logger.stage(TaskStage::Transcribing);
        let step = Instant::now();
        let raw = self.transcribe(&model, &request.audio_path, &options)?;
        logger.timing("transcribe", millis_f64(step));

        logger.stage(TaskStage::PostProcessing);
        let step = Instant::now();

        let duration_seconds = self.probe_duration(&request.audio_path);

        let confidence = aggregate_confidence(&raw.segments).unwrap_or_else(|e| {
            log::warn!("Failed to compute confidence: {e}");
            0.0
        });

        let segments = normalize_segments(&raw.segments).unwrap_or_else(|e| {
            log::warn!("Failed to process segments: {e}");
            Vec::new()
        });

        let text = raw.text.trim().to_string();
        logger.timing("postprocess", millis_f64(step));
        log::info!(
            "Transcription complete, text length: {}",
            text.chars().count()
        );

        Ok(TranscriptionSuccess {
            task_id: request.task_id.clone(),
            text,
            language: raw.language.or_else(|| request.language_hint.clone()),
            duration_seconds,
            processing_time_ms: elapsed_ms(start),
            confidence,
            segments,
            model_info: model.info(),
        })
    }

    fn transcribe(
        &self,
        model: &ModelHandle,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<RawTranscription, TranscriptionError> {
        let _guard = self
            .inference_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        log::info!("Running speech recognition...");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            model.recognizer().transcribe(audio_path, options)
        }));

        match outcome {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => Err(TranscriptionError::from_recognizer(e.as_ref())),
            Err(payload) => Err(TranscriptionError::Transcription {
                tag: "Panic".to_string(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Duration in seconds at two decimals; 0.0 when it cannot be determined.
    fn probe_duration(&self, path: &Path) -> f64 {
        let Some(probe) = &self.duration_probe else {
            log::warn!("No duration probe available, reporting duration 0.0");
            return 0.0;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| probe.duration(path))) {
            Ok(Ok(seconds)) if seconds.is_finite() && seconds >= 0.0 => {
                round_to(seconds, TIMING_DECIMALS)
            }
            Ok(Ok(seconds)) => {
                log::warn!("Ignoring invalid audio duration {seconds}");
                0.0
            }
            Ok(Err(e)) => {
                log::warn!("Failed to read audio duration: {e}");
                0.0
            }
            Err(payload) => {
                log::warn!(
                    "Duration probe panicked: {}",
                    panic_message(payload.as_ref())
                );
                0.0
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn millis_f64(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "recognizer panicked".to_string()
    }
}
