use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use crate::shared::constants::{DEFAULT_MAX_THREADS, WHISPER_SAMPLE_RATE};
use crate::shared::model_resolver::ModelResolver;
use crate::transcription::domain::model::{Device, ModelName};
use crate::transcription::domain::options::TranscribeOptions;
use crate::transcription::domain::raw_transcription::{RawSegment, RawTranscription};
use crate::transcription::domain::speech_recognizer::{BoxError, ModelLoader, SpeechRecognizer};

/// Loads ggml Whisper weights through a [`ModelResolver`].
pub struct WhisperModelLoader {
    resolver: ModelResolver,
    threads: usize,
}

impl WhisperModelLoader {
    pub fn new(resolver: ModelResolver) -> Self {
        Self {
            resolver,
            threads: default_threads(),
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }
}

impl ModelLoader for WhisperModelLoader {
    fn load(&self, name: ModelName, device: Device) -> Result<Box<dyn SpeechRecognizer>, BoxError> {
        let model_path = self.resolver.resolve(name)?;
        let recognizer = WhisperRecognizer::load(&model_path, device, self.threads)?;
        Ok(Box::new(recognizer))
    }
}

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// Audio files are decoded with FFmpeg to 16 kHz mono before inference.
/// Each call creates a fresh decoder state on the shared context.
pub struct WhisperRecognizer {
    ctx: WhisperContext,
    model_path: PathBuf,
    threads: usize,
    reader: FfmpegAudioReader,
}

impl WhisperRecognizer {
    pub fn load(model_path: &Path, device: Device, threads: usize) -> Result<Self, BoxError> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }

        let mut params = WhisperContextParameters::default();
        params.use_gpu = device.is_accelerator();

        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            params,
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        Ok(Self {
            ctx,
            model_path: model_path.to_path_buf(),
            threads: threads.max(1),
            reader: FfmpegAudioReader,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(
        &self,
        audio_path: &Path,
        options: &TranscribeOptions,
    ) -> Result<RawTranscription, BoxError> {
        let audio = self.reader.read_mono(audio_path, WHISPER_SAMPLE_RATE)?;
        log::debug!("Running inference on {:.2}s of audio", audio.duration());

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(options.language.map_or("auto", |l| l.code())));
        params.set_translate(false);
        params.set_print_special(options.verbose);
        params.set_print_progress(options.verbose);
        params.set_print_realtime(options.verbose);
        params.set_print_timestamps(options.verbose);
        params.set_n_threads(self.threads as i32);

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut text = String::new();
        let mut segments = Vec::new();
        let num_segments = state.full_n_segments();

        for seg_idx in 0..num_segments {
            let segment = match state.get_segment(seg_idx) {
                Some(s) => s,
                None => continue,
            };

            let seg_text = match segment.to_str() {
                Ok(t) => t.to_string(),
                Err(e) => {
                    log::warn!("Segment {seg_idx} is not valid UTF-8: {e}");
                    String::new()
                }
            };
            text.push_str(&seg_text);

            // Segment timestamps are in centiseconds (10ms units)
            segments.push(RawSegment {
                id: segments.len(),
                text: seg_text,
                start: segment.start_timestamp() as f64 / 100.0,
                end: segment.end_timestamp() as f64 / 100.0,
                no_speech_prob: Some(segment.no_speech_probability() as f64),
            });
        }

        let language = match options.language {
            Some(lang) => Some(lang.code().to_string()),
            None => detected_language(state.full_lang_id_from_state()),
        };

        Ok(RawTranscription {
            text,
            language,
            segments,
        })
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(DEFAULT_MAX_THREADS)
}

/// Language code for a whisper language id; negative ids mean none was detected.
fn detected_language(id: i32) -> Option<String> {
    (id >= 0)
        .then_some(id)
        .and_then(whisper_rs::get_lang_str)
        .map(str::to_string)
}
