/// Sample rate Whisper models expect.
pub const WHISPER_SAMPLE_RATE: u32 = 16000;

/// Base URL ggml model files are downloaded from.
pub const WHISPER_MODEL_BASE_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Directory name used under platform cache/config dirs.
pub const APP_DIR_NAME: &str = "transcribe-task";

/// Upper bound on inference threads when none are configured.
pub const DEFAULT_MAX_THREADS: usize = 4;

/// Error prefix for text output, kept for compatibility with existing consumers.
pub const TEXT_ERROR_PREFIX: &str = "错误";
