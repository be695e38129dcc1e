use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};

use transcribe_core::audio::infrastructure::ffmpeg_duration_probe::FfmpegDurationProbe;
use transcribe_core::pipeline::pipeline_logger::{PipelineLogger, SummaryPipelineLogger};
use transcribe_core::pipeline::transcribe_audio_use_case::{
    panic_message, TranscribeAudioUseCase, TranscriptionRequest,
};
use transcribe_core::shared::constants::TEXT_ERROR_PREFIX;
use transcribe_core::shared::model_resolver::{model_cache_dir, ModelResolver};
use transcribe_core::shared::settings::Settings;
use transcribe_core::transcription::domain::error::ErrorKind;
use transcribe_core::transcription::domain::model::ModelName;
use transcribe_core::transcription::domain::transcription_result::TranscriptionResult;
use transcribe_core::transcription::infrastructure::device_probe::EnvironmentDeviceSelector;
use transcribe_core::transcription::infrastructure::whisper_recognizer::WhisperModelLoader;
use transcribe_core::transcription::model_manager::ModelManager;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Transcribe one audio file with a local Whisper model.
#[derive(Parser, Debug)]
#[command(name = "transcribe-task")]
struct Cli {
    /// Audio file to transcribe.
    #[arg(long, alias = "audio_file")]
    audio_file: PathBuf,

    /// Whisper model: tiny, base, small, medium or large [default: base].
    #[arg(long)]
    model: Option<ModelName>,

    /// Language hint (zh, en, ja). Anything else auto-detects.
    #[arg(long)]
    language: Option<String>,

    /// Correlation id echoed back in the result.
    #[arg(long, alias = "task_id")]
    task_id: Option<String>,

    /// Output format.
    #[arg(long, alias = "output_format", value_enum, default_value = "json")]
    output_format: OutputFormat,

    /// Directory with pre-downloaded ggml model files.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging and a stage timing summary on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let task_id = cli.task_id.clone();
    let format = cli.output_format;
    install_interrupt_handler(task_id.clone(), format);

    let result = match panic::catch_unwind(AssertUnwindSafe(|| run(cli))) {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            log::error!("Program failed: {e}");
            TranscriptionResult::failure(task_id, ErrorKind::InternalError, e.to_string(), 0)
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("Program panicked: {message}");
            TranscriptionResult::failure(task_id, ErrorKind::InternalError, message, 0)
        }
    };

    println!("{}", render(&result, format));
    process::exit(exit_code(&result));
}

fn run(cli: Cli) -> Result<TranscriptionResult, Box<dyn std::error::Error>> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::default(),
    };

    let model = cli.model.or(settings.model).unwrap_or_default();
    let model_dir = cli.model_dir.or(settings.model_dir);
    let use_case = build_use_case(model, model_dir, settings.threads);

    let request = TranscriptionRequest::new(cli.audio_file)
        .with_language(cli.language)
        .with_task_id(cli.task_id);

    if cli.verbose {
        let mut logger = SummaryPipelineLogger::new();
        let result = use_case.process_with_logger(&request, &mut logger);
        logger.summary();
        Ok(result)
    } else {
        Ok(use_case.process(&request))
    }
}

fn build_use_case(
    model: ModelName,
    model_dir: Option<PathBuf>,
    threads: Option<usize>,
) -> TranscribeAudioUseCase {
    let cache_dir = model_cache_dir().unwrap_or_else(|e| {
        log::warn!("{e}, caching models in ./models");
        PathBuf::from("models")
    });
    let resolver = ModelResolver::with_cache_dir(cache_dir)
        .bundled_dir(model_dir)
        .progress(Box::new(download_progress));

    let mut loader = WhisperModelLoader::new(resolver);
    if let Some(n) = threads {
        loader = loader.with_threads(n);
    }

    let models = ModelManager::new(model, Box::new(loader), Box::new(EnvironmentDeviceSelector));
    TranscribeAudioUseCase::new(models, Some(Box::new(FfmpegDurationProbe)))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Ctrl-C prints a failure envelope and exits with status 1.
fn install_interrupt_handler(task_id: Option<String>, format: OutputFormat) {
    let handler = move || {
        log::info!("Interrupted by user");
        let result = TranscriptionResult::failure(
            task_id.clone(),
            ErrorKind::Interrupted,
            "interrupted by user",
            0,
        );
        println!("{}", render(&result, format));
        process::exit(1);
    };
    if let Err(e) = ctrlc::set_handler(handler) {
        log::warn!("Could not install interrupt handler: {e}");
    }
}

fn render(result: &TranscriptionResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => result.to_json_pretty().unwrap_or_else(|e| {
            log::error!("Failed to serialize result: {e}");
            format!("{TEXT_ERROR_PREFIX}: {e}")
        }),
        OutputFormat::Text => match result {
            TranscriptionResult::Success(s) => s.text.clone(),
            TranscriptionResult::Failure(f) => format!("{TEXT_ERROR_PREFIX}: {}", f.error_message),
        },
    }
}

fn exit_code(result: &TranscriptionResult) -> i32 {
    if result.is_success() {
        0
    } else {
        1
    }
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading Whisper model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading Whisper model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use transcribe_core::transcription::domain::segment::Segment;
    use transcribe_core::transcription::domain::transcription_result::{
        ModelInfo, TranscriptionSuccess,
    };

    fn success() -> TranscriptionResult {
        TranscriptionResult::Success(TranscriptionSuccess {
            task_id: Some("42".into()),
            text: "你好，世界".into(),
            language: Some("zh".into()),
            duration_seconds: 1.5,
            processing_time_ms: 10,
            confidence: 0.9,
            segments: vec![Segment {
                id: 0,
                text: "你好，世界".into(),
                start: 0.0,
                end: 1.5,
                confidence: 0.9,
            }],
            model_info: ModelInfo {
                name: "base".into(),
                device: "cpu".into(),
            },
        })
    }

    fn failure() -> TranscriptionResult {
        TranscriptionResult::failure(
            Some("42".into()),
            ErrorKind::AudioNotFoundError,
            "audio file not found: /x.wav",
            0,
        )
    }

    #[test]
    fn test_parse_minimal_args() {
        let cli = Cli::try_parse_from(["transcribe-task", "--audio-file", "a.wav"]).unwrap();
        assert_eq!(cli.audio_file, PathBuf::from("a.wav"));
        assert_eq!(cli.model, None);
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert!(cli.task_id.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_underscore_aliases() {
        let cli = Cli::try_parse_from([
            "transcribe-task",
            "--audio_file",
            "a.mp3",
            "--model",
            "small",
            "--language",
            "ja",
            "--task_id",
            "t-1",
            "--output_format",
            "text",
        ])
        .unwrap();
        assert_eq!(cli.audio_file, PathBuf::from("a.mp3"));
        assert_eq!(cli.model, Some(ModelName::Small));
        assert_eq!(cli.language.as_deref(), Some("ja"));
        assert_eq!(cli.task_id.as_deref(), Some("t-1"));
        assert_eq!(cli.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_audio_file_is_required() {
        assert!(Cli::try_parse_from(["transcribe-task"]).is_err());
    }

    #[test]
    fn test_unknown_model_is_rejected() {
        let parsed =
            Cli::try_parse_from(["transcribe-task", "--audio-file", "a.wav", "--model", "huge"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_render_json_success_keeps_non_ascii() {
        let out = render(&success(), OutputFormat::Json);
        assert!(out.contains("你好，世界"));
        assert!(out.contains("\n  \"success\": true"));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["task_id"], "42");
    }

    #[test]
    fn test_render_text_success_is_bare_text() {
        assert_eq!(render(&success(), OutputFormat::Text), "你好，世界");
    }

    #[test]
    fn test_render_text_failure_has_error_prefix() {
        assert_eq!(
            render(&failure(), OutputFormat::Text),
            "错误: audio file not found: /x.wav"
        );
    }

    #[test]
    fn test_render_json_failure() {
        let value: serde_json::Value =
            serde_json::from_str(&render(&failure(), OutputFormat::Json)).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error_type"], "AudioNotFoundError");
    }

    #[rstest]
    #[case(success(), 0)]
    #[case(failure(), 1)]
    fn test_exit_code(#[case] result: TranscriptionResult, #[case] expected: i32) {
        assert_eq!(exit_code(&result), expected);
    }

    #[test]
    fn test_run_with_missing_audio_returns_failure_envelope() {
        let cli = Cli::try_parse_from([
            "transcribe-task",
            "--audio-file",
            "/nonexistent/input.wav",
            "--task-id",
            "missing",
        ])
        .unwrap();
        let result = run(cli).unwrap();
        assert!(!result.is_success());
        assert_eq!(result.task_id(), Some("missing"));
        assert_eq!(result.processing_time_ms(), 0);
    }

    #[test]
    fn test_run_with_bad_config_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = tmp.path().join("settings.json");
        std::fs::write(&config, "not json").unwrap();
        let cli = Cli::try_parse_from([
            "transcribe-task",
            "--audio-file",
            "a.wav",
            "--config",
            config.to_str().unwrap(),
        ])
        .unwrap();
        assert!(run(cli).is_err());
    }
}
