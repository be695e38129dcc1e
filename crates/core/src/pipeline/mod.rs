pub mod pipeline_logger;
pub mod task_stage;
pub mod transcribe_audio_use_case;
