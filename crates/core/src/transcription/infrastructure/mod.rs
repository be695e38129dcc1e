pub mod device_probe;
pub mod whisper_recognizer;
