pub mod confidence;
pub mod error;
pub mod language;
pub mod model;
pub mod options;
pub mod raw_transcription;
pub mod segment;
pub mod speech_recognizer;
pub mod transcription_result;
