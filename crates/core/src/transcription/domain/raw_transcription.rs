/// One segment as emitted by the recognizer, before normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSegment {
    pub id: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub no_speech_prob: Option<f64>,
}

/// Direct output of a recognizer call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawTranscription {
    pub text: String,
    /// Language the model used or detected, if it reported one.
    pub language: Option<String>,
    pub segments: Vec<RawSegment>,
}
