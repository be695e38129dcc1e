use serde::{Deserialize, Serialize};

/// A normalized transcript segment as it appears in the result envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub confidence: f64,
}
