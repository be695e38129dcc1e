use std::fmt;

/// Lifecycle of a single transcription request.
///
/// `Idle → Validating → ModelReady → Transcribing → PostProcessing → Succeeded`,
/// or `Failed` from `Validating`, `ModelReady` or `Transcribing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStage {
    Idle,
    Validating,
    ModelReady,
    Transcribing,
    PostProcessing,
    Succeeded,
    Failed,
}

impl TaskStage {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: TaskStage) -> bool {
        use TaskStage::*;
        matches!(
            (self, next),
            (Idle, Validating)
                | (Validating, ModelReady)
                | (ModelReady, Transcribing)
                | (Transcribing, PostProcessing)
                | (PostProcessing, Succeeded)
                | (Validating, Failed)
                | (ModelReady, Failed)
                | (Transcribing, Failed)
        )
    }
}

impl fmt::Display for TaskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskStage::Idle => "idle",
            TaskStage::Validating => "validating",
            TaskStage::ModelReady => "model-ready",
            TaskStage::Transcribing => "transcribing",
            TaskStage::PostProcessing => "post-processing",
            TaskStage::Succeeded => "succeeded",
            TaskStage::Failed => "failed",
        };
        f.write_str(name)
    }
}
