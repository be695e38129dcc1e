use std::time::Instant;

use super::task_stage::TaskStage;

/// Cross-cutting logger for task pipeline events.
///
/// Decouples the use case from specific output mechanisms so callers can
/// observe stage progress without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Record a stage transition.
    fn stage(&mut self, stage: TaskStage);

    /// Record how long a named pipeline step took.
    fn timing(&mut self, step: &str, duration_ms: f64);

    /// Emit an end-of-task summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn stage(&mut self, _stage: TaskStage) {}
    fn timing(&mut self, _step: &str, _duration_ms: f64) {}
}

/// CLI-oriented logger that keeps the stage trail and per-step timings and
/// reports them once the task has finished.
pub struct SummaryPipelineLogger {
    stages: Vec<TaskStage>,
    timings: Vec<(String, f64)>,
    start_time: Instant,
}

impl SummaryPipelineLogger {
    pub fn new() -> Self {
        Self {
            stages: vec![TaskStage::Idle],
            timings: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn stages(&self) -> &[TaskStage] {
        &self.stages
    }

    pub fn current_stage(&self) -> TaskStage {
        self.stages.last().copied().unwrap_or(TaskStage::Idle)
    }

    /// Returns the recorded duration of a step.
    pub fn timing_for(&self, step: &str) -> Option<f64> {
        self.timings
            .iter()
            .find(|(name, _)| name == step)
            .map(|(_, ms)| *ms)
    }

    /// Returns the formatted summary string, or `None` if no step was timed.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut lines = vec![format!(
            "Task summary ({}, {:.1}s total):",
            self.current_stage(),
            elapsed_ms / 1000.0
        )];

        for (step, ms) in &self.timings {
            let pct = if elapsed_ms > 0.0 {
                ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!("  {step:12}: {ms:8.1}ms  ({pct:4.1}%)"));
        }

        let trail: Vec<String> = self.stages.iter().map(|s| s.to_string()).collect();
        lines.push(format!("  stages: {}", trail.join(" -> ")));

        Some(lines.join("\n"))
    }
}

impl Default for SummaryPipelineLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineLogger for SummaryPipelineLogger {
    fn stage(&mut self, stage: TaskStage) {
        let current = self.current_stage();
        if !current.can_transition_to(stage) {
            log::warn!("Unexpected stage transition {current} -> {stage}");
        }
        log::debug!("Stage: {stage}");
        self.stages.push(stage);
    }

    fn timing(&mut self, step: &str, duration_ms: f64) {
        self.timings.push((step.to_string(), duration_ms));
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}
