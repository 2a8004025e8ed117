use thiserror::Error;

use gamepress_llm::LlmError;

/// Pipeline stage names, used in errors and progress reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scouting,
    Planning,
    Writing,
    Reviewing,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Scouting => write!(f, "scouting"),
            Stage::Planning => write!(f, "planning"),
            Stage::Writing => write!(f, "writing"),
            Stage::Reviewing => write!(f, "reviewing"),
        }
    }
}

/// Hard failures that abort an article-generation run.
///
/// Soft failures (single query errors, reviewer unavailability, cliché
/// warnings) never surface here; they are attached to the draft as
/// [`crate::types::ValidationIssue`]s instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// An LLM call failed hard at the named stage, after retries.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    /// The Editor returned an unusable plan even after the corrective retry.
    #[error("editor plan invalid after corrective retry: {0}")]
    PlanInvalid(String),

    /// Every planned section failed to generate.
    #[error("no sections could be written")]
    NoSections,

    /// The run's cancellation token fired.
    #[error("generation cancelled during {0}")]
    Cancelled(Stage),
}
