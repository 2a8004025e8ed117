//! Background task tracking for progress notifications.
//!
//! Progress callbacks run off the pipeline's critical path: a slow or
//! panicking callback must never stall or abort generation. Tasks are
//! tracked so the run can account for failures before returning.

use tokio::task::JoinSet;
use tracing::warn;

use crate::types::{GenerationPhase, ProgressCallback};

#[derive(Default)]
pub struct BackgroundTasks {
    set: JoinSet<()>,
}

impl BackgroundTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches a phase notification without blocking the pipeline.
    pub fn notify(&mut self, callback: Option<&ProgressCallback>, phase: GenerationPhase) {
        let Some(callback) = callback else {
            return;
        };
        let callback = callback.clone();
        self.set.spawn(async move {
            callback(phase);
        });
    }

    /// Waits for every outstanding notification and returns how many
    /// panicked. Failures are logged, never propagated.
    pub async fn drain(&mut self) -> usize {
        let mut failed = 0usize;
        while let Some(result) = self.set.join_next().await {
            if let Err(err) = result {
                failed += 1;
                warn!(error = %err, "progress callback task failed");
            }
        }
        failed
    }
}
