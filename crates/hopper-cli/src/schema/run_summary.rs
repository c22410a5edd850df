use chrono::{DateTime, Utc};
use hopper_engine::Seed;
use hopper_training::report::TrainingReport;
use serde::{Deserialize, Serialize};

/// Result of `hopper train`, written as JSON.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunSummary {
    pub trained_at: DateTime<Utc>,
    /// Seed that reproduces the whole run with `--seed`.
    pub seed: Seed,
    pub best_score: u32,
    pub first_solved_generation: Option<usize>,
    pub report: TrainingReport,
}

impl RunSummary {
    pub fn new(seed: Seed, report: TrainingReport) -> Self {
        Self {
            trained_at: Utc::now(),
            seed,
            best_score: report.best_score(),
            first_solved_generation: report.first_solved_generation(),
            report,
        }
    }
}
