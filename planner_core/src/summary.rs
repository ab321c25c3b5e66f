//! Completion summaries for training plans.

use crate::types::TrainingPlan;
use serde::Serialize;
use std::fmt;

/// Shown instead of a percentage when a plan has no units
pub const NO_UNITS_PERCENTAGE: &str = "N/A";

/// Progress counts for one plan
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PlanSummary {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// One decimal place with a percent sign (`"50.0%"`), or `"N/A"` for an empty plan
    pub completion_percentage: String,
}

/// Summarize a plan's progress. Pure; never triggers a save.
pub fn plan_summary(plan: &TrainingPlan) -> PlanSummary {
    let total = plan.exercises.len();
    let completed = plan.completed_count();

    let completion_percentage = if total > 0 {
        format!("{:.1}%", completed as f64 / total as f64 * 100.0)
    } else {
        NO_UNITS_PERCENTAGE.to_string()
    };

    PlanSummary {
        total,
        completed,
        pending: total - completed,
        completion_percentage,
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} completed ({})",
            self.completed, self.total, self.completion_percentage
        )
    }
}
