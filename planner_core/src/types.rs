//! Core domain types for the training planner.
//!
//! This module defines the records that make up the persisted document:
//! - Players on the roster
//! - Exercise types and their declared parameters
//! - Training plans and the units they own
//! - The `SystemData` aggregate that is loaded and saved as one piece

use crate::params::{ParamKind, ParamMap, ParamValue, COMPLETED_MARKER, STATUS_KEY};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything with a numeric id that participates in id generation
pub trait Identified {
    fn id(&self) -> u32;
}

// ============================================================================
// Roster
// ============================================================================

/// A football player on the roster
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: u32,
    pub name: String,
    pub position: String,
}

impl Identified for Player {
    fn id(&self) -> u32 {
        self.id
    }
}

// ============================================================================
// Exercise catalog
// ============================================================================

/// A standardized kind of drill (sprint, shooting, ...) and the parameters it needs
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseType {
    pub code: String,
    pub description: String,
    pub parameters_metadata: ParamMap<ParamKind>,
}

impl ExerciseType {
    /// Canonical form of an exercise code (trimmed, upper case)
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Declared parameters absent from `params`, in declaration order
    pub fn missing_parameters(&self, params: &ParamMap<ParamValue>) -> Vec<String> {
        self.parameters_metadata
            .keys()
            .filter(|key| !params.contains_key(key))
            .map(str::to_string)
            .collect()
    }
}

// ============================================================================
// Plans
// ============================================================================

/// One exercise instance inside a plan
///
/// Completion is recorded in-band as `specific_parameters["status"] = "Completed"`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingUnit {
    pub id: u32,
    pub type_code: String,
    pub specific_parameters: ParamMap<ParamValue>,
}

impl TrainingUnit {
    pub fn is_completed(&self) -> bool {
        self.specific_parameters
            .get(STATUS_KEY)
            .and_then(ParamValue::as_str)
            == Some(COMPLETED_MARKER)
    }

    pub fn mark_completed(&mut self) {
        self.specific_parameters
            .insert(STATUS_KEY, ParamValue::from(COMPLETED_MARKER));
    }

    /// Exercise parameters without the completion marker
    pub fn exercise_parameters(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.specific_parameters
            .iter()
            .filter(|(k, _)| *k != STATUS_KEY)
    }
}

impl Identified for TrainingUnit {
    fn id(&self) -> u32 {
        self.id
    }
}

/// Lifecycle status of a training plan
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlanStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlanStatus::Pending => "Pending",
            PlanStatus::Completed => "Completed",
            PlanStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// A plan assigned to one player, owning its units in the order they were added
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrainingPlan {
    pub id: u32,
    pub player_id: u32,
    pub date_assigned: NaiveDate,
    pub target_completion_date: Option<NaiveDate>,
    pub exercises: Vec<TrainingUnit>,
    pub status: PlanStatus,
}

impl TrainingPlan {
    pub fn completed_count(&self) -> usize {
        self.exercises.iter().filter(|u| u.is_completed()).count()
    }

    /// True when every unit carries the completion marker (vacuously true when empty)
    pub fn all_units_completed(&self) -> bool {
        self.exercises.iter().all(TrainingUnit::is_completed)
    }
}

impl Identified for TrainingPlan {
    fn id(&self) -> u32 {
        self.id
    }
}

// ============================================================================
// Aggregate
// ============================================================================

/// Everything the planner knows; the single unit of persistence
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct SystemData {
    pub players: Vec<Player>,
    pub exercise_types: Vec<ExerciseType>,
    pub training_plans: Vec<TrainingPlan>,
}
