//! Default catalog of exercise types.
//!
//! A freshly initialized data file starts with these three drills.

use crate::params::ParamKind;
use crate::types::{ExerciseType, SystemData};
use once_cell::sync::Lazy;

/// Cached default exercise types - built once and cloned into new data files
static DEFAULT_EXERCISE_TYPES: Lazy<Vec<ExerciseType>> = Lazy::new(|| build_default_exercise_types());

/// Get a reference to the cached default exercise types
pub fn default_exercise_types() -> &'static [ExerciseType] {
    &DEFAULT_EXERCISE_TYPES
}

/// A `SystemData` with no players or plans and the default exercise types
pub fn initial_system_data() -> SystemData {
    SystemData {
        exercise_types: default_exercise_types().to_vec(),
        ..SystemData::default()
    }
}

fn build_default_exercise_types() -> Vec<ExerciseType> {
    vec![
        ExerciseType {
            code: "SPRINT".into(),
            description: "Short distance running training.".into(),
            parameters_metadata: [
                ("distance_m", ParamKind::Float),
                ("repetitions", ParamKind::Int),
            ]
            .into_iter()
            .collect(),
        },
        ExerciseType {
            code: "SHOOT".into(),
            description: "Goal shooting practice.".into(),
            parameters_metadata: [
                ("shots_taken", ParamKind::Int),
                ("goals_scored", ParamKind::Int),
            ]
            .into_iter()
            .collect(),
        },
        ExerciseType {
            code: "JUMP".into(),
            description: "Vertical or horizontal jumping drills.".into(),
            parameters_metadata: [
                ("jumps_count", ParamKind::Int),
                ("height_cm", ParamKind::Float),
            ]
            .into_iter()
            .collect(),
        },
    ]
}
