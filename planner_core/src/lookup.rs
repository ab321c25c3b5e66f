//! Find-by-id helpers shared by the engine and the CLI.
//!
//! Absence is a normal outcome: every lookup returns an `Option`.

use crate::types::{ExerciseType, Player, PlanStatus, SystemData, TrainingPlan, TrainingUnit};

pub fn find_player(data: &SystemData, id: u32) -> Option<&Player> {
    data.players.iter().find(|p| p.id == id)
}

/// Find an exercise type; the code is normalized before comparing
pub fn find_exercise_type<'a>(data: &'a SystemData, code: &str) -> Option<&'a ExerciseType> {
    let code = ExerciseType::normalize_code(code);
    data.exercise_types.iter().find(|t| t.code == code)
}

pub fn find_plan(data: &SystemData, id: u32) -> Option<&TrainingPlan> {
    data.training_plans.iter().find(|p| p.id == id)
}

pub fn find_plan_mut(data: &mut SystemData, id: u32) -> Option<&mut TrainingPlan> {
    data.training_plans.iter_mut().find(|p| p.id == id)
}

pub fn find_unit(plan: &TrainingPlan, unit_id: u32) -> Option<&TrainingUnit> {
    plan.exercises.iter().find(|u| u.id == unit_id)
}

/// Every unit across every plan; units share one system-wide id space
pub fn all_units(data: &SystemData) -> impl Iterator<Item = &TrainingUnit> {
    data.training_plans.iter().flat_map(|p| p.exercises.iter())
}

pub fn plans_for_player(data: &SystemData, player_id: u32) -> impl Iterator<Item = &TrainingPlan> {
    data.training_plans
        .iter()
        .filter(move |p| p.player_id == player_id)
}

pub fn pending_plans(data: &SystemData) -> impl Iterator<Item = &TrainingPlan> {
    data.training_plans
        .iter()
        .filter(|p| p.status == PlanStatus::Pending)
}

pub fn pending_units(plan: &TrainingPlan) -> impl Iterator<Item = &TrainingUnit> {
    plan.exercises.iter().filter(|u| !u.is_completed())
}
