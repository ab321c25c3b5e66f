//! Planning engine: roster, catalog and plan mutations.
//!
//! [`Planner`] owns the in-memory `SystemData` and a [`SnapshotSink`]. Every
//! successful mutation hands a snapshot to the sink before returning, so a
//! success means a save was submitted, not that it has reached disk.
//!
//! Rules enforced here:
//! - Ids are one past the current maximum of their scope; unit ids share a
//!   single system-wide scope across all plans
//! - Units must supply every parameter their exercise type declares, with
//!   values of the declared kind (ints widen to floats); extra keys are kept
//! - A plan becomes Completed once every unit carries the completion marker

use crate::lookup::{self, all_units};
use crate::params::{ParamKind, ParamMap, ParamValue, STATUS_KEY};
use crate::store::next_id;
use crate::summary::{plan_summary, PlanSummary};
use crate::types::{
    ExerciseType, Player, PlanStatus, SystemData, TrainingPlan, TrainingUnit,
};
use crate::writer::SnapshotSink;
use crate::{Error, Result};
use chrono::{Local, NaiveDate};

/// The in-memory store plus the sink that persists it
pub struct Planner<S: SnapshotSink> {
    data: SystemData,
    sink: S,
}

impl<S: SnapshotSink> Planner<S> {
    pub fn new(data: SystemData, sink: S) -> Self {
        Self { data, sink }
    }

    pub fn data(&self) -> &SystemData {
        &self.data
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> SystemData {
        self.data.clone()
    }

    /// Swap in a whole new state and persist it
    pub fn replace(&mut self, data: SystemData) {
        self.data = data;
        self.persist();
    }

    /// Apply an arbitrary change to a copy of the state
    ///
    /// The copy replaces the state and is persisted only if `f` succeeds;
    /// on error nothing `f` did is kept.
    pub fn update<F, T>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SystemData) -> Result<T>,
    {
        let mut next = self.data.clone();
        let value = f(&mut next)?;
        self.data = next;
        self.persist();
        Ok(value)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (SystemData, S) {
        (self.data, self.sink)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn find_player(&self, id: u32) -> Option<&Player> {
        lookup::find_player(&self.data, id)
    }

    pub fn find_exercise_type(&self, code: &str) -> Option<&ExerciseType> {
        lookup::find_exercise_type(&self.data, code)
    }

    pub fn find_plan(&self, id: u32) -> Option<&TrainingPlan> {
        lookup::find_plan(&self.data, id)
    }

    /// Summary for a plan by id; `None` if the plan doesn't exist
    pub fn plan_summary(&self, plan_id: u32) -> Option<PlanSummary> {
        self.find_plan(plan_id).map(plan_summary)
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Register a player; name and position must be non-blank
    pub fn add_player(&mut self, name: &str, position: &str) -> Result<Player> {
        let name = name.trim();
        let position = position.trim();
        if name.is_empty() || position.is_empty() {
            return Err(Error::Validation(
                "Name and position cannot be empty.".into(),
            ));
        }

        let player = Player {
            id: next_id(&self.data.players)?,
            name: name.to_string(),
            position: position.to_string(),
        };
        self.data.players.push(player.clone());
        tracing::info!("Added player {} ({})", player.id, player.name);

        self.persist();
        Ok(player)
    }

    /// Add an exercise type to the catalog
    ///
    /// The code is trimmed and upper-cased before the uniqueness check.
    pub fn define_exercise_type(
        &mut self,
        code: &str,
        description: &str,
        parameters: ParamMap<ParamKind>,
    ) -> Result<ExerciseType> {
        let code = ExerciseType::normalize_code(code);
        if code.is_empty() {
            return Err(Error::Validation("Exercise code cannot be empty.".into()));
        }
        if self.find_exercise_type(&code).is_some() {
            return Err(Error::DuplicateCode(code));
        }
        if parameters.contains_key(STATUS_KEY) {
            return Err(Error::Validation(format!(
                "'{}' is reserved and cannot be declared as a parameter",
                STATUS_KEY
            )));
        }

        let exercise_type = ExerciseType {
            code,
            description: description.trim().to_string(),
            parameters_metadata: parameters,
        };
        self.data.exercise_types.push(exercise_type.clone());
        tracing::info!(
            "Defined exercise type {} with {} parameters",
            exercise_type.code,
            exercise_type.parameters_metadata.len()
        );

        self.persist();
        Ok(exercise_type)
    }

    /// Create an empty plan for a player, assigned today
    ///
    /// Returns `Ok(None)` if the player doesn't exist.
    pub fn create_training_plan(
        &mut self,
        player_id: u32,
        target_completion_date: Option<NaiveDate>,
    ) -> Result<Option<TrainingPlan>> {
        let today = Local::now().date_naive();
        self.create_training_plan_on(player_id, target_completion_date, today)
    }

    /// [`Planner::create_training_plan`] with an explicit assignment date
    pub fn create_training_plan_on(
        &mut self,
        player_id: u32,
        target_completion_date: Option<NaiveDate>,
        date_assigned: NaiveDate,
    ) -> Result<Option<TrainingPlan>> {
        if self.find_player(player_id).is_none() {
            tracing::debug!("Cannot create plan: player {} not found", player_id);
            return Ok(None);
        }

        let plan = TrainingPlan {
            id: next_id(&self.data.training_plans)?,
            player_id,
            date_assigned,
            target_completion_date,
            exercises: Vec::new(),
            status: PlanStatus::Pending,
        };
        self.data.training_plans.push(plan.clone());
        tracing::info!("Created plan {} for player {}", plan.id, player_id);

        self.persist();
        Ok(Some(plan))
    }

    /// Append a unit of `type_code` to a plan
    ///
    /// Returns `Ok(None)` if the plan or exercise type doesn't exist.
    /// Fails with [`Error::MissingParameters`] if a declared parameter is absent
    /// and [`Error::InvalidParameter`] if a value doesn't fit its declared kind.
    pub fn add_exercise_to_plan(
        &mut self,
        plan_id: u32,
        type_code: &str,
        params: ParamMap<ParamValue>,
    ) -> Result<Option<TrainingUnit>> {
        if self.find_plan(plan_id).is_none() {
            tracing::debug!("Cannot add unit: plan {} not found", plan_id);
            return Ok(None);
        }
        let Some(exercise_type) = self.find_exercise_type(type_code) else {
            tracing::debug!("Cannot add unit: exercise type {} not found", type_code);
            return Ok(None);
        };

        let specific_parameters = validate_parameters(exercise_type, params)?;
        let unit = TrainingUnit {
            id: next_id(all_units(&self.data))?,
            type_code: exercise_type.code.clone(),
            specific_parameters,
        };

        let Some(plan) = lookup::find_plan_mut(&mut self.data, plan_id) else {
            return Ok(None);
        };
        plan.exercises.push(unit.clone());
        tracing::info!(
            "Added unit {} ({}) to plan {}",
            unit.id,
            unit.type_code,
            plan_id
        );

        self.persist();
        Ok(Some(unit))
    }

    /// Mark a unit completed and complete the plan if nothing is left
    ///
    /// Returns `false` if the plan doesn't exist or doesn't contain the unit.
    /// Re-marking a completed unit succeeds without changing anything.
    pub fn mark_exercise_completed(&mut self, plan_id: u32, unit_id: u32) -> bool {
        let Some(plan) = lookup::find_plan_mut(&mut self.data, plan_id) else {
            tracing::debug!("Cannot complete unit: plan {} not found", plan_id);
            return false;
        };
        let Some(unit) = plan.exercises.iter_mut().find(|u| u.id == unit_id) else {
            tracing::debug!("Cannot complete unit: {} not in plan {}", unit_id, plan_id);
            return false;
        };

        unit.mark_completed();
        if plan.all_units_completed() && plan.status != PlanStatus::Completed {
            plan.status = PlanStatus::Completed;
            tracing::info!("Plan {} completed", plan_id);
        }
        tracing::info!("Unit {} in plan {} marked completed", unit_id, plan_id);

        self.persist();
        true
    }

    fn persist(&mut self) {
        self.sink.submit(self.data.clone());
    }
}

/// Check `params` against the declared parameters of `exercise_type`
///
/// Declared values are normalized to their declared kind; undeclared extras
/// are passed through untouched.
fn validate_parameters(
    exercise_type: &ExerciseType,
    params: ParamMap<ParamValue>,
) -> Result<ParamMap<ParamValue>> {
    if params.contains_key(STATUS_KEY) {
        return Err(Error::Validation(format!(
            "'{}' is reserved for completion tracking",
            STATUS_KEY
        )));
    }

    let missing = exercise_type.missing_parameters(&params);
    if !missing.is_empty() {
        return Err(Error::MissingParameters {
            code: exercise_type.code.clone(),
            missing,
        });
    }

    params
        .iter()
        .map(|(name, value)| match exercise_type.parameters_metadata.get(name) {
            Some(kind) => kind.check(name, value).map(|v| (name, v)),
            None => Ok((name, value.clone())),
        })
        .collect()
}
