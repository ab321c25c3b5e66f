//! CSV export of training plans.
//!
//! Produces one row per training unit so plans can be reviewed in a
//! spreadsheet. Plans without units still get a single row with empty unit
//! columns.

use crate::lookup::find_player;
use crate::types::{SystemData, TrainingPlan, TrainingUnit};
use crate::Result;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    plan_id: u32,
    player_id: u32,
    player_name: String,
    date_assigned: String,
    target_completion_date: Option<String>,
    plan_status: String,
    unit_id: Option<u32>,
    type_code: Option<String>,
    unit_status: Option<String>,
    parameters: Option<String>,
}

impl CsvRow {
    fn new(data: &SystemData, plan: &TrainingPlan, unit: Option<&TrainingUnit>) -> Self {
        CsvRow {
            plan_id: plan.id,
            player_id: plan.player_id,
            player_name: find_player(data, plan.player_id)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            date_assigned: plan.date_assigned.to_string(),
            target_completion_date: plan.target_completion_date.map(|d| d.to_string()),
            plan_status: plan.status.to_string(),
            unit_id: unit.map(|u| u.id),
            type_code: unit.map(|u| u.type_code.clone()),
            unit_status: unit.map(|u| {
                if u.is_completed() { "Completed" } else { "Pending" }.to_string()
            }),
            parameters: unit.map(|u| {
                u.exercise_parameters()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("; ")
            }),
        }
    }
}

/// Write every plan to `csv_path`, replacing any existing file
///
/// Returns the number of rows written (excluding the header).
pub fn export_plans_csv(data: &SystemData, csv_path: &Path) -> Result<usize> {
    if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(csv_path)?;
    let mut rows = 0;

    for plan in &data.training_plans {
        if plan.exercises.is_empty() {
            writer.serialize(CsvRow::new(data, plan, None))?;
            rows += 1;
            continue;
        }
        for unit in &plan.exercises {
            writer.serialize(CsvRow::new(data, plan, Some(unit)))?;
            rows += 1;
        }
    }

    writer.flush()?;
    tracing::info!("Exported {} rows to {:?}", rows, csv_path);
    Ok(rows)
}
