//! Text rendering shared by the menu and one-shot commands.

use planner_core::lookup::{find_player, pending_plans, pending_units, plans_for_player};
use planner_core::params::describe_parameters;
use planner_core::{plan_summary, PlanStatus, SystemData, TrainingPlan, TrainingUnit};
use std::io::{self, Write};

/// Players with their pending plans and progress
pub fn write_roster<W: Write>(out: &mut W, data: &SystemData) -> io::Result<()> {
    if data.players.is_empty() {
        writeln!(out, "No players registered.")?;
        return Ok(());
    }

    writeln!(out, "\n--- PLAYER LIST & PENDING PLANS ---")?;
    for player in &data.players {
        writeln!(out, "\n[ID {}] {} ({})", player.id, player.name, player.position)?;

        let pending: Vec<_> = plans_for_player(data, player.id)
            .filter(|p| p.status == PlanStatus::Pending)
            .collect();
        if pending.is_empty() {
            writeln!(out, "  No pending plans.")?;
            continue;
        }

        writeln!(out, "  PENDING PLANS:")?;
        for plan in pending {
            write_plan_line(out, plan)?;
        }
    }
    Ok(())
}

fn write_plan_line<W: Write>(out: &mut W, plan: &TrainingPlan) -> io::Result<()> {
    let target = plan
        .target_completion_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "N/A".into());
    writeln!(
        out,
        "    - PLAN ID {}: Assigned {} (Target: {})",
        plan.id, plan.date_assigned, target
    )?;
    writeln!(out, "      Status: {}", plan_summary(plan))
}

/// Catalog listing with the parameters each type needs
pub fn write_exercise_types<W: Write>(out: &mut W, data: &SystemData) -> io::Result<()> {
    for exercise_type in &data.exercise_types {
        writeln!(
            out,
            "- {} ({}) [Needs: {}]",
            exercise_type.code,
            exercise_type.description,
            describe_parameters(&exercise_type.parameters_metadata)
        )?;
    }
    Ok(())
}

pub fn write_unit<W: Write>(out: &mut W, unit: &TrainingUnit) -> io::Result<()> {
    let params = unit
        .exercise_parameters()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    let state = if unit.is_completed() { "done" } else { "pending" };
    writeln!(
        out,
        "  [UNIT ID {}] {} ({}) [{}]",
        unit.id, unit.type_code, params, state
    )
}

/// Pending plans that still have open units; returns whether any pending plan exists
pub fn write_open_units<W: Write>(out: &mut W, data: &SystemData) -> io::Result<bool> {
    let mut found_pending = false;

    for plan in pending_plans(data) {
        found_pending = true;
        let open: Vec<_> = pending_units(plan).collect();
        if open.is_empty() {
            continue;
        }

        let player = find_player(data, plan.player_id)
            .map(|p| p.name.as_str())
            .unwrap_or("Unknown Player");
        writeln!(out, "\nPLAN ID {} for {}:", plan.id, player)?;
        for unit in open {
            write_unit(out, unit)?;
        }
    }

    Ok(found_pending)
}

/// Full detail for one plan
pub fn write_plan_detail<W: Write>(out: &mut W, data: &SystemData, plan: &TrainingPlan) -> io::Result<()> {
    let player = find_player(data, plan.player_id)
        .map(|p| p.name.as_str())
        .unwrap_or("Unknown Player");
    writeln!(out, "PLAN ID {} for {} [{}]", plan.id, player, plan.status)?;
    write_plan_line(out, plan)?;
    for unit in &plan.exercises {
        write_unit(out, unit)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planner_core::{initial_system_data, ParamValue, Player};

    fn data() -> SystemData {
        let mut data = initial_system_data();
        data.players.push(Player {
            id: 1,
            name: "Lukas Novak".into(),
            position: "Midfielder".into(),
        });
        data.players.push(Player {
            id: 2,
            name: "Tomas Svoboda".into(),
            position: "Forward".into(),
        });
        let mut done = TrainingUnit {
            id: 1,
            type_code: "JUMP".into(),
            specific_parameters: [("jumps_count", ParamValue::Int(10)), ("height_cm", ParamValue::Float(45.0))]
                .into_iter()
                .collect(),
        };
        done.mark_completed();
        let open = TrainingUnit {
            id: 2,
            type_code: "SHOOT".into(),
            specific_parameters: [("shots_taken", ParamValue::Int(5)), ("goals_scored", ParamValue::Int(2))]
                .into_iter()
                .collect(),
        };
        data.training_plans.push(TrainingPlan {
            id: 1,
            player_id: 1,
            date_assigned: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            target_completion_date: None,
            exercises: vec![done, open],
            status: PlanStatus::Pending,
        });
        data
    }

    #[test]
    fn test_roster_shows_progress() {
        let mut out = Vec::new();
        write_roster(&mut out, &data()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("[ID 1] Lukas Novak (Midfielder)"));
        assert!(text.contains("PLAN ID 1: Assigned 2025-12-01 (Target: N/A)"));
        assert!(text.contains("Status: 1/2 completed (50.0%)"));
        assert!(text.contains("[ID 2] Tomas Svoboda (Forward)\n  No pending plans."));
    }

    #[test]
    fn test_exercise_types_listing() {
        let mut out = Vec::new();
        write_exercise_types(&mut out, &data()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(
            "- SHOOT (Goal shooting practice.) [Needs: shots_taken (int), goals_scored (int)]"
        ));
    }

    #[test]
    fn test_open_units_skip_completed() {
        let mut out = Vec::new();
        assert!(write_open_units(&mut out, &data()).unwrap());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[UNIT ID 2] SHOOT"));
        assert!(!text.contains("[UNIT ID 1]"));
    }
}
