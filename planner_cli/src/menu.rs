//! Interactive numbered menu.
//!
//! Validation and not-found problems are reported and the loop continues;
//! only I/O failures on the terminal end the session early.

use crate::display;
use crate::input::{parse_id, parse_optional_date};
use planner_core::{parse_parameter_spec, Error, ParamMap, Planner, Result, SnapshotSink};
use std::io::{BufRead, Write};

pub struct Menu<'a, S: SnapshotSink, R: BufRead, W: Write> {
    planner: &'a mut Planner<S>,
    input: R,
    out: W,
}

impl<'a, S: SnapshotSink, R: BufRead, W: Write> Menu<'a, S, R, W> {
    pub fn new(planner: &'a mut Planner<S>, input: R, out: W) -> Self {
        Self {
            planner,
            input,
            out,
        }
    }

    /// Run until the user picks 0 or input ends
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.out, "\n=== WELCOME TO THE TRAINING PLANNER (Trainer Mode) ===")?;

        loop {
            self.write_menu()?;
            let Some(choice) = self.prompt("Enter choice (0-5): ")? else {
                break;
            };

            let result = match choice.as_str() {
                "1" => self.view_players_and_plans(),
                "2" => self.add_player(),
                "3" => self.define_exercise_type(),
                "4" => self.create_and_assign_plan(),
                "5" => self.mark_exercise_completed(),
                "0" => break,
                _ => {
                    writeln!(self.out, "Invalid choice, please try again.")?;
                    Ok(())
                }
            };

            match result {
                Ok(()) => {}
                Err(e) if e.is_validation() => writeln!(self.out, "ERROR: {}", e)?,
                Err(e) => return Err(e),
            }
        }

        writeln!(self.out, "Exiting Planner. Goodbye!")?;
        Ok(())
    }

    fn write_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- MAIN MENU ---")?;
        writeln!(self.out, "1. View Player List & Current Plans")?;
        writeln!(self.out, "2. Add New Player")?;
        writeln!(self.out, "3. Define New Exercise Type")?;
        writeln!(self.out, "4. Create and Assign New Training Plan")?;
        writeln!(self.out, "5. Mark Exercise as Completed in a Plan")?;
        writeln!(self.out, "0. Exit")?;
        Ok(())
    }

    /// Print a label and read one trimmed line; `None` at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like `prompt`, but end of input counts as a blank answer
    fn ask(&mut self, label: &str) -> Result<String> {
        Ok(self.prompt(label)?.unwrap_or_default())
    }

    fn view_players_and_plans(&mut self) -> Result<()> {
        display::write_roster(&mut self.out, self.planner.data())?;
        Ok(())
    }

    fn add_player(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- ADD NEW PLAYER ---")?;
        let name = self.ask("Enter player's name: ")?;
        let position = self.ask("Enter player's position: ")?;

        let player = self.planner.add_player(&name, &position)?;
        writeln!(
            self.out,
            "Player '{}' (ID {}) successfully added.",
            player.name, player.id
        )?;
        Ok(())
    }

    fn define_exercise_type(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- DEFINE NEW EXERCISE TYPE ---")?;
        writeln!(self.out, "Existing Types:")?;
        display::write_exercise_types(&mut self.out, self.planner.data())?;

        let code = self.ask("Enter unique CODE (e.g., TACKLE): ")?;
        let description = self.ask("Enter description: ")?;
        if self.planner.find_exercise_type(&code).is_some() {
            return Err(Error::DuplicateCode(code.to_uppercase()));
        }

        let spec = self.ask("Enter parameters (e.g., 'reps:int, distance_m:float'): ")?;
        let parameters = parse_parameter_spec(&spec)?;

        let exercise_type = self
            .planner
            .define_exercise_type(&code, &description, parameters)?;
        writeln!(
            self.out,
            "New exercise type '{}' successfully defined.",
            exercise_type.code
        )?;
        Ok(())
    }

    fn create_and_assign_plan(&mut self) -> Result<()> {
        self.view_players_and_plans()?;
        if self.planner.data().players.is_empty() {
            return Ok(());
        }

        let player_id = parse_id(&self.ask("\nEnter Player ID to assign plan to: ")?, "Player ID")?;
        let Some(player_name) = self.planner.find_player(player_id).map(|p| p.name.clone()) else {
            writeln!(self.out, "ERROR: Player not found.")?;
            return Ok(());
        };

        let target = parse_optional_date(
            &self.ask("Enter Target Completion Date (YYYY-MM-DD, or leave blank): ")?,
        )?;
        let Some(plan) = self.planner.create_training_plan(player_id, target)? else {
            writeln!(self.out, "ERROR: Failed to create plan.")?;
            return Ok(());
        };
        writeln!(
            self.out,
            "Plan ID {} created for {}. Now adding exercises...",
            plan.id, player_name
        )?;

        loop {
            writeln!(self.out, "\nAvailable Exercise Types:")?;
            display::write_exercise_types(&mut self.out, self.planner.data())?;

            let Some(code) = self.prompt("Enter Exercise CODE to add (or 'DONE' to finish): ")? else {
                break;
            };
            if code.eq_ignore_ascii_case("DONE") {
                break;
            }

            match self.add_unit(plan.id, &code) {
                Ok(()) => {}
                Err(e) if e.is_validation() => {
                    writeln!(self.out, "ERROR: Could not add exercise. {}", e)?
                }
                Err(e) => return Err(e),
            }
        }

        writeln!(
            self.out,
            "\nTraining Plan {} finalized for {}.",
            plan.id, player_name
        )?;
        Ok(())
    }

    fn add_unit(&mut self, plan_id: u32, code: &str) -> Result<()> {
        let Some(exercise_type) = self.planner.find_exercise_type(code).cloned() else {
            writeln!(self.out, "Invalid exercise code.")?;
            return Ok(());
        };

        let mut params = ParamMap::new();
        for (name, kind) in exercise_type.parameters_metadata.iter() {
            let raw = self.ask(&format!("  Enter value for {} ({}): ", name, kind))?;
            params.insert(name, kind.coerce(name, &raw)?);
        }

        match self.planner.add_exercise_to_plan(plan_id, &exercise_type.code, params)? {
            Some(unit) => writeln!(
                self.out,
                "Exercise '{}' added to Plan {} as unit {}.",
                unit.type_code, plan_id, unit.id
            )?,
            None => writeln!(self.out, "ERROR: Plan or exercise type not found.")?,
        }
        Ok(())
    }

    fn mark_exercise_completed(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- MARK EXERCISE COMPLETED ---")?;
        if !display::write_open_units(&mut self.out, self.planner.data())? {
            writeln!(self.out, "No pending training plans found.")?;
            return Ok(());
        }

        let plan_id = parse_id(&self.ask("\nEnter Plan ID: ")?, "Plan ID")?;
        let unit_id = parse_id(&self.ask("Enter Unit ID to mark as Completed: ")?, "Unit ID")?;

        if self.planner.mark_exercise_completed(plan_id, unit_id) {
            writeln!(
                self.out,
                "Unit ID {} in Plan {} marked as COMPLETED.",
                unit_id, plan_id
            )?;
        } else {
            writeln!(self.out, "ERROR: Plan or Unit ID not found.")?;
        }
        Ok(())
    }
}
