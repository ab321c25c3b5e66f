//! Data file persistence with file locking.
//!
//! The whole `SystemData` aggregate lives in one human-readable JSON document.
//! Loads take a shared lock; saves hold an exclusive lock on the current file
//! while they write a temp file and atomically rename it over the original, so
//! readers never observe a half-written file.

use crate::catalog::initial_system_data;
use crate::types::{ExerciseType, Identified, SystemData};
use crate::{Error, Result};
use fs2::FileExt;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Next free id in a scope: one past the largest existing id, or 1 when empty
///
/// Fails once the largest id is `u32::MAX`; ids are never reused.
pub fn next_id<'a, T, I>(entities: I) -> Result<u32>
where
    T: Identified + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let max = entities.into_iter().map(Identified::id).max().unwrap_or(0);
    max.checked_add(1)
        .ok_or_else(|| Error::Validation(format!("Id space exhausted (largest id is {}).", max)))
}

/// The backing JSON document for all planner data
#[derive(Clone, Debug)]
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data file with the default exercise types if it doesn't exist
    ///
    /// Returns `true` when a new file was written. Existing files are left untouched.
    pub fn ensure_initialized(&self) -> Result<bool> {
        if self.path.exists() {
            tracing::debug!("Data file {:?} already present", self.path);
            return Ok(false);
        }

        self.save(&initial_system_data())?;
        tracing::info!("Initialized new data file at {:?}", self.path);
        Ok(true)
    }

    /// Read and reconstruct the full `SystemData`
    ///
    /// Exercise codes are normalized to upper case. A document that isn't valid
    /// JSON, lacks required fields, or repeats ids or codes is reported as
    /// [`Error::DataCorruption`].
    pub fn load(&self) -> Result<SystemData> {
        let file = File::open(&self.path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;
        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        let mut data: SystemData =
            serde_json::from_str(&contents).map_err(|e| self.corrupted(e))?;
        normalize_codes(&mut data);

        let problems = validate_ids(&data);
        if !problems.is_empty() {
            return Err(self.corrupted(problems.join("; ")));
        }

        tracing::debug!(
            "Loaded {} players, {} exercise types, {} plans from {:?}",
            data.players.len(),
            data.exercise_types.len(),
            data.training_plans.len(),
            self.path
        );
        Ok(data)
    }

    /// Write the snapshot, fully replacing prior content
    ///
    /// Atomically writes by:
    /// 1. Locking the current file, if any
    /// 2. Writing to a temp file in the same directory and syncing it
    /// 3. Renaming over the original
    pub fn save(&self, data: &SystemData) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        // Saves from separate processes queue on the current file until the rename
        let current = match File::open(&self.path) {
            Ok(file) => {
                file.lock_exclusive()?;
                Some(file)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            // Four-space indent keeps the file readable; non-ASCII stays verbatim
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            data.serialize(&mut ser)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        if let Some(file) = current {
            file.unlock()?;
        }

        tracing::debug!("Saved data file {:?}", self.path);
        Ok(())
    }

    fn corrupted(&self, reason: impl ToString) -> Error {
        Error::DataCorruption {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Bring hand-edited exercise codes into the form lookups expect
fn normalize_codes(data: &mut SystemData) {
    for exercise_type in &mut data.exercise_types {
        exercise_type.code = ExerciseType::normalize_code(&exercise_type.code);
    }
    for unit in data.training_plans.iter_mut().flat_map(|p| p.exercises.iter_mut()) {
        unit.type_code = ExerciseType::normalize_code(&unit.type_code);
    }
}

/// Check id uniqueness: players and plans within their lists, units across all plans
fn validate_ids(data: &SystemData) -> Vec<String> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for player in &data.players {
        if !seen.insert(player.id) {
            errors.push(format!("duplicate player id {}", player.id));
        }
    }

    let mut seen = HashSet::new();
    for code in data.exercise_types.iter().map(|t| &t.code) {
        if !seen.insert(code) {
            errors.push(format!("duplicate exercise type code '{}'", code));
        }
    }

    let mut seen_plans = HashSet::new();
    let mut seen_units = HashSet::new();
    for plan in &data.training_plans {
        if !seen_plans.insert(plan.id) {
            errors.push(format!("duplicate training plan id {}", plan.id));
        }
        for unit in &plan.exercises {
            if !seen_units.insert(unit.id) {
                errors.push(format!("duplicate training unit id {}", unit.id));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use crate::types::{Player, PlanStatus, TrainingPlan, TrainingUnit};
    use chrono::NaiveDate;

    fn populated_data() -> SystemData {
        let mut data = initial_system_data();
        data.players.push(Player {
            id: 1,
            name: "Lukáš Novák".into(),
            position: "Záložník".into(),
        });
        data.training_plans.push(TrainingPlan {
            id: 1,
            player_id: 1,
            date_assigned: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            target_completion_date: NaiveDate::from_ymd_opt(2025, 12, 15),
            exercises: vec![
                TrainingUnit {
                    id: 1,
                    type_code: "SPRINT".into(),
                    specific_parameters: [
                        ("distance_m", ParamValue::Float(50.0)),
                        ("repetitions", ParamValue::Int(10)),
                        ("status", ParamValue::from("Completed")),
                    ]
                    .into_iter()
                    .collect(),
                },
                TrainingUnit {
                    id: 2,
                    type_code: "SHOOT".into(),
                    specific_parameters: [
                        ("shots_taken", ParamValue::Int(20)),
                        ("goals_scored", ParamValue::Int(12)),
                        ("note", ParamValue::from("left foot")),
                    ]
                    .into_iter()
                    .collect(),
                },
            ],
            status: PlanStatus::Pending,
        });
        data
    }

    #[test]
    fn test_next_id() {
        let empty: Vec<Player> = Vec::new();
        assert_eq!(next_id(&empty).unwrap(), 1);

        let data = populated_data();
        assert_eq!(next_id(&data.players).unwrap(), 2);
        assert_eq!(next_id(&data.training_plans).unwrap(), 2);
    }

    #[test]
    fn test_next_id_skips_past_max_not_count() {
        let players = vec![
            Player { id: 7, name: "A".into(), position: "GK".into() },
            Player { id: 3, name: "B".into(), position: "CB".into() },
        ];
        assert_eq!(next_id(&players).unwrap(), 8);
    }

    #[test]
    fn test_next_id_at_max_id_fails_instead_of_wrapping() {
        let players = vec![Player { id: u32::MAX, name: "A".into(), position: "GK".into() }];
        let err = next_id(&players).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Id space exhausted"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("training_data.json"));

        let data = populated_data();
        file.save(&data).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_saved_document_is_indented_and_keeps_non_ascii() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("training_data.json"));
        file.save(&populated_data()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.contains("Lukáš Novák"));
        assert!(contents.contains("\n    \"players\": ["));
        assert!(contents.contains("\"date_assigned\": \"2025-12-01\""));
    }

    #[test]
    fn test_ensure_initialized_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("nested/dir/training_data.json"));

        assert!(file.ensure_initialized().unwrap());
        let initial = file.load().unwrap();
        assert_eq!(initial, initial_system_data());

        // Existing content is not overwritten
        file.save(&populated_data()).unwrap();
        assert!(!file.ensure_initialized().unwrap());
        assert_eq!(file.load().unwrap().players.len(), 1);
    }

    #[test]
    fn test_malformed_document_is_corruption() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("training_data.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let err = DataFile::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::DataCorruption { .. }));
    }

    #[test]
    fn test_missing_field_is_corruption() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("training_data.json");
        std::fs::write(&path, r#"{"players": [], "exercise_types": []}"#).unwrap();

        let err = DataFile::new(&path).load().unwrap_err();
        match err {
            Error::DataCorruption { reason, .. } => assert!(reason.contains("training_plans")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_unit_ids_across_plans_is_corruption() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("training_data.json"));

        let mut data = populated_data();
        let mut second = data.training_plans[0].clone();
        second.id = 2;
        data.training_plans.push(second);
        file.save(&data).unwrap();

        let err = file.load().unwrap_err();
        assert!(err.to_string().contains("duplicate training unit id"));
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("training_data.json"));
        file.save(&populated_data()).unwrap();
        file.save(&initial_system_data()).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "training_data.json")
            .collect();
        assert!(extras.is_empty(), "Expected only the data file, found {:?}", extras);
    }

    #[test]
    fn test_bool_and_null_parameters_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("training_data.json");
        std::fs::write(
            &path,
            r#"{"players": [{"id": 1, "name": "Lukas", "position": "GK"}],
                "exercise_types": [{"code": "JUMP", "description": "",
                                    "parameters_metadata": {"jumps_count": "int"}}],
                "training_plans": [{"id": 1, "player_id": 1, "date_assigned": "2025-12-01",
                                    "target_completion_date": null, "status": "Pending",
                                    "exercises": [{"id": 1, "type_code": "JUMP",
                                                   "specific_parameters": {"jumps_count": 8, "warmup": true, "coach": null}}]}]}"#,
        )
        .unwrap();

        let file = DataFile::new(&path);
        let data = file.load().unwrap();
        let params = &data.training_plans[0].exercises[0].specific_parameters;
        assert_eq!(params.get("warmup"), Some(&ParamValue::Bool(true)));
        assert_eq!(params.get("coach"), Some(&ParamValue::Null));

        file.save(&data).unwrap();
        assert_eq!(file.load().unwrap(), data);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"warmup\": true"));
        assert!(contents.contains("\"coach\": null"));
    }

    #[test]
    fn test_load_normalizes_exercise_codes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("training_data.json"));

        let mut data = populated_data();
        data.exercise_types[0].code = " sprint".into();
        data.training_plans[0].exercises[0].type_code = "Sprint".into();
        file.save(&data).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded.exercise_types[0].code, "SPRINT");
        assert_eq!(loaded.training_plans[0].exercises[0].type_code, "SPRINT");
        assert!(crate::lookup::find_exercise_type(&loaded, "sprint").is_some());
    }

    #[test]
    fn test_codes_differing_only_in_case_are_corruption() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("training_data.json"));

        let mut data = populated_data();
        let mut lower = data.exercise_types[0].clone();
        lower.code = "sprint".into();
        data.exercise_types.push(lower);
        file.save(&data).unwrap();

        let err = file.load().unwrap_err();
        assert!(err.to_string().contains("duplicate exercise type code 'SPRINT'"));
    }

    #[test]
    fn test_save_waits_for_lock_on_current_file() {
        use std::sync::mpsc;
        use std::time::Duration;

        let temp_dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(temp_dir.path().join("training_data.json"));
        file.save(&initial_system_data()).unwrap();

        // Another process holding the file keeps the save from replacing it
        let holder = File::open(file.path()).unwrap();
        holder.lock_shared().unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let saver = file.clone();
        let handle = std::thread::spawn(move || {
            let result = saver.save(&populated_data());
            done_tx.send(()).unwrap();
            result
        });

        assert!(done_rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert!(file.load().unwrap().players.is_empty());

        holder.unlock().unwrap();
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        handle.join().unwrap().unwrap();
        assert_eq!(file.load().unwrap().players.len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = DataFile::new(temp_dir.path().join("absent.json")).load().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
