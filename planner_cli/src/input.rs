//! Parsing of raw user input into engine arguments.

use chrono::NaiveDate;
use planner_core::{Error, ExerciseType, ParamMap, ParamValue, Result};

/// Parse a numeric id typed by the user
pub fn parse_id(raw: &str, what: &str) -> Result<u32> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| Error::Validation(format!("{} must be a number.", what)))
}

/// Parse an optional `YYYY-MM-DD` date; blank means none
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| Error::Validation(format!("Invalid date '{}': {}. Use YYYY-MM-DD.", raw, e)))
}

/// Split a `key=value` argument
pub fn parse_key_value(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(Error::Validation(format!(
            "Invalid parameter '{}'. Use key=value.",
            raw
        ))),
    }
}

/// Coerce raw values using the kinds declared by `exercise_type`
///
/// Undeclared keys are kept with an inferred type.
pub fn coerce_params(
    exercise_type: &ExerciseType,
    raw: &[(String, String)],
) -> Result<ParamMap<ParamValue>> {
    raw.iter()
        .map(|(key, value)| {
            let value = match exercise_type.parameters_metadata.get(key) {
                Some(kind) => kind.coerce(key, value)?,
                None => ParamValue::infer(value),
            };
            Ok::<_, Error>((key.as_str(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::default_exercise_types;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 12 ", "Plan ID").unwrap(), 12);
        let err = parse_id("abc", "Plan ID").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Plan ID must be a number.");
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date("").unwrap(), None);
        assert_eq!(
            parse_optional_date("2025-12-24").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 24)
        );
        assert!(parse_optional_date("24.12.2025").is_err());
    }

    #[test]
    fn test_coerce_params_uses_declared_kinds() {
        let sprint = &default_exercise_types()[0];
        let raw = vec![
            ("distance_m".to_string(), "60".to_string()),
            ("repetitions".to_string(), "8".to_string()),
            ("coach".to_string(), "Jana".to_string()),
        ];

        let params = coerce_params(sprint, &raw).unwrap();
        assert_eq!(params.get("distance_m"), Some(&ParamValue::Float(60.0)));
        assert_eq!(params.get("repetitions"), Some(&ParamValue::Int(8)));
        assert_eq!(params.get("coach"), Some(&ParamValue::from("Jana")));

        let bad = vec![("repetitions".to_string(), "eight".to_string())];
        assert!(coerce_params(sprint, &bad).is_err());
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("shots_taken = 10").unwrap(),
            ("shots_taken".to_string(), "10".to_string())
        );
        assert!(parse_key_value("shots_taken").is_err());
        assert!(parse_key_value("=10").is_err());
    }
}
