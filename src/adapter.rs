//! Workout payload adapter
//!
//! Parses workout JSON from the logging layer and converts it into typed
//! [`ActivityInput`] values. Every raw field is optional so missing required
//! fields surface as descriptive errors instead of generic parse failures.

use crate::error::ComputeError;
use crate::types::{ActivityInput, MovementType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One activity exactly as logged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawActivity {
    /// Optional caller-side identifier, echoed in error messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub movement_type: Option<MovementType>,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub load_kg: Option<f64>,
    #[serde(default)]
    pub bodyweight_kg: Option<f64>,
    #[serde(default)]
    pub minutes: Option<f64>,
    #[serde(default, alias = "RPE")]
    pub rpe: Option<f64>,
    #[serde(default)]
    pub interval_seconds: Option<f64>,
    #[serde(default, alias = "average_HR_pct")]
    pub average_hr_pct: Option<f64>,
}

/// A logged workout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSession {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// When the workout was performed; selects the ledger day
    pub performed_at: DateTime<Utc>,
    /// Fallback bodyweight for activities that omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bodyweight_kg: Option<f64>,
    #[serde(default)]
    pub activities: Vec<RawActivity>,
}

/// Parse a workout session JSON string
pub fn parse_session(json: &str) -> Result<RawSession, ComputeError> {
    serde_json::from_str(json)
        .map_err(|e| ComputeError::ParseError(format!("Failed to parse workout session: {}", e)))
}

/// Parse a single activity JSON object
pub fn parse_activity(json: &str) -> Result<RawActivity, ComputeError> {
    serde_json::from_str(json)
        .map_err(|e| ComputeError::ParseError(format!("Failed to parse activity: {}", e)))
}

/// Parse newline-delimited activities, skipping blank lines
pub fn parse_activities_ndjson(input: &str) -> Result<Vec<RawActivity>, ComputeError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_no, line)| {
            serde_json::from_str(line.trim()).map_err(|e| {
                ComputeError::ParseError(format!("Line {}: {}", line_no + 1, e))
            })
        })
        .collect()
}

/// Parse a JSON array of activities
pub fn parse_activities_array(input: &str) -> Result<Vec<RawActivity>, ComputeError> {
    serde_json::from_str(input)
        .map_err(|e| ComputeError::ParseError(format!("Failed to parse activity array: {}", e)))
}

/// Convert every activity of a session, filling bodyweight from the session
pub fn session_to_activities(session: &RawSession) -> Result<Vec<ActivityInput>, ComputeError> {
    session
        .activities
        .iter()
        .map(|raw| to_activity(raw, session.bodyweight_kg))
        .collect()
}

/// Validate one raw activity and convert it to an [`ActivityInput`]
pub fn to_activity(
    raw: &RawActivity,
    default_bodyweight_kg: Option<f64>,
) -> Result<ActivityInput, ComputeError> {
    let label = raw.activity_id.as_deref().unwrap_or("activity");

    let movement_type = raw
        .movement_type
        .ok_or_else(|| ComputeError::MissingField(format!("{label}: movement_type")))?;

    let bodyweight_kg = raw
        .bodyweight_kg
        .or(default_bodyweight_kg)
        .ok_or_else(|| ComputeError::MissingField(format!("{label}: bodyweight_kg")))?;

    let rpe = raw
        .rpe
        .ok_or_else(|| ComputeError::MissingField(format!("{label}: rpe")))?;

    if !bodyweight_kg.is_finite() || bodyweight_kg <= 0.0 {
        return Err(ComputeError::InvalidActivity(format!(
            "{label}: bodyweight_kg must be positive, got {bodyweight_kg}"
        )));
    }

    // Out-of-range RPE is tolerated downstream; only non-numbers are rejected
    if !rpe.is_finite() {
        return Err(ComputeError::InvalidActivity(format!(
            "{label}: rpe must be a finite number"
        )));
    }

    let optional = [
        ("load_kg", raw.load_kg),
        ("minutes", raw.minutes),
        ("interval_seconds", raw.interval_seconds),
        ("average_hr_pct", raw.average_hr_pct),
    ];
    for (name, value) in optional {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(ComputeError::InvalidActivity(format!(
                    "{label}: {name} must be a non-negative number, got {v}"
                )));
            }
        }
    }

    Ok(ActivityInput {
        movement_type,
        sets: raw.sets,
        reps: raw.reps,
        load_kg: raw.load_kg,
        bodyweight_kg,
        minutes: raw.minutes,
        rpe,
        interval_seconds: raw.interval_seconds,
        average_hr_pct: raw.average_hr_pct,
    })
}

/// Validation failure for one activity in a batch
#[derive(Debug)]
pub struct ActivityValidation {
    pub index: usize,
    pub activity_id: Option<String>,
    pub error: ComputeError,
}

/// Validate a batch, returning only the failures
pub fn validate_activities(
    activities: &[RawActivity],
    default_bodyweight_kg: Option<f64>,
) -> Vec<ActivityValidation> {
    activities
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| {
            to_activity(raw, default_bodyweight_kg)
                .err()
                .map(|error| ActivityValidation {
                    index,
                    activity_id: raw.activity_id.clone(),
                    error,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session_json() -> &'static str {
        r#"{
            "session_id": "sess-001",
            "user_id": "user-42",
            "performed_at": "2024-01-15T07:30:00Z",
            "bodyweight_kg": 80.0,
            "activities": [
                {
                    "activity_id": "squat",
                    "movement_type": "resistance",
                    "sets": 5,
                    "reps": 5,
                    "load_kg": 140.0,
                    "RPE": 9,
                    "interval_seconds": 8
                },
                {
                    "activity_id": "row",
                    "movement_type": "cardio",
                    "minutes": 20,
                    "rpe": 7,
                    "average_HR_pct": 78,
                    "bodyweight_kg": 79.5
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_session() {
        let session = parse_session(sample_session_json()).unwrap();
        assert_eq!(session.session_id, "sess-001");
        assert_eq!(session.activities.len(), 2);
        assert_eq!(session.activities[0].rpe, Some(9.0));
        assert_eq!(session.activities[1].average_hr_pct, Some(78.0));
    }

    #[test]
    fn test_session_bodyweight_fills_gaps() {
        let session = parse_session(sample_session_json()).unwrap();
        let activities = session_to_activities(&session).unwrap();

        assert_eq!(activities[0].bodyweight_kg, 80.0);
        assert_eq!(activities[1].bodyweight_kg, 79.5);
        assert_eq!(activities[0].movement_type, MovementType::Resistance);
    }

    #[test]
    fn test_missing_required_fields() {
        let raw = RawActivity {
            activity_id: Some("bench".to_string()),
            bodyweight_kg: Some(80.0),
            rpe: Some(8.0),
            ..Default::default()
        };
        match to_activity(&raw, None) {
            Err(ComputeError::MissingField(field)) => assert_eq!(field, "bench: movement_type"),
            other => panic!("unexpected result: {other:?}"),
        }

        let raw = RawActivity {
            movement_type: Some(MovementType::Cardio),
            rpe: Some(8.0),
            ..Default::default()
        };
        assert!(matches!(
            to_activity(&raw, None),
            Err(ComputeError::MissingField(_))
        ));

        let raw = RawActivity {
            movement_type: Some(MovementType::Cardio),
            bodyweight_kg: Some(80.0),
            ..Default::default()
        };
        assert!(matches!(
            to_activity(&raw, None),
            Err(ComputeError::MissingField(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_numbers() {
        let base = RawActivity {
            movement_type: Some(MovementType::Cardio),
            bodyweight_kg: Some(80.0),
            rpe: Some(7.0),
            ..Default::default()
        };

        let zero_bodyweight = RawActivity {
            bodyweight_kg: Some(0.0),
            ..base.clone()
        };
        assert!(matches!(
            to_activity(&zero_bodyweight, None),
            Err(ComputeError::InvalidActivity(_))
        ));

        let negative_minutes = RawActivity {
            minutes: Some(-3.0),
            ..base.clone()
        };
        assert!(matches!(
            to_activity(&negative_minutes, None),
            Err(ComputeError::InvalidActivity(_))
        ));
    }

    #[test]
    fn test_out_of_range_rpe_is_accepted() {
        let raw = RawActivity {
            movement_type: Some(MovementType::Skill),
            bodyweight_kg: Some(65.0),
            rpe: Some(15.0),
            minutes: Some(10.0),
            ..Default::default()
        };
        assert_eq!(to_activity(&raw, None).unwrap().rpe, 15.0);
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let input = r#"{"movement_type": "cardio", "minutes": 10, "rpe": 6, "bodyweight_kg": 70}

{"movement_type": "skill", "minutes": 5, "rpe": 3, "bodyweight_kg": 70}
"#;
        let activities = parse_activities_ndjson(input).unwrap();
        assert_eq!(activities.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let input = "{\"movement_type\": \"cardio\"}\nnot json\n";
        match parse_activities_ndjson(input) {
            Err(ComputeError::ParseError(msg)) => assert!(msg.starts_with("Line 2")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_movement_type_is_parse_error() {
        let result = parse_activity(r#"{"movement_type": "yoga", "rpe": 3, "bodyweight_kg": 60}"#);
        assert!(matches!(result, Err(ComputeError::ParseError(_))));
    }

    #[test]
    fn test_validate_activities_reports_failures_only() {
        let activities = vec![
            RawActivity {
                movement_type: Some(MovementType::Cardio),
                rpe: Some(6.0),
                minutes: Some(30.0),
                ..Default::default()
            },
            RawActivity {
                activity_id: Some("broken".to_string()),
                rpe: Some(6.0),
                ..Default::default()
            },
        ];

        let failures = validate_activities(&activities, Some(70.0));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[0].activity_id.as_deref(), Some("broken"));
    }
}
