//! Work-unit calculation
//!
//! Converts one logged activity into a dimensionless amount of work:
//! - Resistance: sets x reps x (load / bodyweight)
//! - Cardio and skill: minutes

use crate::types::{ActivityInput, MovementType};

/// Compute the work units for an activity. Always finite and non-negative.
pub fn work_units(activity: &ActivityInput) -> f64 {
    let work = match activity.movement_type {
        MovementType::Resistance => resistance_work(activity),
        MovementType::Cardio | MovementType::Skill => activity.minutes.unwrap_or(0.0),
    };

    if work.is_finite() && work > 0.0 {
        work
    } else {
        0.0
    }
}

/// sets x reps x load ratio; missing load means pure bodyweight work
fn resistance_work(activity: &ActivityInput) -> f64 {
    let sets = activity.sets.unwrap_or(0) as f64;
    let reps = activity.reps.unwrap_or(0) as f64;

    if sets == 0.0 || reps == 0.0 {
        return 0.0;
    }

    sets * reps * load_ratio(activity)
}

fn load_ratio(activity: &ActivityInput) -> f64 {
    match activity.load_kg {
        Some(load) if activity.bodyweight_kg > 0.0 => load / activity.bodyweight_kg,
        Some(_) => 0.0,
        None => 1.0,
    }
}
