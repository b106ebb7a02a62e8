//! Energy-system classification
//!
//! Assigns each activity one of five energy codes. Signals are consulted in
//! a fixed order and the first rule that matches wins:
//!
//! 1. Recovery: easy effort (RPE <= 5) at low heart rate (< 65% max)
//! 2. Heart rate, when present
//! 3. Work-burst length (`interval_seconds`)
//! 4. Total duration (`minutes`)
//! 5. Movement-type default: resistance is P, everything else O
//!
//! The cut points follow the usual energy-system transitions at roughly
//! 10 s, 2 min and 6 min.

use crate::types::{ActivityInput, ClassificationSignal, EnergyCode, MovementType};

/// RPE at or below which low heart rate counts as recovery
const RECOVERY_MAX_RPE: f64 = 5.0;
/// Heart rate (% of max) below which easy work counts as recovery
const RECOVERY_MAX_HR_PCT: f64 = 65.0;

const HR_ATP_PC_PCT: f64 = 95.0;
const HR_GLYCOLYTIC_PCT: f64 = 90.0;
const HR_MIXED_PCT: f64 = 75.0;

const INTERVAL_ATP_PC_SEC: f64 = 10.0;
const INTERVAL_GLYCOLYTIC_SEC: f64 = 120.0;
const INTERVAL_MIXED_SEC: f64 = 360.0;

/// About ten seconds
const DURATION_ATP_PC_MIN: f64 = 0.17;
const DURATION_GLYCOLYTIC_MIN: f64 = 2.0;
const DURATION_MIXED_MIN: f64 = 6.0;

/// Classify an activity's dominant energy system
pub fn classify(activity: &ActivityInput) -> EnergyCode {
    classify_with_signal(activity).0
}

/// Classify and report which rule decided
pub fn classify_with_signal(activity: &ActivityInput) -> (EnergyCode, ClassificationSignal) {
    if let Some(hr) = activity.average_hr_pct {
        if activity.rpe <= RECOVERY_MAX_RPE && hr < RECOVERY_MAX_HR_PCT {
            return (EnergyCode::R, ClassificationSignal::Recovery);
        }
        return (by_heart_rate(hr), ClassificationSignal::HeartRate);
    }

    if let Some(seconds) = activity.interval_seconds {
        return (by_interval(seconds), ClassificationSignal::Interval);
    }

    if let Some(minutes) = activity.minutes {
        return (by_duration(minutes), ClassificationSignal::Duration);
    }

    let code = match activity.movement_type {
        MovementType::Resistance => EnergyCode::P,
        MovementType::Cardio | MovementType::Skill => EnergyCode::O,
    };
    (code, ClassificationSignal::Default)
}

fn by_heart_rate(hr_pct: f64) -> EnergyCode {
    if hr_pct > HR_ATP_PC_PCT {
        EnergyCode::P
    } else if hr_pct >= HR_GLYCOLYTIC_PCT {
        EnergyCode::G
    } else if hr_pct >= HR_MIXED_PCT {
        EnergyCode::M
    } else {
        EnergyCode::O
    }
}

fn by_interval(seconds: f64) -> EnergyCode {
    if seconds <= INTERVAL_ATP_PC_SEC {
        EnergyCode::P
    } else if seconds <= INTERVAL_GLYCOLYTIC_SEC {
        EnergyCode::G
    } else if seconds <= INTERVAL_MIXED_SEC {
        EnergyCode::M
    } else {
        EnergyCode::O
    }
}

fn by_duration(minutes: f64) -> EnergyCode {
    if minutes <= DURATION_ATP_PC_MIN {
        EnergyCode::P
    } else if minutes <= DURATION_GLYCOLYTIC_MIN {
        EnergyCode::G
    } else if minutes <= DURATION_MIXED_MIN {
        EnergyCode::M
    } else {
        EnergyCode::O
    }
}
