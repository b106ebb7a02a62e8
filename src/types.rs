//! Core types for the Synheart XP engine
//!
//! This module defines the data that flows through each stage of allocation:
//! the caller-supplied activity, the energy-system classification, the
//! intermediate assessment, and the final per-attribute XP allocation.

use serde::{Deserialize, Serialize};

/// Kind of movement logged by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Resistance,
    Cardio,
    Skill,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Resistance => "resistance",
            MovementType::Cardio => "cardio",
            MovementType::Skill => "skill",
        }
    }
}

/// Dominant metabolic pathway trained by an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyCode {
    /// ATP-PC, maximal short efforts
    P,
    /// Anaerobic glycolytic
    G,
    /// Mixed
    M,
    /// Aerobic oxidative
    O,
    /// Recovery / skill work
    R,
}

impl EnergyCode {
    /// Every code, in table order
    pub const ALL: [EnergyCode; 5] = [
        EnergyCode::P,
        EnergyCode::G,
        EnergyCode::M,
        EnergyCode::O,
        EnergyCode::R,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyCode::P => "P",
            EnergyCode::G => "G",
            EnergyCode::M => "M",
            EnergyCode::O => "O",
            EnergyCode::R => "R",
        }
    }

    /// Fixed STR/STA/AGI split for this code
    pub fn split(&self) -> XpSplit {
        match self {
            EnergyCode::P => XpSplit::new(65, 15, 20),
            EnergyCode::G => XpSplit::new(40, 40, 20),
            EnergyCode::M => XpSplit::new(25, 55, 20),
            EnergyCode::O => XpSplit::new(10, 80, 10),
            EnergyCode::R => XpSplit::new(5, 25, 70),
        }
    }
}

/// Whole-percent share of base XP going to each attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpSplit {
    pub str_pct: u32,
    pub sta_pct: u32,
    pub agi_pct: u32,
}

impl XpSplit {
    pub const fn new(str_pct: u32, sta_pct: u32, agi_pct: u32) -> Self {
        Self {
            str_pct,
            sta_pct,
            agi_pct,
        }
    }

    pub fn total_pct(&self) -> u32 {
        self.str_pct + self.sta_pct + self.agi_pct
    }
}

/// A single logged activity, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityInput {
    /// Selects the work-unit formula and the classifier fallback
    pub movement_type: MovementType,
    /// Number of sets (resistance only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    /// Repetitions per set (resistance only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// External load; defaults to bodyweight when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_kg: Option<f64>,
    /// Athlete mass used to normalize load
    pub bodyweight_kg: f64,
    /// Duration of cardio/skill work
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<f64>,
    /// Rate of perceived exertion, nominally 1-10
    #[serde(alias = "RPE")]
    pub rpe: f64,
    /// Length of a single work burst
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<f64>,
    /// Average heart rate as a percentage of max
    #[serde(
        default,
        alias = "average_HR_pct",
        skip_serializing_if = "Option::is_none"
    )]
    pub average_hr_pct: Option<f64>,
}

impl ActivityInput {
    /// Resistance work: `sets x reps` at `load_kg`
    pub fn resistance(sets: u32, reps: u32, load_kg: f64, bodyweight_kg: f64, rpe: f64) -> Self {
        Self {
            movement_type: MovementType::Resistance,
            sets: Some(sets),
            reps: Some(reps),
            load_kg: Some(load_kg),
            bodyweight_kg,
            minutes: None,
            rpe,
            interval_seconds: None,
            average_hr_pct: None,
        }
    }

    /// Cardio work lasting `minutes`
    pub fn cardio(minutes: f64, bodyweight_kg: f64, rpe: f64) -> Self {
        Self::timed(MovementType::Cardio, minutes, bodyweight_kg, rpe)
    }

    /// Skill work lasting `minutes`
    pub fn skill(minutes: f64, bodyweight_kg: f64, rpe: f64) -> Self {
        Self::timed(MovementType::Skill, minutes, bodyweight_kg, rpe)
    }

    fn timed(movement_type: MovementType, minutes: f64, bodyweight_kg: f64, rpe: f64) -> Self {
        Self {
            movement_type,
            sets: None,
            reps: None,
            load_kg: None,
            bodyweight_kg,
            minutes: Some(minutes),
            rpe,
            interval_seconds: None,
            average_hr_pct: None,
        }
    }

    pub fn with_interval(mut self, seconds: f64) -> Self {
        self.interval_seconds = Some(seconds);
        self
    }

    pub fn with_heart_rate(mut self, average_hr_pct: f64) -> Self {
        self.average_hr_pct = Some(average_hr_pct);
        self
    }

    pub fn with_minutes(mut self, minutes: f64) -> Self {
        self.minutes = Some(minutes);
        self
    }

    pub fn with_load(mut self, load_kg: Option<f64>) -> Self {
        self.load_kg = load_kg;
        self
    }
}

/// XP awarded for an activity or session, split by attribute.
///
/// Each attribute is rounded on its own, so `xp_str + xp_sta + xp_agi` may
/// differ from `xp_total` by a point or two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpAllocation {
    pub xp_total: u32,
    pub xp_str: u32,
    pub xp_sta: u32,
    pub xp_agi: u32,
    pub energy_code: EnergyCode,
}

impl XpAllocation {
    /// Allocation with every numeric field at zero
    pub fn zero(energy_code: EnergyCode) -> Self {
        Self {
            xp_total: 0,
            xp_str: 0,
            xp_sta: 0,
            xp_agi: 0,
            energy_code,
        }
    }

    /// Sum of the three attribute buckets
    pub fn attribute_sum(&self) -> u32 {
        self.xp_str
            .saturating_add(self.xp_sta)
            .saturating_add(self.xp_agi)
    }
}

/// Everything computed on the way to one activity's allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAssessment {
    pub movement_type: MovementType,
    /// Dimensionless work performed
    pub work_units: f64,
    pub energy_code: EnergyCode,
    /// Which input signal decided the energy code
    pub signal: ClassificationSignal,
    /// Effort multiplier actually applied
    pub rpe_multiplier: f64,
    /// True when RPE had no table entry and 1.0x was substituted
    pub rpe_fallback: bool,
    /// XP before the attribute split
    pub base_xp: u32,
    pub allocation: XpAllocation,
}

/// Rule of the classifier that produced the energy code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSignal {
    Recovery,
    HeartRate,
    Interval,
    Duration,
    Default,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where a report came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpProvenance {
    pub session_id: String,
    pub user_id: Option<String>,
    pub performed_at_utc: String,
    pub computed_at_utc: String,
}

/// Per-activity line of a session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpActivityBreakdown {
    pub index: usize,
    pub activity_id: Option<String>,
    pub movement_type: MovementType,
    pub work_units: f64,
    pub signal: ClassificationSignal,
    pub rpe_multiplier: f64,
    pub rpe_fallback: bool,
    pub allocation: XpAllocation,
}

/// Daily cap evaluation attached to a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpDailyCap {
    pub date: String,
    pub day_total_xp: u64,
    pub aerobic_fraction: f64,
    pub applied: bool,
    pub allocation_before_cap: XpAllocation,
}

/// Session window of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpSessionWindow {
    pub date: String,
    /// Allocation to record, after the daily cap when one was evaluated
    pub allocation: XpAllocation,
    pub activities: Vec<XpActivityBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_cap: Option<XpDailyCap>,
}

/// Complete session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpReport {
    pub report_version: String,
    pub producer: XpProducer,
    pub provenance: XpProvenance,
    pub session: XpSessionWindow,
}
