//! XP allocation
//!
//! Combines work units, energy-system classification and effort scaling into
//! one allocation, then splits the base XP across STR/STA/AGI using the fixed
//! percentage table for the classified energy code.

use crate::classifier::classify_with_signal;
use crate::config::XpConfig;
use crate::effort::{base_xp, effective_multiplier};
use crate::types::{ActivityAssessment, ActivityInput, EnergyCode, XpAllocation};
use crate::work::work_units;
use tracing::debug;

/// Allocate XP for one activity using the default configuration
pub fn allocate_xp(activity: &ActivityInput) -> XpAllocation {
    Allocator::default().allocate(activity)
}

/// Split `base_xp` by the table entry for `energy_code`.
///
/// Each attribute is rounded half-up on its own in integer arithmetic.
pub fn split_xp(base_xp: u32, energy_code: EnergyCode) -> XpAllocation {
    let split = energy_code.split();

    XpAllocation {
        xp_total: base_xp,
        xp_str: percent_of(base_xp, split.str_pct),
        xp_sta: percent_of(base_xp, split.sta_pct),
        xp_agi: percent_of(base_xp, split.agi_pct),
        energy_code,
    }
}

fn percent_of(value: u32, pct: u32) -> u32 {
    ((value as u64 * pct as u64 + 50) / 100) as u32
}

/// Allocator bound to a configuration
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    config: XpConfig,
}

impl Allocator {
    pub fn new(config: XpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &XpConfig {
        &self.config
    }

    /// Allocate XP for one activity
    pub fn allocate(&self, activity: &ActivityInput) -> XpAllocation {
        self.assess(activity).allocation
    }

    /// Run every stage and keep the intermediate values
    pub fn assess(&self, activity: &ActivityInput) -> ActivityAssessment {
        let work = work_units(activity);
        let (energy_code, signal) = classify_with_signal(activity);
        let (rpe_multiplier, rpe_fallback) = effective_multiplier(activity.rpe);
        let base = base_xp(work, rpe_multiplier, self.config.base_xp_multiplier);
        let allocation = split_xp(base, energy_code);

        debug!(
            movement = activity.movement_type.as_str(),
            work_units = work,
            energy_code = energy_code.as_str(),
            ?signal,
            rpe_multiplier,
            base_xp = base,
            "allocated activity XP"
        );

        ActivityAssessment {
            movement_type: activity.movement_type,
            work_units: work,
            energy_code,
            signal,
            rpe_multiplier,
            rpe_fallback,
            base_xp: base,
            allocation,
        }
    }
}
