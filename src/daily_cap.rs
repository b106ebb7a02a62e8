//! Daily O-dominance cap
//!
//! When aerobic (O-code) work makes up more than 80% of a user's daily XP,
//! a new O-code allocation keeps only 70% of its Stamina XP. The removed
//! Stamina is handed out 30% to Agility and 70% to Strength. Only the new
//! allocation is adjusted; earlier ones are never touched.

use crate::config::DailyCapConfig;
use crate::effort::{round_half_up, to_xp};
use crate::types::{EnergyCode, XpAllocation};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Energy code whose dominance is capped
pub const CAPPED_CODE: EnergyCode = EnergyCode::O;

/// Outcome of evaluating the cap for one new allocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyCapOutcome {
    /// Day total including the new allocation
    pub day_total_xp: u64,
    /// O-code XP including the new allocation when it is O-code
    pub aerobic_xp: u64,
    /// `aerobic_xp / day_total_xp`, or 0 for an empty day
    pub aerobic_fraction: f64,
    /// Whether the cap fired
    pub applied: bool,
    /// The new allocation before adjustment
    pub before: XpAllocation,
    /// The allocation to record
    pub after: XpAllocation,
}

/// Apply the daily cap with the default tuning
pub fn apply_daily_caps(daily: &[XpAllocation], current: XpAllocation) -> XpAllocation {
    evaluate_daily_cap(daily, current, &DailyCapConfig::default()).after
}

/// Evaluate the cap for `current` against the day's prior allocations
pub fn evaluate_daily_cap(
    daily: &[XpAllocation],
    current: XpAllocation,
    config: &DailyCapConfig,
) -> DailyCapOutcome {
    let prior_total: u64 = daily.iter().map(|a| a.xp_total as u64).sum();
    let prior_aerobic: u64 = daily
        .iter()
        .filter(|a| a.energy_code == CAPPED_CODE)
        .map(|a| a.xp_total as u64)
        .sum();

    let day_total_xp = prior_total + current.xp_total as u64;
    let aerobic_xp = if current.energy_code == CAPPED_CODE {
        prior_aerobic + current.xp_total as u64
    } else {
        prior_aerobic
    };

    let aerobic_fraction = if day_total_xp == 0 {
        0.0
    } else {
        aerobic_xp as f64 / day_total_xp as f64
    };

    let applied = day_total_xp > 0
        && current.energy_code == CAPPED_CODE
        && aerobic_fraction > config.dominance_threshold;

    let after = if applied {
        let adjusted = redistribute_stamina(current, config);
        info!(
            aerobic_fraction,
            xp_sta_before = current.xp_sta,
            xp_sta_after = adjusted.xp_sta,
            "daily aerobic cap applied"
        );
        adjusted
    } else {
        current
    };

    DailyCapOutcome {
        day_total_xp,
        aerobic_xp,
        aerobic_fraction,
        applied,
        before: current,
        after,
    }
}

/// Trim Stamina and hand the difference to Agility and Strength
fn redistribute_stamina(current: XpAllocation, config: &DailyCapConfig) -> XpAllocation {
    let kept = to_xp(round_half_up(current.xp_sta as f64 * config.stamina_retention))
        .min(current.xp_sta);
    let removed = (current.xp_sta - kept) as f64;

    let to_agi = to_xp(round_half_up(removed * config.agility_share));
    let to_str = to_xp(round_half_up(removed * config.strength_share()));

    XpAllocation {
        xp_str: current.xp_str.saturating_add(to_str),
        xp_sta: kept,
        xp_agi: current.xp_agi.saturating_add(to_agi),
        ..current
    }
}
