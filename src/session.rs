//! Session aggregation
//!
//! Folds the per-activity allocations of a workout into one allocation.
//! Totals are element-wise sums; the energy code is the most frequent code
//! among the activities.

use crate::allocator::Allocator;
use crate::types::{ActivityAssessment, ActivityInput, EnergyCode, XpAllocation};
use tracing::debug;

/// Code reported for a session with no activities
pub const EMPTY_SESSION_CODE: EnergyCode = EnergyCode::O;

/// Allocate XP for a whole session using the default configuration
pub fn allocate_session_xp(activities: &[ActivityInput]) -> XpAllocation {
    SessionAggregator::new(Allocator::default())
        .aggregate(activities)
        .allocation
}

/// Sum a slice of allocations, picking the dominant code by frequency
pub fn fold_allocations(allocations: &[XpAllocation]) -> XpAllocation {
    let codes: Vec<EnergyCode> = allocations.iter().map(|a| a.energy_code).collect();
    let mut total = XpAllocation::zero(dominant_code(&codes));

    for allocation in allocations {
        total.xp_total = total.xp_total.saturating_add(allocation.xp_total);
        total.xp_str = total.xp_str.saturating_add(allocation.xp_str);
        total.xp_sta = total.xp_sta.saturating_add(allocation.xp_sta);
        total.xp_agi = total.xp_agi.saturating_add(allocation.xp_agi);
    }

    total
}

/// Most frequent code.
///
/// Ties go to the code that appears first in `codes`. An empty slice yields
/// [`EMPTY_SESSION_CODE`].
pub fn dominant_code(codes: &[EnergyCode]) -> EnergyCode {
    // (code, count) in order of first appearance
    let mut counts: Vec<(EnergyCode, usize)> = Vec::with_capacity(EnergyCode::ALL.len());

    for code in codes {
        match counts.iter_mut().find(|(seen, _)| seen == code) {
            Some((_, count)) => *count += 1,
            None => counts.push((*code, 1)),
        }
    }

    let mut best: Option<(EnergyCode, usize)> = None;
    for (code, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((code, count)),
        }
    }

    best.map(|(code, _)| code).unwrap_or(EMPTY_SESSION_CODE)
}

/// Result of aggregating a session, with the per-activity breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAllocation {
    pub allocation: XpAllocation,
    pub activities: Vec<ActivityAssessment>,
}

/// Aggregates sessions with a configured allocator
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    allocator: Allocator,
}

impl SessionAggregator {
    pub fn new(allocator: Allocator) -> Self {
        Self { allocator }
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn aggregate(&self, activities: &[ActivityInput]) -> SessionAllocation {
        let assessments: Vec<ActivityAssessment> = activities
            .iter()
            .map(|activity| self.allocator.assess(activity))
            .collect();

        let allocations: Vec<XpAllocation> = assessments.iter().map(|a| a.allocation).collect();
        let allocation = fold_allocations(&allocations);

        debug!(
            activities = assessments.len(),
            xp_total = allocation.xp_total,
            energy_code = allocation.energy_code.as_str(),
            "aggregated session XP"
        );

        SessionAllocation {
            allocation,
            activities: assessments,
        }
    }
}
