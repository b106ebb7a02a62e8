//! Effort scaling
//!
//! Turns work units into base XP using a perceived-effort multiplier and the
//! configured global XP scale.

use tracing::warn;

/// Multiplier applied when RPE has no table entry
pub const FALLBACK_RPE_MULTIPLIER: f64 = 1.0;

/// Look up the effort multiplier for an RPE rating.
///
/// RPE is rounded half-up to the nearest whole number first. Ratings outside
/// 1-10 have no entry.
pub fn rpe_multiplier(rpe: f64) -> Option<f64> {
    if !rpe.is_finite() {
        return None;
    }

    match round_half_up(rpe) as i64 {
        1..=5 => Some(0.5),
        6..=7 => Some(1.0),
        8..=9 => Some(1.5),
        10 => Some(2.0),
        _ => None,
    }
}

/// Multiplier actually used, with a flag set when the fallback kicked in
pub fn effective_multiplier(rpe: f64) -> (f64, bool) {
    match rpe_multiplier(rpe) {
        Some(multiplier) => (multiplier, false),
        None => {
            warn!(rpe, "RPE outside 1-10, using {FALLBACK_RPE_MULTIPLIER}x effort multiplier");
            (FALLBACK_RPE_MULTIPLIER, true)
        }
    }
}

/// Base XP for `work_units` at `rpe_multiplier`, scaled by `base_xp_multiplier`
pub fn base_xp(work_units: f64, rpe_multiplier: f64, base_xp_multiplier: f64) -> u32 {
    to_xp(round_half_up(work_units * rpe_multiplier * base_xp_multiplier))
}

/// Round to the nearest integer with halves going up
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Clamp a rounded value into the XP range; NaN and negatives become 0
pub(crate) fn to_xp(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= u32::MAX as f64 {
        u32::MAX
    } else {
        value as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpe_table() {
        assert_eq!(rpe_multiplier(1.0), Some(0.5));
        assert_eq!(rpe_multiplier(5.0), Some(0.5));
        assert_eq!(rpe_multiplier(6.0), Some(1.0));
        assert_eq!(rpe_multiplier(7.0), Some(1.0));
        assert_eq!(rpe_multiplier(8.0), Some(1.5));
        assert_eq!(rpe_multiplier(9.0), Some(1.5));
        assert_eq!(rpe_multiplier(10.0), Some(2.0));
    }

    #[test]
    fn test_rpe_rounds_to_nearest() {
        assert_eq!(rpe_multiplier(5.4), Some(0.5));
        assert_eq!(rpe_multiplier(5.5), Some(1.0));
        assert_eq!(rpe_multiplier(9.6), Some(2.0));
        assert_eq!(rpe_multiplier(0.5), Some(0.5));
    }

    #[test]
    fn test_out_of_range_rpe_has_no_entry() {
        assert_eq!(rpe_multiplier(0.0), None);
        assert_eq!(rpe_multiplier(-1.0), None);
        assert_eq!(rpe_multiplier(10.5), None);
        assert_eq!(rpe_multiplier(15.0), None);
        assert_eq!(rpe_multiplier(f64::NAN), None);
    }

    #[test]
    fn test_effective_multiplier_fallback() {
        assert_eq!(effective_multiplier(15.0), (1.0, true));
        assert_eq!(effective_multiplier(-1.0), (1.0, true));
        assert_eq!(effective_multiplier(8.0), (1.5, false));
    }

    #[test]
    fn test_base_xp() {
        // 43.75 * 1.5 * 2 = 131.25
        assert_eq!(base_xp(43.75, 1.5, 2.0), 131);
        // 10.25 * 1.0 * 2 = 20.5 rounds up
        assert_eq!(base_xp(10.25, 1.0, 2.0), 21);
        assert_eq!(base_xp(0.0, 2.0, 2.0), 0);
    }

    #[test]
    fn test_base_multiplier_scales_output() {
        assert_eq!(base_xp(30.0, 1.0, 1.0), 30);
        assert_eq!(base_xp(30.0, 1.0, 3.0), 90);
        assert_eq!(base_xp(30.0, 1.0, 0.0), 0);
    }

    #[test]
    fn test_to_xp_clamps() {
        assert_eq!(to_xp(-4.0), 0);
        assert_eq!(to_xp(f64::NAN), 0);
        assert_eq!(to_xp(f64::INFINITY), u32::MAX);
        assert_eq!(to_xp(12.0), 12);
    }
}
