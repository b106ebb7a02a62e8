use proptest::prelude::*;
use synheart_xp::allocator::split_xp;
use synheart_xp::{
    allocate_session_xp, allocate_xp, apply_daily_caps, ActivityInput, EnergyCode, XpAllocation,
};

fn energy_code() -> impl Strategy<Value = EnergyCode> {
    prop::sample::select(EnergyCode::ALL.to_vec())
}

fn activity() -> impl Strategy<Value = ActivityInput> {
    let resistance = (1u32..10, 1u32..20, 0.0f64..250.0, 40.0f64..150.0, 1u32..=10).prop_map(
        |(sets, reps, load, bw, rpe)| ActivityInput::resistance(sets, reps, load, bw, rpe as f64),
    );
    let cardio = (0.0f64..180.0, 40.0f64..150.0, 1u32..=10, prop::option::of(40.0f64..100.0))
        .prop_map(|(minutes, bw, rpe, hr)| {
            let activity = ActivityInput::cardio(minutes, bw, rpe as f64);
            match hr {
                Some(hr) => activity.with_heart_rate(hr),
                None => activity,
            }
        });
    let skill = (0.0f64..90.0, 40.0f64..150.0, 1u32..=10, prop::option::of(1.0f64..600.0))
        .prop_map(|(minutes, bw, rpe, interval)| {
            let activity = ActivityInput::skill(minutes, bw, rpe as f64);
            match interval {
                Some(seconds) => activity.with_interval(seconds),
                None => activity,
            }
        });

    prop_oneof![resistance, cardio, skill]
}

fn allocation() -> impl Strategy<Value = XpAllocation> {
    (0u32..5_000, energy_code()).prop_map(|(base, code)| split_xp(base, code))
}

proptest! {
    #[test]
    fn allocation_is_deterministic(a in activity()) {
        prop_assert_eq!(allocate_xp(&a), allocate_xp(&a));
    }

    #[test]
    fn plain_cardio_scales_linearly_with_minutes(
        minutes in 1u32..200,
        bw in 40.0f64..150.0,
        rpe in 1u32..=10,
        factor in 2u32..4,
    ) {
        let once = allocate_xp(&ActivityInput::cardio(minutes as f64, bw, rpe as f64));
        let scaled = allocate_xp(&ActivityInput::cardio((minutes * factor) as f64, bw, rpe as f64));
        prop_assert_eq!(scaled.xp_total, once.xp_total * factor);
    }

    #[test]
    fn any_rpe_yields_a_well_formed_allocation(
        minutes in 0.0f64..120.0,
        rpe in prop::num::f64::ANY,
    ) {
        let allocation = allocate_xp(&ActivityInput::cardio(minutes, 70.0, rpe));
        let drift = allocation.attribute_sum() as i64 - allocation.xp_total as i64;
        prop_assert!(drift.abs() <= 1, "attributes {} vs total {}", allocation.attribute_sum(), allocation.xp_total);
    }

    #[test]
    fn split_never_loses_more_than_rounding(base in 0u32..1_000_000, code in energy_code()) {
        let allocation = split_xp(base, code);
        prop_assert_eq!(code.split().total_pct(), 100);
        prop_assert_eq!(allocation.xp_total, base);
        let drift = allocation.attribute_sum() as i64 - base as i64;
        prop_assert!(drift.abs() <= 1);
    }

    #[test]
    fn session_totals_are_elementwise_sums(activities in prop::collection::vec(activity(), 0..12)) {
        let session = allocate_session_xp(&activities);
        let singles: Vec<XpAllocation> = activities.iter().map(allocate_xp).collect();

        prop_assert_eq!(session.xp_total, singles.iter().map(|a| a.xp_total).sum::<u32>());
        prop_assert_eq!(session.xp_str, singles.iter().map(|a| a.xp_str).sum::<u32>());
        prop_assert_eq!(session.xp_sta, singles.iter().map(|a| a.xp_sta).sum::<u32>());
        prop_assert_eq!(session.xp_agi, singles.iter().map(|a| a.xp_agi).sum::<u32>());
    }

    #[test]
    fn session_code_is_one_of_its_activities(activities in prop::collection::vec(activity(), 1..12)) {
        let session = allocate_session_xp(&activities);
        prop_assert!(activities.iter().any(|a| allocate_xp(a).energy_code == session.energy_code));
    }

    #[test]
    fn daily_cap_only_moves_stamina(
        daily in prop::collection::vec(allocation(), 0..10),
        current in allocation(),
    ) {
        let adjusted = apply_daily_caps(&daily, current);

        prop_assert_eq!(adjusted.xp_total, current.xp_total);
        prop_assert_eq!(adjusted.energy_code, current.energy_code);
        prop_assert!(adjusted.xp_sta <= current.xp_sta);
        prop_assert!(adjusted.xp_str >= current.xp_str);
        prop_assert!(adjusted.xp_agi >= current.xp_agi);
        if current.energy_code != EnergyCode::O {
            prop_assert_eq!(adjusted, current);
        }
    }
}
