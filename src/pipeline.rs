//! Pipeline orchestration
//!
//! This module provides the public API for Synheart XP. It runs a logged
//! workout from raw JSON to an XP report:
//! adapter → work units + classification → effort scaling → split →
//! session fold → daily cap → report encoding.

use crate::adapter::{parse_activity, parse_session, session_to_activities, to_activity};
use crate::allocator::Allocator;
use crate::config::XpConfig;
use crate::daily_cap::{apply_daily_caps, evaluate_daily_cap};
use crate::encoder::XpReportEncoder;
use crate::error::ComputeError;
use crate::ledger::DailyLedger;
use crate::session::SessionAggregator;
use crate::types::{ActivityInput, XpAllocation};

/// Convert a workout session JSON payload into an XP report (stateless).
///
/// No daily cap is applied and the report has no `daily_cap` section, since
/// the day's prior allocations are unknown here. Use [`daily_caps_json`] or
/// an [`XpEngine`] when the cap matters.
///
/// # Example
/// ```ignore
/// let report_json = session_to_xp_report(session_json)?;
/// ```
pub fn session_to_xp_report(session_json: String) -> Result<String, ComputeError> {
    let session = parse_session(&session_json)?;
    let activities = session_to_activities(&session)?;
    let aggregated = SessionAggregator::default().aggregate(&activities);
    XpReportEncoder::new().encode_to_json(&session, &aggregated, None)
}

/// Allocate XP for one raw activity JSON object (stateless)
pub fn activity_to_xp_json(activity_json: &str) -> Result<String, ComputeError> {
    let raw = parse_activity(activity_json)?;
    let activity = to_activity(&raw, None)?;
    let allocation = Allocator::default().allocate(&activity);
    serde_json::to_string(&allocation).map_err(ComputeError::JsonError)
}

/// Apply the daily cap to JSON inputs (stateless).
///
/// `daily_json` is a JSON array of the day's prior allocations and
/// `current_json` the allocation about to be recorded.
pub fn daily_caps_json(daily_json: &str, current_json: &str) -> Result<String, ComputeError> {
    let daily: Vec<XpAllocation> = serde_json::from_str(daily_json)?;
    let current: XpAllocation = serde_json::from_str(current_json)?;
    let adjusted = apply_daily_caps(&daily, current);
    serde_json::to_string(&adjusted).map_err(ComputeError::JsonError)
}

/// Stateful engine holding configuration and the day ledger.
///
/// Use this when sessions arrive over time and the daily cap should see
/// everything already recorded for the day.
pub struct XpEngine {
    config: XpConfig,
    aggregator: SessionAggregator,
    ledger: DailyLedger,
    encoder: XpReportEncoder,
}

impl Default for XpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl XpEngine {
    /// Create an engine with default tuning
    pub fn new() -> Self {
        Self::build(XpConfig::default(), DailyLedger::default())
    }

    /// Create an engine with custom tuning
    pub fn with_config(config: XpConfig) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::build(config, DailyLedger::default()))
    }

    /// Create an engine with a specific ledger window (days)
    pub fn with_ledger_window(config: XpConfig, window_days: usize) -> Result<Self, ComputeError> {
        config.validate()?;
        Ok(Self::build(config, DailyLedger::new(window_days)))
    }

    fn build(config: XpConfig, ledger: DailyLedger) -> Self {
        Self {
            aggregator: SessionAggregator::new(Allocator::new(config.clone())),
            config,
            ledger,
            encoder: XpReportEncoder::new(),
        }
    }

    pub fn config(&self) -> &XpConfig {
        &self.config
    }

    pub fn ledger(&self) -> &DailyLedger {
        &self.ledger
    }

    /// Allocate XP for one activity
    pub fn allocate(&self, activity: &ActivityInput) -> XpAllocation {
        self.aggregator.allocator().allocate(activity)
    }

    /// Allocate XP for a session
    pub fn allocate_session(&self, activities: &[ActivityInput]) -> XpAllocation {
        self.aggregator.aggregate(activities).allocation
    }

    /// Apply the daily cap with this engine's tuning
    pub fn apply_daily_caps(&self, daily: &[XpAllocation], current: XpAllocation) -> XpAllocation {
        evaluate_daily_cap(daily, current, &self.config.daily_cap).after
    }

    /// Process a session JSON payload, record it in the ledger, and return
    /// the report JSON
    pub fn process_session(&mut self, session_json: &str) -> Result<String, ComputeError> {
        // Stage 1: Parse and validate
        let session = parse_session(session_json)?;
        let activities = session_to_activities(&session)?;

        // Stage 2: Allocate and fold
        let aggregated = self.aggregator.aggregate(&activities);

        // Stage 3: Daily cap against what was already recorded today
        let date = session.performed_at.date_naive();
        let outcome = self
            .ledger
            .record(date, aggregated.allocation, &self.config.daily_cap);

        // Stage 4: Encode
        self.encoder
            .encode_to_json(&session, &aggregated, Some(&outcome))
    }

    /// Save ledger state to JSON
    pub fn save_ledger(&self) -> Result<String, ComputeError> {
        self.ledger
            .to_json()
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    /// Load ledger state from JSON. The loaded ledger keeps its own window.
    pub fn load_ledger(&mut self, json: &str) -> Result<(), ComputeError> {
        self.ledger =
            DailyLedger::from_json(json).map_err(|e| ComputeError::ParseError(e.to_string()))?;
        Ok(())
    }

    /// Resize the ledger window, dropping the oldest days that no longer fit
    pub fn set_ledger_window(&mut self, window_days: usize) {
        self.ledger.set_window_days(window_days);
    }

    /// Forget every recorded day
    pub fn clear_ledger(&mut self) {
        self.ledger.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnergyCode;
    use chrono::NaiveDate;

    fn aerobic_session_json(id: &str) -> String {
        format!(
            r#"{{
                "session_id": "{id}",
                "performed_at": "2024-01-15T07:00:00Z",
                "bodyweight_kg": 72.0,
                "activities": [
                    {{ "movement_type": "cardio", "minutes": 45, "rpe": 6, "average_HR_pct": 70 }}
                ]
            }}"#
        )
    }

    fn strength_session_json() -> &'static str {
        r#"{
            "session_id": "lift",
            "user_id": "user-9",
            "performed_at": "2024-01-15T17:00:00Z",
            "activities": [
                { "movement_type": "resistance", "sets": 5, "reps": 5, "load_kg": 140, "bodyweight_kg": 80, "RPE": 9, "interval_seconds": 8 },
                { "movement_type": "resistance", "sets": 3, "reps": 10, "bodyweight_kg": 80, "rpe": 7 }
            ]
        }"#
    }

    #[test]
    fn test_session_to_xp_report() {
        let report = session_to_xp_report(strength_session_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&report).unwrap();

        assert_eq!(payload["producer"]["name"], "synheart-xp");
        assert_eq!(payload["session"]["allocation"]["energy_code"], "P");
        // 131 + 60 base XP
        assert_eq!(payload["session"]["allocation"]["xp_total"], 191);
        assert!(payload["session"].get("daily_cap").is_none());
    }

    #[test]
    fn test_stateless_report_leaves_aerobic_session_uncapped() {
        let payload: serde_json::Value =
            serde_json::from_str(&session_to_xp_report(aerobic_session_json("solo")).unwrap())
                .unwrap();

        // 45 min at RPE 6: 90 XP split 10/80/10
        assert_eq!(payload["session"]["allocation"]["energy_code"], "O");
        assert_eq!(payload["session"]["allocation"]["xp_sta"], 72);
        assert!(payload["session"].get("daily_cap").is_none());
    }

    #[test]
    fn test_engine_caps_repeated_aerobic_sessions() {
        let mut engine = XpEngine::new();

        let first: serde_json::Value =
            serde_json::from_str(&engine.process_session(&aerobic_session_json("a")).unwrap())
                .unwrap();
        assert_eq!(first["session"]["daily_cap"]["applied"], true);

        let second: serde_json::Value =
            serde_json::from_str(&engine.process_session(&aerobic_session_json("b")).unwrap())
                .unwrap();
        let before = second["session"]["daily_cap"]["allocation_before_cap"]["xp_sta"]
            .as_u64()
            .unwrap();
        let after = second["session"]["allocation"]["xp_sta"].as_u64().unwrap();
        assert!(after < before);

        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(engine.ledger().allocations_for(day).len(), 2);
    }

    #[test]
    fn test_engine_strength_work_dilutes_aerobic_share() {
        let mut engine = XpEngine::new();
        engine.process_session(strength_session_json()).unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&engine.process_session(&aerobic_session_json("c")).unwrap())
                .unwrap();
        // 90 aerobic XP out of 281 for the day
        assert_eq!(report["session"]["daily_cap"]["applied"], false);
    }

    #[test]
    fn test_ledger_persistence() {
        let mut engine = XpEngine::new();
        engine.process_session(strength_session_json()).unwrap();
        let saved = engine.save_ledger().unwrap();

        let mut restored = XpEngine::new();
        restored.load_ledger(&saved).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(restored.ledger().day_total(day).xp_total, 191);

        restored.clear_ledger();
        assert_eq!(restored.ledger().day_count(), 0);
    }

    #[test]
    fn test_loaded_ledger_can_be_rewindowed() {
        let mut engine = XpEngine::with_ledger_window(XpConfig::default(), 10).unwrap();
        for d in 10..15 {
            let json = aerobic_session_json(&format!("s{d}"))
                .replace("2024-01-15", &format!("2024-01-{d}"));
            engine.process_session(&json).unwrap();
        }
        let saved = engine.save_ledger().unwrap();

        let mut restored = XpEngine::new();
        restored.load_ledger(&saved).unwrap();
        assert_eq!(restored.ledger().window_days(), 10);
        assert_eq!(restored.ledger().day_count(), 5);

        restored.set_ledger_window(3);
        assert_eq!(restored.ledger().window_days(), 3);
        assert_eq!(restored.ledger().day_count(), 3);
        let dropped = NaiveDate::from_ymd_opt(2024, 1, 11).unwrap();
        assert!(restored.ledger().allocations_for(dropped).is_empty());
    }

    #[test]
    fn test_engine_uses_configured_multiplier() {
        let engine = XpEngine::with_config(XpConfig::with_base_multiplier(1.0)).unwrap();
        let allocation = engine.allocate(&ActivityInput::cardio(30.0, 70.0, 6.0));
        assert_eq!(allocation.xp_total, 30);

        let session = engine.allocate_session(&[
            ActivityInput::cardio(30.0, 70.0, 6.0),
            ActivityInput::cardio(10.0, 70.0, 6.0),
        ]);
        assert_eq!(session.xp_total, 40);
        assert_eq!(session.energy_code, EnergyCode::O);
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let result = XpEngine::with_config(XpConfig::with_base_multiplier(f64::NAN));
        assert!(matches!(result, Err(ComputeError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_rpe_fails_fast() {
        let json = r#"{
            "session_id": "bad",
            "performed_at": "2024-01-15T07:00:00Z",
            "bodyweight_kg": 70,
            "activities": [{ "movement_type": "cardio", "minutes": 20 }]
        }"#;
        let result = session_to_xp_report(json.to_string());
        assert!(matches!(result, Err(ComputeError::MissingField(_))));
    }

    #[test]
    fn test_empty_session_report() {
        let json = r#"{
            "session_id": "rest-day",
            "performed_at": "2024-01-15T07:00:00Z",
            "activities": []
        }"#;
        let payload: serde_json::Value =
            serde_json::from_str(&session_to_xp_report(json.to_string()).unwrap()).unwrap();
        assert_eq!(payload["session"]["allocation"]["xp_total"], 0);
        assert_eq!(payload["session"]["allocation"]["energy_code"], "O");
        assert!(payload["session"].get("daily_cap").is_none());
    }

    #[test]
    fn test_activity_to_xp_json() {
        let json = activity_to_xp_json(
            r#"{"movement_type": "skill", "minutes": 15, "rpe": 4, "average_hr_pct": 60, "bodyweight_kg": 60}"#,
        )
        .unwrap();
        let allocation: XpAllocation = serde_json::from_str(&json).unwrap();
        assert_eq!(allocation.energy_code, EnergyCode::R);
        assert_eq!(allocation.xp_agi, 11);
    }

    #[test]
    fn test_daily_caps_json() {
        let prior = serde_json::to_string(&vec![crate::allocator::split_xp(90, EnergyCode::O); 4])
            .unwrap();
        let current = serde_json::to_string(&crate::allocator::split_xp(90, EnergyCode::O)).unwrap();

        let adjusted: XpAllocation =
            serde_json::from_str(&daily_caps_json(&prior, &current).unwrap()).unwrap();
        assert_eq!(adjusted.xp_sta, 50);
        assert_eq!(adjusted.xp_str, 9 + 15);
        assert_eq!(adjusted.xp_agi, 9 + 7);
    }

    #[test]
    fn test_invalid_json() {
        assert!(session_to_xp_report("not valid json".to_string()).is_err());
        assert!(daily_caps_json("[]", "nope").is_err());
    }
}
