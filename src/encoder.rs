//! XP report encoding
//!
//! Encodes an aggregated session into the JSON report handed to the
//! persistence and progression layers.

use crate::adapter::RawSession;
use crate::daily_cap::DailyCapOutcome;
use crate::error::ComputeError;
use crate::session::SessionAllocation;
use crate::types::{
    XpActivityBreakdown, XpDailyCap, XpProducer, XpProvenance, XpReport, XpSessionWindow,
};
use crate::{PRODUCER_NAME, XP_VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Report encoder
pub struct XpReportEncoder {
    instance_id: String,
}

impl Default for XpReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl XpReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Encode an aggregated session into a report.
    ///
    /// When `daily_cap` is given, its adjusted allocation becomes the session
    /// allocation and the pre-cap values are kept alongside.
    pub fn encode(
        &self,
        session: &RawSession,
        aggregated: &SessionAllocation,
        daily_cap: Option<&DailyCapOutcome>,
    ) -> Result<XpReport, ComputeError> {
        if aggregated.activities.len() != session.activities.len() {
            return Err(ComputeError::EncodingError(format!(
                "session {} has {} activities but {} assessments",
                session.session_id,
                session.activities.len(),
                aggregated.activities.len()
            )));
        }

        let date = session.performed_at.date_naive().to_string();

        let producer = XpProducer {
            name: PRODUCER_NAME.to_string(),
            version: XP_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = XpProvenance {
            session_id: session.session_id.clone(),
            user_id: session.user_id.clone(),
            performed_at_utc: session.performed_at.to_rfc3339(),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let activities = aggregated
            .activities
            .iter()
            .zip(&session.activities)
            .enumerate()
            .map(|(index, (assessment, raw))| XpActivityBreakdown {
                index,
                activity_id: raw.activity_id.clone(),
                movement_type: assessment.movement_type,
                work_units: assessment.work_units,
                signal: assessment.signal,
                rpe_multiplier: assessment.rpe_multiplier,
                rpe_fallback: assessment.rpe_fallback,
                allocation: assessment.allocation,
            })
            .collect();

        let allocation = daily_cap
            .map(|outcome| outcome.after)
            .unwrap_or(aggregated.allocation);

        let daily_cap = daily_cap.map(|outcome| XpDailyCap {
            date: date.clone(),
            day_total_xp: outcome.day_total_xp,
            aerobic_fraction: outcome.aerobic_fraction,
            applied: outcome.applied,
            allocation_before_cap: outcome.before,
        });

        Ok(XpReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            session: XpSessionWindow {
                date,
                allocation,
                activities,
                daily_cap,
            },
        })
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(
        &self,
        session: &RawSession,
        aggregated: &SessionAllocation,
        daily_cap: Option<&DailyCapOutcome>,
    ) -> Result<String, ComputeError> {
        let report = self.encode(session, aggregated, daily_cap)?;
        serde_json::to_string_pretty(&report).map_err(ComputeError::JsonError)
    }
}
