//! Synheart XP - On-device XP allocation engine for gamified training
//!
//! XP turns a logged activity into experience points split across Strength,
//! Stamina and Agility through a deterministic pipeline: work units and
//! energy-system classification → effort scaling → attribute split →
//! session aggregation → daily cap.
//!
//! ## Modules
//!
//! - **Allocation**: [`allocate_xp`], [`allocate_session_xp`], [`apply_daily_caps`]
//! - **Engine**: [`XpEngine`] for JSON sessions with a per-day ledger

pub mod adapter;
pub mod allocator;
pub mod classifier;
pub mod config;
pub mod daily_cap;
pub mod effort;
pub mod encoder;
pub mod error;
pub mod ledger;
pub mod pipeline;
pub mod session;
pub mod types;
pub mod work;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use allocator::allocate_xp;
pub use config::{DailyCapConfig, XpConfig, BASE_XP_MULTIPLIER};
pub use daily_cap::apply_daily_caps;
pub use error::ComputeError;
pub use ledger::DailyLedger;
pub use pipeline::{session_to_xp_report, XpEngine};
pub use session::allocate_session_xp;
pub use types::{ActivityInput, EnergyCode, MovementType, XpAllocation};

/// XP version embedded in all reports
pub const XP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "synheart-xp";
