//! Daily allocation ledger
//!
//! Keeps the allocations recorded for each day over a rolling window so the
//! daily cap can be evaluated against what the user already earned today.

use crate::config::DailyCapConfig;
use crate::daily_cap::{evaluate_daily_cap, DailyCapOutcome};
use crate::session::fold_allocations;
use crate::types::XpAllocation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of days kept in the ledger
pub const DEFAULT_LEDGER_WINDOW: usize = 7;

/// Allocations recorded on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerDay {
    pub date: NaiveDate,
    pub allocations: Vec<XpAllocation>,
}

/// Rolling per-day record of recorded allocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLedger {
    /// Days in ascending date order
    days: VecDeque<LedgerDay>,
    /// Maximum number of days kept
    window_days: usize,
}

impl Default for DailyLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_WINDOW)
    }
}

impl DailyLedger {
    /// Create a ledger keeping at most `window_days` days (minimum 1)
    pub fn new(window_days: usize) -> Self {
        let window_days = window_days.max(1);
        Self {
            days: VecDeque::with_capacity(window_days),
            window_days,
        }
    }

    /// Cap `allocation` against the day's prior entries, store it, and
    /// return the full outcome
    pub fn record(
        &mut self,
        date: NaiveDate,
        allocation: XpAllocation,
        config: &DailyCapConfig,
    ) -> DailyCapOutcome {
        let outcome = evaluate_daily_cap(self.allocations_for(date), allocation, config);

        match self.days.iter().position(|day| day.date >= date) {
            Some(index) if self.days[index].date == date => {
                self.days[index].allocations.push(outcome.after);
            }
            Some(index) => self.days.insert(
                index,
                LedgerDay {
                    date,
                    allocations: vec![outcome.after],
                },
            ),
            None => self.days.push_back(LedgerDay {
                date,
                allocations: vec![outcome.after],
            }),
        }

        self.evict_expired();
        outcome
    }

    /// Change the window, dropping the oldest days that no longer fit
    pub fn set_window_days(&mut self, window_days: usize) {
        self.window_days = window_days.max(1);
        self.evict_expired();
    }

    fn evict_expired(&mut self) {
        while self.days.len() > self.window_days {
            self.days.pop_front();
        }
    }

    /// Allocations recorded on `date`, oldest first
    pub fn allocations_for(&self, date: NaiveDate) -> &[XpAllocation] {
        self.days
            .iter()
            .find(|day| day.date == date)
            .map(|day| day.allocations.as_slice())
            .unwrap_or(&[])
    }

    /// Element-wise sum of the day's allocations
    pub fn day_total(&self, date: NaiveDate) -> XpAllocation {
        fold_allocations(self.allocations_for(date))
    }

    /// Number of days currently held
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn window_days(&self) -> usize {
        self.window_days
    }

    pub fn clear(&mut self) {
        self.days.clear();
    }

    /// Load a ledger from JSON.
    ///
    /// Days are re-sorted and the window is held to at least one day, as
    /// with [`DailyLedger::new`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut ledger: Self = serde_json::from_str(json)?;
        ledger.days.make_contiguous().sort_by_key(|day| day.date);
        let window_days = ledger.window_days;
        ledger.set_window_days(window_days);
        Ok(ledger)
    }

    /// Serialize the ledger to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
