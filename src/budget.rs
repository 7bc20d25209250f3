//! Daily and monthly spend ceilings.
//!
//! `check_budget` and `record_usage` are separate critical sections with the
//! network call in between and nothing is reserved, so concurrent requests
//! can all pass the check before any of them records. The ceiling is therefore
//! best-effort: it can be overshot by at most the cost of the requests that
//! were in flight together.

use crate::config::CostLimits;
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Source of the current calendar date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Monthly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }
}

/// Committed spend per day and per month (keyed by first-of-month)
///
/// Buckets are created lazily and only ever grow.
#[derive(Debug, Default)]
pub struct UsageLedger {
    daily: HashMap<NaiveDate, f64>,
    monthly: HashMap<NaiveDate, f64>,
}

impl UsageLedger {
    pub fn daily(&self, date: NaiveDate) -> f64 {
        self.daily.get(&date).copied().unwrap_or(0.0)
    }

    pub fn monthly(&self, date: NaiveDate) -> f64 {
        self.monthly.get(&month_key(date)).copied().unwrap_or(0.0)
    }

    fn add(&mut self, date: NaiveDate, cost: f64) {
        *self.daily.entry(date).or_insert(0.0) += cost;
        *self.monthly.entry(month_key(date)).or_insert(0.0) += cost;
    }
}

fn month_key(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Spend and headroom for the current day and month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendSnapshot {
    pub daily_spent: f64,
    pub monthly_spent: f64,
    pub limits: CostLimits,
}

pub struct BudgetTracker {
    limits: CostLimits,
    ledger: Mutex<UsageLedger>,
    clock: Arc<dyn Clock>,
}

impl BudgetTracker {
    pub fn new(limits: CostLimits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: CostLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            limits,
            ledger: Mutex::new(UsageLedger::default()),
            clock,
        }
    }

    /// Would `estimated_cost` still fit under both ceilings?
    ///
    /// Check only: nothing is reserved.
    pub async fn check_budget(&self, estimated_cost: f64) -> bool {
        let ledger = self.ledger.lock().await;
        let today = self.clock.today();

        let daily_spent = ledger.daily(today);
        if daily_spent + estimated_cost > self.limits.daily_budget_usd {
            tracing::warn!(
                daily_spent,
                estimated_cost,
                daily_budget = self.limits.daily_budget_usd,
                "Daily budget would be exceeded"
            );
            crate::metrics::record_budget_rejection(BudgetPeriod::Daily.as_str());
            return false;
        }

        let monthly_spent = ledger.monthly(today);
        if monthly_spent + estimated_cost > self.limits.monthly_budget_usd {
            tracing::warn!(
                monthly_spent,
                estimated_cost,
                monthly_budget = self.limits.monthly_budget_usd,
                "Monthly budget would be exceeded"
            );
            crate::metrics::record_budget_rejection(BudgetPeriod::Monthly.as_str());
            return false;
        }

        true
    }

    /// Commit the actual cost of a completed request
    pub async fn record_usage(&self, cost: f64) {
        let mut ledger = self.ledger.lock().await;
        let today = self.clock.today();

        let before = (ledger.daily(today), ledger.monthly(today));
        ledger.add(today, cost);
        let after = (ledger.daily(today), ledger.monthly(today));

        self.warn_on_threshold(BudgetPeriod::Daily, before.0, after.0, self.limits.daily_budget_usd);
        self.warn_on_threshold(BudgetPeriod::Monthly, before.1, after.1, self.limits.monthly_budget_usd);
    }

    pub async fn snapshot(&self) -> SpendSnapshot {
        let ledger = self.ledger.lock().await;
        let today = self.clock.today();

        SpendSnapshot {
            daily_spent: ledger.daily(today),
            monthly_spent: ledger.monthly(today),
            limits: self.limits.clone(),
        }
    }

    fn warn_on_threshold(&self, period: BudgetPeriod, before: f64, after: f64, limit: f64) {
        if limit <= 0.0 {
            return;
        }
        let threshold = limit * self.limits.alert_threshold_percent / 100.0;
        if before < threshold && after >= threshold {
            tracing::warn!(
                period = period.as_str(),
                spent = after,
                budget = limit,
                usage_percent = after / limit * 100.0,
                "Budget alert threshold crossed"
            );
        }
    }
}
