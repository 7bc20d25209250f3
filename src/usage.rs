use crate::budget::{BudgetPeriod, BudgetTracker};
use serde::Serialize;
use std::sync::Arc;

/// Read-only view of spend against budget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageStats {
    pub daily_usage: f64,
    pub monthly_usage: f64,
    pub daily_budget: f64,
    pub monthly_budget: f64,
    pub daily_remaining: f64,
    pub monthly_remaining: f64,
    pub daily_usage_percent: f64,
    pub monthly_usage_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostAlert {
    pub level: AlertLevel,
    pub period: BudgetPeriod,
    pub message: String,
    pub current_cost: f64,
    pub budget_limit: f64,
    pub usage_percent: f64,
}

fn usage_percent(spent: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        spent / budget * 100.0
    } else {
        0.0
    }
}

#[derive(Clone)]
pub struct UsageReporter {
    budget: Arc<BudgetTracker>,
}

impl UsageReporter {
    pub fn new(budget: Arc<BudgetTracker>) -> Self {
        Self { budget }
    }

    pub async fn usage_stats(&self) -> UsageStats {
        let snapshot = self.budget.snapshot().await;
        let limits = &snapshot.limits;

        UsageStats {
            daily_usage: snapshot.daily_spent,
            monthly_usage: snapshot.monthly_spent,
            daily_budget: limits.daily_budget_usd,
            monthly_budget: limits.monthly_budget_usd,
            daily_remaining: (limits.daily_budget_usd - snapshot.daily_spent).max(0.0),
            monthly_remaining: (limits.monthly_budget_usd - snapshot.monthly_spent).max(0.0),
            daily_usage_percent: usage_percent(snapshot.daily_spent, limits.daily_budget_usd),
            monthly_usage_percent: usage_percent(snapshot.monthly_spent, limits.monthly_budget_usd),
        }
    }

    /// Alerts for each period at or above the alert threshold
    pub async fn cost_alerts(&self) -> Vec<CostAlert> {
        let snapshot = self.budget.snapshot().await;
        let threshold = snapshot.limits.alert_threshold_percent;

        [
            (BudgetPeriod::Daily, snapshot.daily_spent, snapshot.limits.daily_budget_usd),
            (BudgetPeriod::Monthly, snapshot.monthly_spent, snapshot.limits.monthly_budget_usd),
        ]
        .into_iter()
        .filter(|&(_, _, limit)| limit > 0.0)
        .filter_map(|(period, spent, limit)| {
            let percent = usage_percent(spent, limit);
            if percent < threshold {
                return None;
            }

            let level = if percent < 100.0 {
                AlertLevel::Warning
            } else {
                AlertLevel::Critical
            };
            let label = match period {
                BudgetPeriod::Daily => "Daily",
                BudgetPeriod::Monthly => "Monthly",
            };

            Some(CostAlert {
                level,
                period,
                message: format!("{} budget at {:.1}%", label, percent),
                current_cost: spent,
                budget_limit: limit,
                usage_percent: percent,
            })
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::tests::FixedClock;
    use crate::config::CostLimits;
    use chrono::NaiveDate;

    fn reporter(daily: f64, monthly: f64) -> (Arc<BudgetTracker>, UsageReporter) {
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        let tracker = Arc::new(BudgetTracker::with_clock(
            CostLimits {
                daily_budget_usd: daily,
                monthly_budget_usd: monthly,
                alert_threshold_percent: 80.0,
            },
            clock,
        ));
        (tracker.clone(), UsageReporter::new(tracker))
    }

    #[tokio::test]
    async fn test_usage_stats_fresh() {
        let (_, reporter) = reporter(50.0, 1000.0);
        let stats = reporter.usage_stats().await;

        assert_eq!(stats.daily_usage, 0.0);
        assert_eq!(stats.daily_remaining, 50.0);
        assert_eq!(stats.monthly_remaining, 1000.0);
        assert_eq!(stats.daily_usage_percent, 0.0);
    }

    #[tokio::test]
    async fn test_remaining_never_negative() {
        let (tracker, reporter) = reporter(1.0, 1000.0);
        // record bypasses the check, so spend can exceed the ceiling
        tracker.record_usage(1.5).await;

        let stats = reporter.usage_stats().await;
        assert_eq!(stats.daily_usage, 1.5);
        assert_eq!(stats.daily_remaining, 0.0);
        assert_eq!(stats.monthly_remaining, 998.5);
    }

    #[tokio::test]
    async fn test_cost_alerts_levels() {
        let (tracker, reporter) = reporter(10.0, 1000.0);
        assert!(reporter.cost_alerts().await.is_empty());

        tracker.record_usage(8.5).await;
        let alerts = reporter.cost_alerts().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(alerts[0].period, BudgetPeriod::Daily);
        assert_eq!(alerts[0].message, "Daily budget at 85.0%");

        tracker.record_usage(2.0).await;
        let alerts = reporter.cost_alerts().await;
        assert_eq!(alerts[0].level, AlertLevel::Critical);
    }

    #[tokio::test]
    async fn test_zero_budget_has_no_alerts() {
        let (tracker, reporter) = reporter(0.0, 0.0);
        tracker.record_usage(0.0).await;
        assert!(reporter.cost_alerts().await.is_empty());
        assert_eq!(reporter.usage_stats().await.daily_usage_percent, 0.0);
    }
}
