//! Per-tenant daily/monthly budget tracking.
//!
//! Windows are keyed by UTC calendar date (`YYYY-MM-DD`) and UTC calendar month
//! (`YYYY-MM`). A window rolls over lazily: the first check or record against a
//! new date/month key simply starts that window at zero, there is no background
//! sweep. UTC is used consistently so a tenant's window boundary doesn't
//! depend on server timezone.

use std::sync::Mutex;

use chrono::Utc;
use dashmap::DashMap;

use crate::error::{BudgetScope, CostError};
use gateway_types::TenantBudget;

#[derive(Debug, Clone)]
struct Window {
    key: String,
    spent_usd: f64,
    request_count: u64,
}

impl Window {
    fn new(key: String) -> Self {
        Self { key, spent_usd: 0.0, request_count: 0 }
    }

    /// Reset to zero if `current_key` names a new window.
    fn roll(&mut self, current_key: &str) {
        if self.key != current_key {
            self.key = current_key.to_string();
            self.spent_usd = 0.0;
            self.request_count = 0;
        }
    }
}

#[derive(Debug)]
struct TenantState {
    daily_limit_usd: f64,
    monthly_limit_usd: f64,
    daily: Window,
    monthly: Window,
}

/// Tracks and enforces per-tenant daily and monthly spend.
///
/// # Known pitfall
///
/// Never hold a `DashMap` entry guard (from `.entry()`/`.get_mut()`) while calling
/// a method that iterates the whole map (like [`TenantBudgetManager::all_tenants`]).
/// DashMap's sharded `RwLock`s make that combination deadlock. Always let the entry
/// guard go out of scope before iterating.
pub struct TenantBudgetManager {
    tenants: DashMap<String, Mutex<TenantState>>,
    default_daily_usd: f64,
    default_monthly_usd: f64,
}

impl TenantBudgetManager {
    /// Create a manager using the given defaults for tenants seen for the first time.
    pub fn new(default_daily_usd: f64, default_monthly_usd: f64) -> Self {
        Self {
            tenants: DashMap::new(),
            default_daily_usd,
            default_monthly_usd,
        }
    }

    fn daily_key() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    fn monthly_key() -> String {
        Utc::now().format("%Y-%m").to_string()
    }

    fn entry_for(&self, tenant_id: &str) -> dashmap::mapref::one::Ref<'_, String, Mutex<TenantState>> {
        if !self.tenants.contains_key(tenant_id) {
            self.tenants.entry(tenant_id.to_string()).or_insert_with(|| {
                Mutex::new(TenantState {
                    daily_limit_usd: self.default_daily_usd,
                    monthly_limit_usd: self.default_monthly_usd,
                    daily: Window::new(Self::daily_key()),
                    monthly: Window::new(Self::monthly_key()),
                })
            });
        }
        self.tenants.get(tenant_id).expect("just inserted")
    }

    /// Pre-flight check: does `estimated_cost_usd` fit within the tighter of the
    /// daily or monthly remaining budget? Daily is reported first when both fail.
    pub fn check(&self, tenant_id: &str, estimated_cost_usd: f64) -> Result<(), CostError> {
        let entry = self.entry_for(tenant_id);
        let mut state = entry.lock().unwrap();
        state.daily.roll(&Self::daily_key());
        state.monthly.roll(&Self::monthly_key());

        if state.daily.spent_usd + estimated_cost_usd > state.daily_limit_usd {
            return Err(CostError::BudgetExceeded {
                scope: BudgetScope::Daily,
                tenant_id: tenant_id.to_string(),
                used_usd: state.daily.spent_usd,
                limit_usd: state.daily_limit_usd,
            });
        }
        if state.monthly.spent_usd + estimated_cost_usd > state.monthly_limit_usd {
            return Err(CostError::BudgetExceeded {
                scope: BudgetScope::Monthly,
                tenant_id: tenant_id.to_string(),
                used_usd: state.monthly.spent_usd,
                limit_usd: state.monthly_limit_usd,
            });
        }
        Ok(())
    }

    /// Commit the actual cost of a completed request against both windows.
    pub fn record(&self, tenant_id: &str, actual_cost_usd: f64) {
        let entry = self.entry_for(tenant_id);
        let mut state = entry.lock().unwrap();
        state.daily.roll(&Self::daily_key());
        state.monthly.roll(&Self::monthly_key());

        state.daily.spent_usd += actual_cost_usd;
        state.daily.request_count += 1;
        state.monthly.spent_usd += actual_cost_usd;
        state.monthly.request_count += 1;
    }

    /// Override a tenant's limits (e.g. via an admin endpoint).
    pub fn set_tenant_budget(&self, tenant_id: &str, daily_limit_usd: f64, monthly_limit_usd: f64) {
        let entry = self.entry_for(tenant_id);
        let mut state = entry.lock().unwrap();
        state.daily_limit_usd = daily_limit_usd;
        state.monthly_limit_usd = monthly_limit_usd;
    }

    /// Snapshot a single tenant's budget window.
    pub fn get_budget(&self, tenant_id: &str) -> TenantBudget {
        let entry = self.entry_for(tenant_id);
        let mut state = entry.lock().unwrap();
        state.daily.roll(&Self::daily_key());
        state.monthly.roll(&Self::monthly_key());

        TenantBudget {
            tenant_id: tenant_id.to_string(),
            daily_limit_usd: state.daily_limit_usd,
            monthly_limit_usd: state.monthly_limit_usd,
            daily_used_usd: state.daily.spent_usd,
            monthly_used_usd: state.monthly.spent_usd,
            daily_remaining_usd: (state.daily_limit_usd - state.daily.spent_usd).max(0.0),
            monthly_remaining_usd: (state.monthly_limit_usd - state.monthly.spent_usd).max(0.0),
            request_count_today: state.daily.request_count,
            request_count_month: state.monthly.request_count,
            last_updated: Utc::now(),
        }
    }

    /// Snapshot every tenant the manager has seen.
    ///
    /// Entry guards are dropped before this collects into the result vec; see the
    /// struct-level pitfall note.
    pub fn all_tenants(&self) -> Vec<TenantBudget> {
        let ids: Vec<String> = self.tenants.iter().map(|e| e.key().clone()).collect();
        ids.iter().map(|id| self.get_budget(id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_tenant_gets_defaults() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        let budget = mgr.get_budget("acme");
        assert_eq!(budget.daily_limit_usd, 10.0);
        assert_eq!(budget.daily_used_usd, 0.0);
        assert_eq!(budget.request_count_today, 0);
    }

    #[test]
    fn check_allows_spend_within_budget() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        assert!(mgr.check("acme", 5.0).is_ok());
    }

    #[test]
    fn check_blocks_spend_over_daily_budget() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        let err = mgr.check("acme", 15.0).unwrap_err();
        assert!(matches!(err, CostError::BudgetExceeded { scope: BudgetScope::Daily, .. }));
    }

    #[test]
    fn check_reports_daily_before_monthly() {
        let mgr = TenantBudgetManager::new(10.0, 5.0);
        // Over both: daily ($10 limit) is the narrower window and should surface first.
        let err = mgr.check("acme", 50.0).unwrap_err();
        assert!(matches!(err, CostError::BudgetExceeded { scope: BudgetScope::Daily, .. }));
    }

    #[test]
    fn record_accumulates_into_both_windows() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        mgr.record("acme", 2.5);
        mgr.record("acme", 1.5);
        let budget = mgr.get_budget("acme");
        assert_eq!(budget.daily_used_usd, 4.0);
        assert_eq!(budget.monthly_used_usd, 4.0);
        assert_eq!(budget.request_count_today, 2);
        assert_eq!(budget.request_count_month, 2);
    }

    #[test]
    fn record_then_exceeding_check_fails() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        mgr.record("acme", 9.0);
        assert!(mgr.check("acme", 0.5).is_ok());
        assert!(mgr.check("acme", 2.0).is_err());
    }

    #[test]
    fn set_tenant_budget_overrides_defaults() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        mgr.set_tenant_budget("acme", 50.0, 500.0);
        let budget = mgr.get_budget("acme");
        assert_eq!(budget.daily_limit_usd, 50.0);
        assert_eq!(budget.monthly_limit_usd, 500.0);
    }

    #[test]
    fn all_tenants_lists_every_seen_tenant() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        mgr.record("acme", 1.0);
        mgr.record("globex", 2.0);
        let all = mgr.all_tenants();
        let ids: Vec<&str> = all.iter().map(|b| b.tenant_id.as_str()).collect();
        assert!(ids.contains(&"acme"));
        assert!(ids.contains(&"globex"));
    }

    #[test]
    fn tenants_are_independent() {
        let mgr = TenantBudgetManager::new(10.0, 200.0);
        mgr.record("acme", 9.5);
        assert!(mgr.check("globex", 9.9).is_ok());
    }
}
