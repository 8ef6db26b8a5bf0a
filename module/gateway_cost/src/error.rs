//! Error types for cost estimation and budget enforcement

use std::fmt;

/// Which budget window was exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetScope {
    Daily,
    Monthly,
}

/// Errors that can occur in cost management
#[derive(Debug, Clone, PartialEq)]
pub enum CostError {
    /// A tenant's daily or monthly budget has been exhausted.
    BudgetExceeded {
        scope: BudgetScope,
        tenant_id: String,
        used_usd: f64,
        limit_usd: f64,
    },
}

impl fmt::Display for CostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExceeded { scope: BudgetScope::Daily, tenant_id, used_usd, limit_usd } => {
                write!(
                    f,
                    "Daily budget exceeded for tenant '{tenant_id}'. Used: ${used_usd:.2} / ${limit_usd:.2}. Resets at midnight UTC."
                )
            }
            Self::BudgetExceeded { scope: BudgetScope::Monthly, tenant_id, used_usd, limit_usd } => {
                write!(
                    f,
                    "Monthly budget exceeded for tenant '{tenant_id}'. Used: ${used_usd:.2} / ${limit_usd:.2}. Resets on the 1st of next month UTC."
                )
            }
        }
    }
}

impl std::error::Error for CostError {}
