//! Cost estimation and per-tenant budget enforcement for the LLM gateway.
//!
//! ## Known Pitfalls
//!
//! ### DashMap Lock-Iteration Incompatibility
//!
//! DashMap is NOT a drop-in replacement for Mutex-wrapped HashMap. Never hold DashMap entry
//! locks while calling methods that iterate the same map, as this causes deadlock.
//!
//! **Why:** DashMap uses internal sharding with RwLocks. An exclusive write lock on one
//! shard prevents global iteration operations (like `iter()`), even for entries in other shards.
//!
//! **Correct pattern:**
//! ```rust,ignore
//! {
//!   let mut entry = map.entry(key).or_insert(default);
//!   *entry += value;
//! } // Explicit scope drops lock here
//! let total = map.iter().map(|e| *e.value()).sum(); // Safe now
//! ```

#![cfg_attr(not(feature = "enabled"), allow(unused))]

pub mod converter;

#[cfg(feature = "enabled")]
pub mod error;
#[cfg(feature = "enabled")]
pub mod pricing;
#[cfg(feature = "enabled")]
pub mod budget;

#[cfg(feature = "enabled")]
pub use error::{BudgetScope, CostError};
#[cfg(feature = "enabled")]
pub use pricing::{PricingManager, Rate};
#[cfg(feature = "enabled")]
pub use budget::TenantBudgetManager;
