//! # plancharts
//!
//! Map how PostgreSQL's plan choice for a query changes as one or two
//! parameters (table sizes, selectivity, ...) vary.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Settings (TOML: query, setup, axes)           │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sweep::sample]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Parameter values (log-spaced, largest first)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [backend: fresh database per sample]
//! ┌─────────────────────────────────────────────────────────┐
//! │           Plan (EXPLAIN JSON tree + text + cost)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sweep::EquivalenceClasses / plan::plan_eq]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Classes of same-shaped plans + class/cost grids     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report]
//! ┌─────────────────────────────────────────────────────────┐
//! │              SweepReport (text or JSON)                  │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod config;
pub mod plan;
pub mod report;
pub mod sweep;
pub mod worker;

pub use plan::{plan_eq, summarize, Plan, PlanError, PlanNode};
pub use sweep::{
    centers_to_boundaries, sample, EquivalenceClasses, ParameterConfig, ParameterizedStatement,
    SweepError, SweepRunner,
};
