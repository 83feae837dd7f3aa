//! Parameter sweeps.
//!
//! ```text
//! ParameterConfig ──▶ sample ──▶ values (largest first)
//!                                   │
//!                 per value (pair)  ▼
//!        BackendProvider::start ─▶ seed ─▶ VACUUM/ANALYZE ─▶ EXPLAIN ─▶ shutdown
//!                                   │
//!                                   ▼
//!                       EquivalenceClasses::add ──▶ class grid + costs
//!                                   │
//!                                   ▼
//!                       centers_to_boundaries ──▶ Sweep1d / Sweep2d
//! ```

mod boundaries;
mod classifier;
mod orchestrator;
mod result;
mod sampler;

pub use boundaries::centers_to_boundaries;
pub use classifier::{EquivalenceClass, EquivalenceClasses, Member};
pub use orchestrator::SweepRunner;
pub use result::{Axis, Sweep1d, Sweep2d};
pub use sampler::sample;

use thiserror::Error;

use crate::backend::BackendError;
use crate::plan::PlanError;

/// Errors that abort a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The axis range rounds down to one value, so there is nothing to plot.
    #[error("degenerate input: parameter '{name}' can only take on a single value")]
    DegenerateAxis { name: String },

    #[error("domain error: {0}")]
    Domain(String),

    #[error("setup statements consume {declared} parameter values but {swept} are swept")]
    ParameterCountMismatch { declared: usize, swept: usize },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

pub type SweepResult<T> = Result<T, SweepError>;

/// A seed statement and how many sweep values it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterizedStatement {
    pub statement: String,
    pub parameter_count: usize,
}

impl ParameterizedStatement {
    pub fn new(statement: impl Into<String>, parameter_count: usize) -> Self {
        Self {
            statement: statement.into(),
            parameter_count,
        }
    }
}

/// One swept axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterConfig {
    pub name: String,
    pub start: f64,
    pub stop: f64,
    pub steps: usize,
}

impl ParameterConfig {
    pub fn new(name: impl Into<String>, start: f64, stop: f64, steps: usize) -> Self {
        Self {
            name: name.into(),
            start,
            stop,
            steps,
        }
    }
}
