//! Database backends that seed data and capture query plans.
//!
//! A [`Backend`] is one isolated database environment. The sweep asks a
//! [`BackendProvider`] for a fresh one per sample and shuts it down when the
//! sample is done, whether it succeeded or not.

mod postgres;

pub use postgres::{PostgresBackend, PostgresProvider};

use async_trait::async_trait;
use thiserror::Error;

use crate::plan::{Plan, PlanError};
use crate::worker::WorkerError;

/// Errors raised by a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("worker failure: {0}")]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The database answered with something other than what was asked for.
    #[error("unexpected response to {request}: {detail}")]
    UnexpectedResponse { request: String, detail: String },

    #[error("backend used after shutdown")]
    ShutDown,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// One isolated database environment.
#[async_trait]
pub trait Backend: Send {
    /// Run a seed statement with its slice of the sample's parameter values.
    async fn execute_statement(
        &mut self,
        statement: &str,
        parameter_values: &[u64],
    ) -> BackendResult<()>;

    /// Refresh planner statistics. Called after seeding, before planning.
    async fn prepare_indexes(&mut self) -> BackendResult<()>;

    /// Plan (without executing) `query` and capture both renderings.
    async fn plan_query(&mut self, query: &str) -> BackendResult<Plan>;

    /// Release the environment. Further calls fail with [`BackendError::ShutDown`].
    async fn shutdown(&mut self) -> BackendResult<()>;
}

/// Creates fresh backends.
#[async_trait]
pub trait BackendProvider: Send + Sync {
    async fn start(&self) -> BackendResult<Box<dyn Backend>>;
}
