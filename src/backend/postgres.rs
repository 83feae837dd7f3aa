//! PostgreSQL backend driven through the database worker.

use async_trait::async_trait;
use serde_json::Value;

use super::{Backend, BackendError, BackendProvider, BackendResult};
use crate::config::WorkerSettings;
use crate::plan::{Plan, PlanError};
use crate::worker::protocol::ExecuteResponse;
use crate::worker::WorkerClient;

/// Statistics maintenance run before planning.
const MAINTENANCE: &[&str] = &["VACUUM", "ANALYZE"];

/// Spawns one worker (and so one PostgreSQL instance) per backend.
#[derive(Debug, Clone)]
pub struct PostgresProvider {
    settings: WorkerSettings,
}

impl PostgresProvider {
    pub fn new(settings: WorkerSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl BackendProvider for PostgresProvider {
    async fn start(&self) -> BackendResult<Box<dyn Backend>> {
        let client = WorkerClient::spawn_with_settings(&self.settings).await?;
        Ok(Box::new(PostgresBackend::new(client)))
    }
}

/// A PostgreSQL instance owned by a worker process.
pub struct PostgresBackend {
    client: Option<WorkerClient>,
}

impl PostgresBackend {
    pub fn new(client: WorkerClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> BackendResult<&WorkerClient> {
        self.client.as_ref().ok_or(BackendError::ShutDown)
    }

    async fn execute(&self, sql: &str, args: Vec<Value>) -> BackendResult<ExecuteResponse> {
        tracing::debug!(sql, ?args, "executing");
        Ok(self.client()?.execute(sql, args).await?)
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn execute_statement(
        &mut self,
        statement: &str,
        parameter_values: &[u64],
    ) -> BackendResult<()> {
        let args = parameter_values.iter().map(|&v| Value::from(v)).collect();
        self.execute(statement, args).await?;
        Ok(())
    }

    async fn prepare_indexes(&mut self) -> BackendResult<()> {
        for statement in MAINTENANCE {
            self.execute(statement, Vec::new()).await?;
        }
        Ok(())
    }

    async fn plan_query(&mut self, query: &str) -> BackendResult<Plan> {
        let query = query.trim().trim_end_matches(';');

        let structured_sql = format!("EXPLAIN (FORMAT JSON) {}", query);
        let structured = self.execute(&structured_sql, Vec::new()).await?;
        let payload = json_payload(&structured, &structured_sql)?;

        let text_sql = format!("EXPLAIN {}", query);
        let text = text_rendering(&self.execute(&text_sql, Vec::new()).await?, &text_sql)?;

        Ok(Plan::from_explain_json(&payload, text)?)
    }

    async fn shutdown(&mut self) -> BackendResult<()> {
        match self.client.take() {
            Some(client) => Ok(client.shutdown().await?),
            None => Ok(()),
        }
    }
}

/// The single cell of an `EXPLAIN (FORMAT JSON)` result.
///
/// Drivers hand the `json` column back either decoded or as text.
fn json_payload(response: &ExecuteResponse, request: &str) -> BackendResult<Value> {
    let cell = match response.rows.as_slice() {
        [row] if row.len() == 1 => &row[0],
        _ => {
            return Err(BackendError::UnexpectedResponse {
                request: request.to_string(),
                detail: format!("expected a single cell, got {} rows", response.rows.len()),
            })
        }
    };

    match cell {
        Value::String(text) => {
            serde_json::from_str(text).map_err(|e| BackendError::Plan(PlanError::from(e)))
        }
        other => Ok(other.clone()),
    }
}

/// The text plan, one output row per line.
fn text_rendering(response: &ExecuteResponse, request: &str) -> BackendResult<String> {
    let lines = response
        .rows
        .iter()
        .map(|row| match row.first() {
            Some(Value::String(line)) => Ok(line.as_str()),
            other => Err(BackendError::UnexpectedResponse {
                request: request.to_string(),
                detail: format!("expected a text line, got {:?}", other),
            }),
        })
        .collect::<BackendResult<Vec<_>>>()?;
    Ok(lines.join("\n"))
}
