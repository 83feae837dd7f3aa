//! Protocol types for worker communication.
//!
//! One JSON object per line in each direction. The worker owns a throwaway
//! database instance for its whole lifetime, so requests carry no connection
//! details.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "sql.execute").
    pub method: String,
    /// Method-specific parameters.
    pub params: serde_json::Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    /// Error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Request Parameters
// ============================================================================

/// Parameters for `sql.execute`.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteParams {
    /// SQL statement, with `$n` placeholders for bound arguments.
    pub sql: String,
    /// Positional arguments for the placeholders.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<serde_json::Value>,
}

/// Parameters for `worker.shutdown`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ShutdownParams {}

// ============================================================================
// Response Types
// ============================================================================

/// Result column description.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResultColumn {
    /// Column name.
    pub name: String,
    /// Database type name, when the worker reports one.
    #[serde(default)]
    pub type_name: Option<String>,
}

/// Response from `sql.execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteResponse {
    /// Result column descriptions.
    #[serde(default)]
    pub columns: Vec<QueryResultColumn>,
    /// Result data rows.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
    /// Number of rows returned.
    #[serde(default)]
    pub row_count: i64,
    /// Rows affected (for INSERT/UPDATE/DELETE).
    #[serde(default)]
    pub rows_affected: Option<i64>,
}

// ============================================================================
// Method Names
// ============================================================================

/// Worker method names.
pub mod methods {
    pub const EXECUTE: &str = "sql.execute";
    pub const SHUTDOWN: &str = "worker.shutdown";
}
