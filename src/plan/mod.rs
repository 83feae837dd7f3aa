//! Query plans and structural plan equivalence.
//!
//! A [`Plan`] pairs the planner's structured tree with its text rendering and
//! total cost. Equivalence is decided on the tree alone by [`plan_eq`], which
//! ignores volatile estimates (costs, row counts, widths) and fails loudly on
//! attribute keys it has never seen.

mod compare;
pub mod keys;
mod node;
mod summary;

pub use compare::{check_schema, plan_eq};
pub use keys::{AttributeKind, PlanKey};
pub use node::PlanNode;
pub use summary::{summarize, Summary};

use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading or comparing plans.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The planner emitted an attribute outside the known schema.
    #[error("unknown plan attribute \"{key}\" (value: {value})")]
    UnknownAttribute { key: String, value: String },

    /// The plan payload does not have the expected shape.
    #[error("malformed plan payload: {0}")]
    MalformedPlan(String),

    #[error("invalid plan JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type PlanResult<T> = Result<T, PlanError>;

/// A captured query plan.
#[derive(Debug, Clone)]
pub struct Plan {
    root: PlanNode,
    text: String,
    cost: f64,
}

impl Plan {
    /// Build a plan from its tree and text rendering.
    ///
    /// The cost is read from the root's "Total Cost" attribute, which must be
    /// present and numeric.
    pub fn new(root: PlanNode, text: impl Into<String>) -> PlanResult<Self> {
        let cost = root.total_cost().ok_or_else(|| {
            PlanError::MalformedPlan(format!(
                "root node \"{}\" has no numeric \"Total Cost\"",
                root.node_type()
            ))
        })?;
        Ok(Self {
            root,
            text: text.into(),
            cost,
        })
    }

    /// Build a plan from an `EXPLAIN (FORMAT JSON)` payload.
    ///
    /// The payload must be an array holding exactly one object with a `"Plan"`
    /// entry. Other top-level entries (planning time, settings) are ignored.
    pub fn from_explain_json(payload: &Value, text: impl Into<String>) -> PlanResult<Self> {
        let entries = payload.as_array().ok_or_else(|| {
            PlanError::MalformedPlan(format!("expected a JSON array, got {}", payload))
        })?;

        let entry = match entries.as_slice() {
            [entry] => entry,
            _ => {
                return Err(PlanError::MalformedPlan(format!(
                    "expected exactly one top-level plan, got {}",
                    entries.len()
                )))
            }
        };

        let root = entry.get("Plan").ok_or_else(|| {
            PlanError::MalformedPlan(format!("top-level entry has no \"Plan\": {}", entry))
        })?;

        Self::new(PlanNode::from_json(root)?, text)
    }

    /// Like [`Plan::from_explain_json`], but starting from the raw JSON text.
    pub fn from_explain_str(json: &str, text: impl Into<String>) -> PlanResult<Self> {
        let payload: Value = serde_json::from_str(json)?;
        Self::from_explain_json(&payload, text)
    }

    pub fn root(&self) -> &PlanNode {
        &self.root
    }

    /// Human-readable rendering, as printed by plain `EXPLAIN`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Planner's total cost estimate for the whole plan.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Structural signature of the plan tree.
    pub fn summary(&self) -> String {
        summarize(&self.root)
    }

    /// Structural equality; text and cost are not considered.
    pub fn same_shape(&self, other: &Plan) -> PlanResult<bool> {
        plan_eq(&self.root, &other.root)
    }
}
