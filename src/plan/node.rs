//! Plan tree nodes.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::keys::{PlanKey, CHILDREN_KEY};
use super::{PlanError, PlanResult};

/// One operation in a query plan tree.
///
/// Attributes are kept exactly as the planner emitted them, keyed by their
/// JSON name. Unknown keys are accepted here and only rejected when the node
/// is compared (see [`plan_eq`](super::plan_eq)).
#[derive(Debug, Clone, PartialEq)]
pub struct PlanNode {
    attributes: BTreeMap<String, Value>,
    children: Vec<PlanNode>,
}

impl PlanNode {
    /// Create a leaf node of the given type.
    pub fn new(node_type: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            PlanKey::NodeType.name().to_string(),
            Value::String(node_type.into()),
        );
        Self {
            attributes,
            children: Vec::new(),
        }
    }

    /// Set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Append a child node.
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Set the planner's cost and size estimates.
    pub fn with_estimates(self, startup_cost: f64, total_cost: f64, rows: u64, width: u64) -> Self {
        self.with_attr(PlanKey::StartupCost.name(), startup_cost)
            .with_attr(PlanKey::TotalCost.name(), total_cost)
            .with_attr(PlanKey::PlanRows.name(), rows)
            .with_attr(PlanKey::PlanWidth.name(), width)
    }

    /// Parse a node (and its subtree) from a JSON object in PostgreSQL's
    /// `EXPLAIN (FORMAT JSON)` layout.
    pub fn from_json(value: &Value) -> PlanResult<Self> {
        let object = value.as_object().ok_or_else(|| {
            PlanError::MalformedPlan(format!("expected a plan node object, got {}", value))
        })?;
        Self::from_object(object)
    }

    fn from_object(object: &Map<String, Value>) -> PlanResult<Self> {
        let mut attributes = BTreeMap::new();
        let mut children = Vec::new();

        for (key, value) in object {
            if key == CHILDREN_KEY {
                let plans = value.as_array().ok_or_else(|| {
                    PlanError::MalformedPlan(format!("\"{}\" is not an array: {}", key, value))
                })?;
                for child in plans {
                    children.push(Self::from_json(child)?);
                }
            } else {
                attributes.insert(key.clone(), value.clone());
            }
        }

        match attributes.get(PlanKey::NodeType.name()) {
            Some(Value::String(_)) => Ok(Self {
                attributes,
                children,
            }),
            Some(other) => Err(PlanError::MalformedPlan(format!(
                "\"Node Type\" is not a string: {}",
                other
            ))),
            None => Err(PlanError::MalformedPlan(format!(
                "plan node without \"Node Type\": {}",
                Value::Object(object.clone())
            ))),
        }
    }

    /// The node's operation label, e.g. `Hash Join`.
    pub fn node_type(&self) -> &str {
        self.attribute(PlanKey::NodeType.name())
            .and_then(Value::as_str)
            .unwrap_or("?")
    }

    /// Look up a raw attribute by JSON name.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn get(&self, key: PlanKey) -> Option<&Value> {
        self.attribute(key.name())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn children(&self) -> &[PlanNode] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The planner's total cost estimate for this subtree.
    pub fn total_cost(&self) -> Option<f64> {
        self.get(PlanKey::TotalCost).and_then(Value::as_f64)
    }
}
