//! Structural plan comparison.

use super::keys::{is_known_key, PlanKey};
use super::node::PlanNode;
use super::{PlanError, PlanResult};

/// Decide whether two plan trees have the same shape.
///
/// Discriminating attributes must match exactly (a key present on one side
/// only is a mismatch); volatile estimates are ignored. Children are compared
/// pairwise in the order the planner emitted them, so the same subtrees in a
/// different order count as a different plan.
///
/// # Errors
///
/// Returns [`PlanError::UnknownAttribute`] when either node carries a key
/// outside the known schema. The check runs after the discriminating
/// attributes match, so it never turns an already-unequal pair into an error.
pub fn plan_eq(left: &PlanNode, right: &PlanNode) -> PlanResult<bool> {
    for key in PlanKey::discriminating() {
        if left.get(key) != right.get(key) {
            return Ok(false);
        }
    }

    check_schema(left)?;
    check_schema(right)?;

    match (left.has_children(), right.has_children()) {
        (false, false) => return Ok(true),
        (true, true) => {}
        _ => return Ok(false),
    }

    if left.children().len() != right.children().len() {
        return Ok(false);
    }

    for (l, r) in left.children().iter().zip(right.children()) {
        if !plan_eq(l, r)? {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Reject any attribute the comparator does not understand.
pub fn check_schema(node: &PlanNode) -> PlanResult<()> {
    match node.attributes().find(|(key, _)| !is_known_key(key)) {
        Some((key, value)) => Err(PlanError::UnknownAttribute {
            key: key.to_string(),
            value: value.to_string(),
        }),
        None => Ok(()),
    }
}
