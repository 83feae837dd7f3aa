//! Compact structural signatures for labeling plan classes.

use std::fmt;

use super::node::PlanNode;

/// Lazily rendered signature of a plan tree: `Hash Join( Seq Scan, Hash( Seq Scan ) )`.
///
/// Only node types are shown, so two different plans can share a summary.
/// Never use it to decide equality.
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a>(pub &'a PlanNode);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0;
        f.write_str(node.node_type())?;
        if !node.has_children() {
            return Ok(());
        }

        f.write_str("( ")?;
        for (i, child) in node.children().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", Summary(child))?;
        }
        f.write_str(" )")
    }
}

/// Render the signature of a plan tree.
pub fn summarize(node: &PlanNode) -> String {
    Summary(node).to_string()
}
