//! Reporting payload handed to chart renderers, plus a plain-text rendering.
//!
//! The payload is plain data (serde-serializable): axes with their cell
//! boundaries, the class grid, the cost grid, and one entry per equivalence
//! class carrying its representative plan.

use std::fmt::Write as _;

use serde::Serialize;

use crate::plan::Plan;
use crate::sweep::{Axis, EquivalenceClass, Sweep1d, Sweep2d};

/// Everything a renderer needs to draw a sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub title: String,
    pub axes: Vec<AxisReport>,
    /// Class index per sample. A 1-D sweep has a single row; a 2-D sweep has
    /// one row per value of the second axis.
    pub grid: Vec<Vec<usize>>,
    /// Plan cost per sample, same layout as `grid`.
    pub costs: Vec<Vec<f64>>,
    pub classes: Vec<ClassReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisReport {
    pub name: String,
    pub values: Vec<u64>,
    pub boundaries: Vec<f64>,
}

impl From<&Axis> for AxisReport {
    fn from(axis: &Axis) -> Self {
        Self {
            name: axis.name.clone(),
            values: axis.values.clone(),
            boundaries: axis.boundaries.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub index: usize,
    pub summary: String,
    /// Text rendering of the representative plan.
    pub text: String,
    /// Cost of the representative plan.
    pub cost: f64,
    /// Number of samples in the class.
    pub samples: usize,
    /// Parameter values of every sample in the class, one entry per sample.
    pub coordinates: Vec<Vec<u64>>,
}

impl ClassReport {
    fn new<K>(index: usize, class: &EquivalenceClass<K>, coordinates: Vec<Vec<u64>>) -> Self {
        let representative = class.representative();
        Self {
            index,
            summary: representative.summary(),
            text: representative.text().to_string(),
            cost: representative.cost(),
            samples: class.len(),
            coordinates,
        }
    }
}

impl SweepReport {
    /// Report for a run without swept parameters.
    pub fn single(title: impl Into<String>, plan: &Plan) -> Self {
        Self {
            title: title.into(),
            axes: Vec::new(),
            grid: vec![vec![0]],
            costs: vec![vec![plan.cost()]],
            classes: vec![ClassReport {
                index: 0,
                summary: plan.summary(),
                text: plan.text().to_string(),
                cost: plan.cost(),
                samples: 1,
                coordinates: vec![Vec::new()],
            }],
        }
    }

    pub fn from_1d(title: impl Into<String>, sweep: &Sweep1d) -> Self {
        let classes = sweep
            .classes
            .iter()
            .enumerate()
            .map(|(index, class)| {
                let coordinates = sweep
                    .class_values(index)
                    .into_iter()
                    .rev()
                    .map(|v| vec![v])
                    .collect();
                ClassReport::new(index, class, coordinates)
            })
            .collect();

        Self {
            title: title.into(),
            axes: vec![AxisReport::from(&sweep.axis)],
            grid: vec![sweep.assignments.clone()],
            costs: vec![sweep.costs.clone()],
            classes,
        }
    }

    pub fn from_2d(title: impl Into<String>, sweep: &Sweep2d) -> Self {
        let classes = sweep
            .classes
            .iter()
            .enumerate()
            .map(|(index, class)| {
                let coordinates = sweep
                    .class_coordinates(index)
                    .into_iter()
                    .map(|(x, y)| vec![x, y])
                    .collect();
                ClassReport::new(index, class, coordinates)
            })
            .collect();

        Self {
            title: title.into(),
            axes: vec![AxisReport::from(&sweep.x), AxisReport::from(&sweep.y)],
            grid: sweep.grid.clone(),
            costs: sweep.costs.clone(),
            classes,
        }
    }

    /// Per-class text listing.
    ///
    /// A run without swept parameters renders as the bare plan text.
    pub fn render_text(&self) -> String {
        if self.axes.is_empty() {
            return self
                .classes
                .first()
                .map(|c| c.text.clone())
                .unwrap_or_default();
        }

        let mut out = String::new();
        if !self.title.is_empty() {
            let _ = writeln!(out, "{}", self.title);
            let _ = writeln!(out);
        }

        for class in &self.classes {
            let values: Vec<String> = class
                .coordinates
                .iter()
                .map(|coordinate| format_coordinate(coordinate))
                .collect();
            let _ = writeln!(out, "Equivalence class {}", class.index);
            let _ = writeln!(out, "Parameter values: {}", values.join(", "));
            let _ = writeln!(out, "{}", class.summary);
            let _ = writeln!(out, "{}", class.text);
            let _ = writeln!(out);
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_coordinate(coordinate: &[u64]) -> String {
    match coordinate {
        [single] => single.to_string(),
        values => {
            let parts: Vec<String> = values.iter().map(u64::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}
