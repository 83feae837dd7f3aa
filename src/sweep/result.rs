//! Outcomes of one- and two-parameter sweeps.

use super::classifier::EquivalenceClass;

/// One sampled axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: String,
    /// Sampled values, largest first.
    pub values: Vec<u64>,
    /// Cell boundaries for grid rendering, one more than `values`.
    pub boundaries: Vec<f64>,
}

impl Axis {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A sweep over one parameter. Classes are keyed by sample index.
#[derive(Debug, Clone)]
pub struct Sweep1d {
    pub axis: Axis,
    pub classes: Vec<EquivalenceClass<usize>>,
    /// Class index of each sample, parallel to `axis.values`.
    pub assignments: Vec<usize>,
    /// Plan cost of each sample, parallel to `axis.values`.
    pub costs: Vec<f64>,
}

impl Sweep1d {
    /// Parameter values whose plan landed in `class`, in sweep order.
    pub fn class_values(&self, class: usize) -> Vec<u64> {
        self.axis
            .values
            .iter()
            .zip(&self.assignments)
            .filter(|(_, &c)| c == class)
            .map(|(&v, _)| v)
            .collect()
    }
}

/// A sweep over two parameters. Classes are keyed by `(i, j)`, where `i`
/// indexes the first axis and `j` the second.
///
/// Grids are stored row-major with one row per second-axis value:
/// `grid[j][i]`.
#[derive(Debug, Clone)]
pub struct Sweep2d {
    pub x: Axis,
    pub y: Axis,
    pub classes: Vec<EquivalenceClass<(usize, usize)>>,
    pub grid: Vec<Vec<usize>>,
    pub costs: Vec<Vec<f64>>,
}

impl Sweep2d {
    pub fn class_at(&self, i: usize, j: usize) -> usize {
        self.grid[j][i]
    }

    pub fn cost_at(&self, i: usize, j: usize) -> f64 {
        self.costs[j][i]
    }

    /// Parameter pairs whose plan landed in `class`.
    ///
    /// Listed smallest first: walking the first axis in the outer loop and
    /// the second in the inner loop, then reversing.
    pub fn class_coordinates(&self, class: usize) -> Vec<(u64, u64)> {
        let mut coordinates = Vec::new();
        for (i, &x) in self.x.values.iter().enumerate() {
            for (j, &y) in self.y.values.iter().enumerate() {
                if self.class_at(i, j) == class {
                    coordinates.push((x, y));
                }
            }
        }
        coordinates.reverse();
        coordinates
    }
}
