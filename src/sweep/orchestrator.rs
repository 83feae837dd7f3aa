//! Drives samples through fresh backends and classifies the resulting plans.

use crate::backend::{Backend, BackendProvider};
use crate::plan::Plan;

use super::boundaries::centers_to_boundaries;
use super::classifier::EquivalenceClasses;
use super::result::{Axis, Sweep1d, Sweep2d};
use super::sampler::sample;
use super::{ParameterConfig, ParameterizedStatement, SweepError, SweepResult};

/// Runs sweeps of a query over seeded data.
///
/// Every sample gets its own backend from the provider: seed statements run
/// with the sample's parameter values, statistics are refreshed, the plan is
/// captured, and the backend is shut down again. Samples run one at a time.
pub struct SweepRunner<P> {
    provider: P,
    statements: Vec<ParameterizedStatement>,
    query: String,
}

impl<P: BackendProvider> SweepRunner<P> {
    pub fn new(
        provider: P,
        statements: Vec<ParameterizedStatement>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            statements,
            query: query.into(),
        }
    }

    /// Capture the plan once, with no swept parameters.
    pub async fn run_0d(&self) -> SweepResult<Plan> {
        self.check_arity(0)?;
        self.run_sample(&[]).await
    }

    /// Sweep one parameter, largest value first.
    pub async fn run_1d(&self, parameter: &ParameterConfig) -> SweepResult<Sweep1d> {
        self.check_arity(1)?;
        let values = sample_axis(parameter)?;

        let mut classes = EquivalenceClasses::new();
        let mut assignments = Vec::with_capacity(values.len());
        let mut costs = Vec::with_capacity(values.len());

        for (i, &value) in values.iter().enumerate() {
            tracing::info!(sample = i + 1, of = values.len(), value, "running sample");
            let plan = self.run_sample(&[value]).await?;
            let cost = plan.cost();
            let class = classes.add(i, plan)?;
            tracing::debug!(class, cost, "classified sample");
            assignments.push(class);
            costs.push(cost);
        }

        Ok(Sweep1d {
            axis: axis(parameter, values)?,
            classes: classes.into_classes(),
            assignments,
            costs,
        })
    }

    /// Sweep two parameters over their full cross product.
    pub async fn run_2d(
        &self,
        first: &ParameterConfig,
        second: &ParameterConfig,
    ) -> SweepResult<Sweep2d> {
        self.check_arity(2)?;
        let xs = sample_axis(first)?;
        let ys = sample_axis(second)?;

        let total = xs.len() * ys.len();
        let mut classes = EquivalenceClasses::new();
        let mut grid = vec![vec![0usize; xs.len()]; ys.len()];
        let mut costs = vec![vec![0f64; xs.len()]; ys.len()];

        for (i, &x) in xs.iter().enumerate() {
            for (j, &y) in ys.iter().enumerate() {
                let n = i * ys.len() + j + 1;
                tracing::info!(sample = n, of = total, x, y, "running sample");
                let plan = self.run_sample(&[x, y]).await?;
                let cost = plan.cost();
                let class = classes.add((i, j), plan)?;
                tracing::debug!(class, cost, "classified sample");
                grid[j][i] = class;
                costs[j][i] = cost;
            }
        }

        Ok(Sweep2d {
            x: axis(first, xs)?,
            y: axis(second, ys)?,
            classes: classes.into_classes(),
            grid,
            costs,
        })
    }

    /// Run one sample in a fresh backend, which is shut down on every path.
    pub async fn run_sample(&self, values: &[u64]) -> SweepResult<Plan> {
        let mut backend = self.provider.start().await?;
        let outcome = self.seed_and_plan(backend.as_mut(), values).await;
        let teardown = backend.shutdown().await;

        match (outcome, teardown) {
            (Ok(plan), Ok(())) => Ok(plan),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(teardown_err)) => {
                tracing::warn!(error = %teardown_err, "backend teardown failed after an error");
                Err(e)
            }
        }
    }

    async fn seed_and_plan(&self, backend: &mut dyn Backend, values: &[u64]) -> SweepResult<Plan> {
        let mut offset = 0;
        for statement in &self.statements {
            let end = offset + statement.parameter_count;
            let slice = values
                .get(offset..end)
                .ok_or_else(|| SweepError::ParameterCountMismatch {
                    declared: self.declared_parameters(),
                    swept: values.len(),
                })?;
            tracing::debug!(statement = %statement.statement, ?slice, "seeding");
            backend.execute_statement(&statement.statement, slice).await?;
            offset = end;
        }

        backend.prepare_indexes().await?;
        Ok(backend.plan_query(&self.query).await?)
    }

    fn declared_parameters(&self) -> usize {
        self.statements.iter().map(|s| s.parameter_count).sum()
    }

    fn check_arity(&self, swept: usize) -> SweepResult<()> {
        let declared = self.declared_parameters();
        if declared == swept {
            Ok(())
        } else {
            Err(SweepError::ParameterCountMismatch { declared, swept })
        }
    }
}

/// Sample an axis, rejecting ranges that collapse to a single value.
fn sample_axis(parameter: &ParameterConfig) -> SweepResult<Vec<u64>> {
    let values = sample(parameter.start, parameter.stop, parameter.steps)?;
    if values.len() <= 1 {
        return Err(SweepError::DegenerateAxis {
            name: parameter.name.clone(),
        });
    }
    Ok(values)
}

fn axis(parameter: &ParameterConfig, values: Vec<u64>) -> SweepResult<Axis> {
    let centers: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    Ok(Axis {
        name: parameter.name.clone(),
        boundaries: centers_to_boundaries(&centers)?,
        values,
    })
}
