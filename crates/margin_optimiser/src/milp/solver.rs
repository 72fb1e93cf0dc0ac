//! Depth-first branch and bound over the LP relaxation.
//!
//! The strategy-selection problem is
//!
//! ```text
//! maximise    saving^T x
//! subject to  A x <= u    (one capacity row per leg)
//!             x >= 0, integer
//! ```
//!
//! `x = 0` is always feasible, so the search starts from a zero
//! incumbent and only improves on it; an infeasible report from the
//! driver therefore indicates a solver defect, never bad data.
//!
//! Each node carries per-variable `[lower, upper]` bounds. Its
//! relaxation is solved in shifted variables `y = x - lower`, which
//! keeps every row in `A y <= b` form with a feasible slack basis.

use super::error::MilpError;
use super::simplex::{solve_relaxation, LinearProgram, SimplexOutcome};

/// Bound tolerance when comparing node relaxation values to the
/// incumbent.
const BOUND_TOLERANCE: f64 = 1e-9;

/// The integer programme: maximise `objective · x` with `A x <= upper`,
/// `x >= 0` integer.
#[derive(Clone, Debug, PartialEq)]
pub struct MilpProblem {
    /// Objective coefficients (savings per strategy unit)
    pub objective: Vec<f64>,
    /// Constraint rows of the incidence matrix `A`
    pub constraints: Vec<Vec<f64>>,
    /// Row capacities (leg quantities)
    pub upper: Vec<f64>,
}

impl MilpProblem {
    /// Validates dimensions and capacity signs.
    fn validate(&self) -> Result<(), MilpError> {
        let n = self.objective.len();
        if self.constraints.len() != self.upper.len() {
            return Err(MilpError::invalid_problem(format!(
                "{} constraint rows vs {} capacities",
                self.constraints.len(),
                self.upper.len()
            )));
        }
        if let Some(row) = self.constraints.iter().find(|row| row.len() != n) {
            return Err(MilpError::invalid_problem(format!(
                "constraint row has {} entries, expected {}",
                row.len(),
                n
            )));
        }
        if self.upper.iter().any(|&u| u < 0.0) {
            return Err(MilpError::invalid_problem(
                "negative capacity: x = 0 would be infeasible",
            ));
        }
        Ok(())
    }

    /// Largest value each variable can take on its own: the tightest
    /// capacity over its positive rows.
    fn natural_bounds(&self) -> Result<Vec<f64>, MilpError> {
        let n = self.objective.len();
        let mut bounds = vec![f64::INFINITY; n];
        for (row, &capacity) in self.constraints.iter().zip(&self.upper) {
            for (j, &coeff) in row.iter().enumerate() {
                if coeff > 0.0 {
                    bounds[j] = bounds[j].min(capacity / coeff);
                }
            }
        }
        for (j, &bound) in bounds.iter().enumerate() {
            if bound.is_infinite() && self.objective[j] > 0.0 {
                return Err(MilpError::Unbounded { variable: j });
            }
        }
        Ok(bounds
            .into_iter()
            .map(|b| if b.is_infinite() { 0.0 } else { b.floor() })
            .collect())
    }
}

/// Branch-and-bound configuration.
///
/// # Fields
///
/// * `max_nodes` - Node budget for the search tree
/// * `max_simplex_iterations` - Pivot budget per relaxation
/// * `integrality_tolerance` - Distance from an integer that still
///   counts as integral
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MilpConfig {
    /// Node budget for the search tree.
    pub max_nodes: usize,
    /// Pivot budget per LP relaxation.
    pub max_simplex_iterations: usize,
    /// Integrality tolerance.
    pub integrality_tolerance: f64,
}

impl Default for MilpConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            max_simplex_iterations: 10_000,
            integrality_tolerance: 1e-6,
        }
    }
}

/// Result of a branch-and-bound run.
#[derive(Debug, Clone, PartialEq)]
pub struct MilpResult {
    /// Optimal integer counts
    pub x: Vec<u64>,
    /// Optimal objective value
    pub objective: f64,
    /// Nodes explored
    pub nodes: usize,
}

/// A search node: inclusive integer bounds per variable.
#[derive(Clone, Debug)]
struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

/// Solves the integer programme to optimality.
///
/// # Errors
///
/// - [`MilpError::InvalidProblem`] on inconsistent dimensions
/// - [`MilpError::Unbounded`] when a profitable variable has no capacity
/// - [`MilpError::NodeLimit`] / [`MilpError::IterationLimit`] when a
///   budget is exhausted before optimality is proven
pub fn solve_milp(problem: &MilpProblem, config: &MilpConfig) -> Result<MilpResult, MilpError> {
    problem.validate()?;
    let n = problem.objective.len();
    if n == 0 {
        return Ok(MilpResult {
            x: Vec::new(),
            objective: 0.0,
            nodes: 0,
        });
    }

    let natural = problem.natural_bounds()?;
    let mut stack = vec![Node {
        lower: vec![0.0; n],
        upper: natural,
    }];

    // x = 0 is always feasible.
    let mut incumbent = vec![0.0; n];
    let mut incumbent_value = 0.0;
    let mut nodes = 0;

    while let Some(node) = stack.pop() {
        nodes += 1;
        if nodes > config.max_nodes {
            return Err(MilpError::NodeLimit {
                max_nodes: config.max_nodes,
            });
        }

        let Some((relaxed_x, relaxed_value)) =
            solve_node(problem, &node, config.max_simplex_iterations)?
        else {
            continue; // infeasible node
        };

        if relaxed_value <= incumbent_value + BOUND_TOLERANCE {
            continue; // cannot beat the incumbent
        }

        // Most fractional variable.
        let fractional = relaxed_x
            .iter()
            .enumerate()
            .map(|(j, &xj)| (j, xj, (xj - xj.round()).abs()))
            .filter(|&(_, _, frac)| frac > config.integrality_tolerance)
            .max_by(|a, b| a.2.partial_cmp(&b.2).expect("finite fractions"));

        match fractional {
            None => {
                // Integral solution: new incumbent.
                if relaxed_value > incumbent_value {
                    incumbent_value = relaxed_value;
                    incumbent = relaxed_x.iter().map(|xj| xj.round()).collect();
                }
            }
            Some((j, xj, _)) => {
                let mut down = node.clone();
                down.upper[j] = xj.floor();
                let mut up = node;
                up.lower[j] = xj.ceil();
                // Explore the rounded-up branch first: with positive
                // savings it tends to carry the better bound.
                if down.lower[j] <= down.upper[j] {
                    stack.push(down);
                }
                if up.lower[j] <= up.upper[j] {
                    stack.push(up);
                }
            }
        }
    }

    Ok(MilpResult {
        x: incumbent.iter().map(|&v| v as u64).collect(),
        objective: incumbent_value,
        nodes,
    })
}

/// Solves one node's relaxation in shifted variables `y = x - lower`.
///
/// Returns `None` for an infeasible node (a lower-bound vector that
/// already violates a capacity).
fn solve_node(
    problem: &MilpProblem,
    node: &Node,
    max_iterations: usize,
) -> Result<Option<(Vec<f64>, f64)>, MilpError> {
    let n = problem.objective.len();
    let mut constraints = Vec::with_capacity(problem.constraints.len() + n);
    let mut rhs = Vec::with_capacity(problem.upper.len() + n);

    // Capacity rows, shifted: A y <= u - A * lower.
    for (row, &capacity) in problem.constraints.iter().zip(&problem.upper) {
        let used: f64 = row.iter().zip(&node.lower).map(|(a, l)| a * l).sum();
        let slack = capacity - used;
        if slack < -BOUND_TOLERANCE {
            return Ok(None);
        }
        constraints.push(row.clone());
        rhs.push(slack.max(0.0));
    }
    // Branching bounds: y_j <= upper_j - lower_j.
    for j in 0..n {
        let range = node.upper[j] - node.lower[j];
        if range < -BOUND_TOLERANCE {
            return Ok(None);
        }
        let mut row = vec![0.0; n];
        row[j] = 1.0;
        constraints.push(row);
        rhs.push(range.max(0.0));
    }

    let lp = LinearProgram {
        objective: problem.objective.clone(),
        constraints,
        rhs,
    };
    match solve_relaxation(&lp, max_iterations) {
        SimplexOutcome::Optimal { x: y, objective } => {
            let shift: f64 = problem
                .objective
                .iter()
                .zip(&node.lower)
                .map(|(c, l)| c * l)
                .sum();
            let x: Vec<f64> = y.iter().zip(&node.lower).map(|(yj, l)| yj + l).collect();
            Ok(Some((x, objective + shift)))
        }
        SimplexOutcome::Unbounded { variable } => Err(MilpError::Unbounded { variable }),
        SimplexOutcome::IterationLimit => Err(MilpError::IterationLimit {
            max_iterations,
        }),
    }
}
