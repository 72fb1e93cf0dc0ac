//! Primal tableau simplex for the LP relaxation.
//!
//! Solves
//!
//! ```text
//! maximise    c^T x
//! subject to  A x <= b,  x >= 0
//! ```
//!
//! with every `b_i >= 0`, so the all-slack basis is feasible and no
//! phase-one pass is needed. Pivoting uses Bland's rule (smallest
//! eligible index), which cannot cycle; an iteration cap guards against
//! pathological inputs anyway.
//!
//! The tableau is dense: the instances here have a handful of rows
//! (one per leg) and columns (one per candidate strategy).

/// Pivot tolerance: entries smaller than this are treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-9;

/// An LP in `maximise c·x, A x <= b, x >= 0` form with `b >= 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearProgram {
    /// Objective coefficients (maximised)
    pub objective: Vec<f64>,
    /// Constraint rows of `A`
    pub constraints: Vec<Vec<f64>>,
    /// Right-hand sides, all non-negative
    pub rhs: Vec<f64>,
}

/// Result of a simplex run.
#[derive(Clone, Debug, PartialEq)]
pub enum SimplexOutcome {
    /// Optimum found.
    Optimal {
        /// Optimal structural variables
        x: Vec<f64>,
        /// Optimal objective value
        objective: f64,
    },
    /// Objective can grow without bound.
    Unbounded {
        /// Entering column with no blocking row
        variable: usize,
    },
    /// Pivot budget exhausted.
    IterationLimit,
}

/// Runs the primal simplex on `lp`.
///
/// # Panics
///
/// Panics (debug) on inconsistent dimensions or a negative right-hand
/// side; callers construct programs from validated node data.
pub fn solve_relaxation(lp: &LinearProgram, max_iterations: usize) -> SimplexOutcome {
    let n = lp.objective.len();
    let m = lp.constraints.len();
    debug_assert_eq!(lp.rhs.len(), m, "rhs length mismatch");
    debug_assert!(
        lp.constraints.iter().all(|row| row.len() == n),
        "constraint row length mismatch"
    );
    debug_assert!(
        lp.rhs.iter().all(|&b| b >= -PIVOT_TOLERANCE),
        "negative rhs: slack basis infeasible"
    );

    // Tableau columns: n structural + m slack + rhs.
    let width = n + m + 1;
    let mut tableau: Vec<Vec<f64>> = Vec::with_capacity(m);
    for (i, row) in lp.constraints.iter().enumerate() {
        let mut t = vec![0.0; width];
        t[..n].copy_from_slice(row);
        t[n + i] = 1.0;
        t[width - 1] = lp.rhs[i].max(0.0);
        tableau.push(t);
    }
    // Reduced-cost row: positive entries are improving columns.
    let mut reduced = vec![0.0; width];
    reduced[..n].copy_from_slice(&lp.objective);

    // Basis: slack variable per row.
    let mut basis: Vec<usize> = (n..n + m).collect();

    for _ in 0..max_iterations {
        // Bland's rule: smallest improving column index.
        let entering = match (0..n + m).find(|&j| reduced[j] > PIVOT_TOLERANCE) {
            Some(j) => j,
            None => {
                // Optimal: read off the structural solution.
                let mut x = vec![0.0; n];
                for (row, &basic) in basis.iter().enumerate() {
                    if basic < n {
                        x[basic] = tableau[row][width - 1];
                    }
                }
                let objective = lp
                    .objective
                    .iter()
                    .zip(&x)
                    .map(|(c, xi)| c * xi)
                    .sum();
                return SimplexOutcome::Optimal { x, objective };
            }
        };

        // Ratio test; Bland tie-break on the smallest basic variable.
        let mut leaving: Option<(usize, f64)> = None;
        for row in 0..m {
            let coeff = tableau[row][entering];
            if coeff > PIVOT_TOLERANCE {
                let ratio = tableau[row][width - 1] / coeff;
                let better = match leaving {
                    None => true,
                    Some((best_row, best_ratio)) => {
                        ratio < best_ratio - PIVOT_TOLERANCE
                            || (ratio < best_ratio + PIVOT_TOLERANCE
                                && basis[row] < basis[best_row])
                    }
                };
                if better {
                    leaving = Some((row, ratio));
                }
            }
        }
        let (pivot_row, _) = match leaving {
            Some(found) => found,
            None => {
                return SimplexOutcome::Unbounded { variable: entering };
            }
        };

        // Pivot.
        let pivot = tableau[pivot_row][entering];
        for value in tableau[pivot_row].iter_mut() {
            *value /= pivot;
        }
        for row in 0..m {
            if row != pivot_row {
                let factor = tableau[row][entering];
                if factor.abs() > PIVOT_TOLERANCE {
                    for col in 0..width {
                        tableau[row][col] -= factor * tableau[pivot_row][col];
                    }
                }
            }
        }
        let factor = reduced[entering];
        for col in 0..width {
            reduced[col] -= factor * tableau[pivot_row][col];
        }
        basis[pivot_row] = entering;
    }

    SimplexOutcome::IterationLimit
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn optimal(lp: &LinearProgram) -> (Vec<f64>, f64) {
        match solve_relaxation(lp, 1000) {
            SimplexOutcome::Optimal { x, objective } => (x, objective),
            other => panic!("expected optimum, got {:?}", other),
        }
    }

    #[test]
    fn test_single_variable_capacity() {
        // max 8000 x, x <= 3, x <= 2
        let lp = LinearProgram {
            objective: vec![8000.0],
            constraints: vec![vec![1.0], vec![1.0]],
            rhs: vec![3.0, 2.0],
        };
        let (x, obj) = optimal(&lp);
        assert_relative_eq!(x[0], 2.0);
        assert_relative_eq!(obj, 16000.0);
    }

    #[test]
    fn test_two_variables_shared_capacity() {
        // max 3x + 2y s.t. x + y <= 4, x <= 2, y <= 3
        let lp = LinearProgram {
            objective: vec![3.0, 2.0],
            constraints: vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            rhs: vec![4.0, 2.0, 3.0],
        };
        let (x, obj) = optimal(&lp);
        assert_relative_eq!(x[0], 2.0);
        assert_relative_eq!(x[1], 2.0);
        assert_relative_eq!(obj, 10.0);
    }

    #[test]
    fn test_fractional_optimum() {
        // max x + y s.t. 2x + y <= 3, x + 2y <= 3 -> x = y = 1
        // max 2x + y under the same rows -> x = 1.5, y = 0
        let lp = LinearProgram {
            objective: vec![2.0, 1.0],
            constraints: vec![vec![2.0, 1.0], vec![1.0, 2.0]],
            rhs: vec![3.0, 3.0],
        };
        let (x, obj) = optimal(&lp);
        assert_relative_eq!(x[0], 1.5);
        assert_relative_eq!(x[1], 0.0);
        assert_relative_eq!(obj, 3.0);
    }

    #[test]
    fn test_zero_rhs_gives_zero_solution() {
        let lp = LinearProgram {
            objective: vec![5.0],
            constraints: vec![vec![1.0]],
            rhs: vec![0.0],
        };
        let (x, obj) = optimal(&lp);
        assert_relative_eq!(x[0], 0.0);
        assert_relative_eq!(obj, 0.0);
    }

    #[test]
    fn test_unbounded_detected() {
        // max x with no constraining row
        let lp = LinearProgram {
            objective: vec![1.0],
            constraints: vec![vec![-1.0]],
            rhs: vec![1.0],
        };
        assert_eq!(
            solve_relaxation(&lp, 1000),
            SimplexOutcome::Unbounded { variable: 0 }
        );
    }

    #[test]
    fn test_negative_objective_stays_at_origin() {
        let lp = LinearProgram {
            objective: vec![-1.0, -2.0],
            constraints: vec![vec![1.0, 1.0]],
            rhs: vec![5.0],
        };
        let (x, obj) = optimal(&lp);
        assert_relative_eq!(x[0], 0.0);
        assert_relative_eq!(x[1], 0.0);
        assert_relative_eq!(obj, 0.0);
    }

    #[test]
    fn test_incidence_shape() {
        // Two strategies sharing one leg, plus private legs:
        // max 10a + 8b s.t. a + b <= 2 (shared), a <= 1, b <= 2
        let lp = LinearProgram {
            objective: vec![10.0, 8.0],
            constraints: vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            rhs: vec![2.0, 1.0, 2.0],
        };
        let (x, obj) = optimal(&lp);
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 1.0);
        assert_relative_eq!(obj, 18.0);
    }
}
