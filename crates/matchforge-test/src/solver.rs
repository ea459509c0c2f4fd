//! Reference assignment solvers.
//!
//! [`ExhaustiveSolver`] enumerates every maximum-cardinality assignment and
//! keeps the cheapest. It is only meant for the handful of rows and columns a
//! test uses.

use std::sync::Mutex;

use matchforge_core::{Assignment, AssignmentSolver, DenseMatrix};

/// Sentinel used by the fixture solvers unless told otherwise.
pub const UNASSIGNED: i64 = -1;

/// Brute force optimal solver.
///
/// Assigns `min(rows, columns)` pairs minimizing the total cost. Ties are
/// broken in favour of the first assignment found in row-major order.
#[derive(Clone, Copy, Debug)]
pub struct ExhaustiveSolver {
    unassigned: i64,
}

impl ExhaustiveSolver {
    pub fn new() -> Self {
        Self {
            unassigned: UNASSIGNED,
        }
    }

    pub fn with_sentinel(unassigned: i64) -> Self {
        Self { unassigned }
    }

    pub fn unassigned(&self) -> i64 {
        self.unassigned
    }
}

impl Default for ExhaustiveSolver {
    fn default() -> Self {
        Self::new()
    }
}

struct Search<'a> {
    costs: &'a DenseMatrix,
    target: usize,
    current: Vec<Option<usize>>,
    used: Vec<bool>,
    best: Option<(i128, Vec<Option<usize>>)>,
}

impl Search<'_> {
    fn visit(&mut self, row: usize, assigned: usize, total: i128) {
        let remaining_rows = self.costs.rows() - row;
        if assigned + remaining_rows < self.target {
            return;
        }
        if row == self.costs.rows() {
            if self.best.as_ref().map_or(true, |(cost, _)| total < *cost) {
                self.best = Some((total, self.current.clone()));
            }
            return;
        }
        for column in 0..self.costs.columns() {
            if self.used[column] {
                continue;
            }
            self.used[column] = true;
            self.current[row] = Some(column);
            let cost = i128::from(self.costs[(row, column)]);
            self.visit(row + 1, assigned + 1, total + cost);
            self.current[row] = None;
            self.used[column] = false;
        }
        self.visit(row + 1, assigned, total);
    }
}

impl AssignmentSolver for ExhaustiveSolver {
    fn solve(&self, costs: &DenseMatrix) -> Assignment {
        let mut search = Search {
            costs,
            target: costs.rows().min(costs.columns()),
            current: vec![None; costs.rows()],
            used: vec![false; costs.columns()],
            best: None,
        };
        search.visit(0, 0, 0);

        let mut rows = vec![self.unassigned; costs.rows()];
        let mut columns = vec![self.unassigned; costs.columns()];
        if let Some((_, best)) = search.best {
            for (row, column) in best.into_iter().enumerate() {
                if let Some(column) = column {
                    rows[row] = column as i64;
                    columns[column] = row as i64;
                }
            }
        }
        Assignment::new(rows, columns)
    }
}

/// Returns a fixed assignment and records every matrix it receives.
#[derive(Debug)]
pub struct ScriptedSolver {
    assignment: Assignment,
    received: Mutex<Vec<DenseMatrix>>,
}

impl ScriptedSolver {
    pub fn new(row_assignments: Vec<i64>, column_assignments: Vec<i64>) -> Self {
        Self {
            assignment: Assignment::new(row_assignments, column_assignments),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.received.lock().unwrap().len()
    }

    pub fn last_matrix(&self) -> Option<DenseMatrix> {
        self.received.lock().unwrap().last().cloned()
    }
}

impl AssignmentSolver for ScriptedSolver {
    fn solve(&self, costs: &DenseMatrix) -> Assignment {
        self.received.lock().unwrap().push(costs.clone());
        self.assignment.clone()
    }
}
