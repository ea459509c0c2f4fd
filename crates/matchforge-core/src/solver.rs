//! The assignment solver contract.
//!
//! The optimal-assignment algorithm itself (Hungarian or equivalent) is an
//! external collaborator. The engine only relies on optimality and on the
//! sentinel convention: every row or column the solver leaves unassigned
//! carries a caller-chosen sentinel value instead of an index.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::cost::Cost;

/// Row-major matrix of costs handed to a solver.
///
/// Cell `(i, j)` is the cost of pairing mentee `i` with mentor `j`. The
/// dimensions are kept even when one of them is zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseMatrix {
    rows: usize,
    columns: usize,
    cells: Vec<Cost>,
}

impl DenseMatrix {
    /// Creates a matrix with every cell set to `value`.
    pub fn filled(rows: usize, columns: usize, value: Cost) -> Self {
        Self {
            rows,
            columns,
            cells: vec![value; rows * columns],
        }
    }

    /// Creates a matrix by evaluating `cell(i, j)` for every cell.
    pub fn from_fn(rows: usize, columns: usize, mut cell: impl FnMut(usize, usize) -> Cost) -> Self {
        let mut cells = Vec::with_capacity(rows * columns);
        for i in 0..rows {
            for j in 0..columns {
                cells.push(cell(i, j));
            }
        }
        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Creates a matrix from nested rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    pub fn from_rows(rows: Vec<Vec<Cost>>) -> Self {
        let columns = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == columns),
            "every row of a cost matrix must have {columns} columns"
        );
        Self {
            rows: rows.len(),
            columns,
            cells: rows.into_iter().flatten().collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<Cost> {
        if row < self.rows && column < self.columns {
            Some(self.cells[row * self.columns + column])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> &[Cost] {
        let start = row * self.columns;
        &self.cells[start..start + self.columns]
    }

    /// Converts back to nested rows.
    pub fn to_rows(&self) -> Vec<Vec<Cost>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }
}

impl Index<(usize, usize)> for DenseMatrix {
    type Output = Cost;

    fn index(&self, (row, column): (usize, usize)) -> &Cost {
        assert!(
            row < self.rows && column < self.columns,
            "cell ({row}, {column}) out of a {}x{} matrix",
            self.rows,
            self.columns
        );
        &self.cells[row * self.columns + column]
    }
}

/// Raw output of an [`AssignmentSolver`].
///
/// `row_assignments[i]` is the column assigned to row `i`,
/// `column_assignments[j]` the row assigned to column `j`; unassigned entries
/// hold the solver's sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    row_assignments: Vec<i64>,
    column_assignments: Vec<i64>,
}

impl Assignment {
    pub fn new(row_assignments: Vec<i64>, column_assignments: Vec<i64>) -> Self {
        Self {
            row_assignments,
            column_assignments,
        }
    }

    /// An assignment leaving every row and column unassigned.
    pub fn unassigned(rows: usize, columns: usize, sentinel: i64) -> Self {
        Self {
            row_assignments: vec![sentinel; rows],
            column_assignments: vec![sentinel; columns],
        }
    }

    pub fn row_assignments(&self) -> &[i64] {
        &self.row_assignments
    }

    pub fn column_assignments(&self) -> &[i64] {
        &self.column_assignments
    }
}

/// Finds an optimal one-to-one assignment minimizing the total cost.
pub trait AssignmentSolver: Send + Sync {
    fn solve(&self, costs: &DenseMatrix) -> Assignment;
}

impl<F> AssignmentSolver for F
where
    F: Fn(&DenseMatrix) -> Assignment + Send + Sync,
{
    fn solve(&self, costs: &DenseMatrix) -> Assignment {
        self(costs)
    }
}

/// A solver together with the sentinel it uses for "unassigned".
#[derive(Clone)]
pub struct SolverBinding {
    solver: Arc<dyn AssignmentSolver>,
    unassigned: i64,
}

impl SolverBinding {
    pub fn new(solver: Arc<dyn AssignmentSolver>, unassigned: i64) -> Self {
        Self { solver, unassigned }
    }

    pub fn solver(&self) -> &dyn AssignmentSolver {
        self.solver.as_ref()
    }

    pub fn unassigned(&self) -> i64 {
        self.unassigned
    }

    /// Interprets a raw assignment entry against a dimension of size `bound`.
    ///
    /// The sentinel, negative values and out-of-range values all mean
    /// "unassigned".
    pub fn resolve_index(&self, raw: i64, bound: usize) -> Option<usize> {
        if raw == self.unassigned {
            return None;
        }
        usize::try_from(raw).ok().filter(|&index| index < bound)
    }
}

impl fmt::Debug for SolverBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverBinding")
            .field("unassigned", &self.unassigned)
            .finish_non_exhaustive()
    }
}
