use tracing::{debug, trace};

use crate::problem::{CoefficientPair, Problem, ValidationError};
use crate::solution::{assemble, Solution, SolveStatus};
use crate::standard_form::{transform, StandardProblem};
use crate::trace::{clean, Trace, VertexSample};

/// Decision variables `x` and `y` occupy the first two tableau columns
const N_VARS: usize = 2;

/// How the entering column is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative reduced cost, ties to the lowest column
    #[default]
    MostNegative,
    /// Lowest column with a negative reduced cost (Bland's rule, never cycles)
    Bland,
}

/// Two-phase simplex solver for two-variable problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots across both phases before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    pivot_rule: PivotRule,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-9,
            pivot_rule: PivotRule::MostNegative,
        }
    }
}

/// What the engine reports for one standard-form problem
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutcome {
    pub status: SolveStatus,
    /// Vertices from the first feasible basis onward, in minimization sign
    pub trace: Trace,
    pub x: f64,
    pub y: f64,
    /// Minimization objective at `(x, y)`
    pub objective_value: f64,
    pub pivots: usize,
}

impl EngineOutcome {
    fn halted(status: SolveStatus, pivots: usize) -> Self {
        Self {
            status,
            trace: Vec::new(),
            x: f64::NAN,
            y: f64::NAN,
            objective_value: f64::NAN,
            pivots,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn pivot_rule(&self) -> PivotRule {
        self.pivot_rule
    }

    /// Comparisons against NaN or a non-positive tolerance break pivot selection
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            Ok(())
        } else {
            Err(ValidationError::InvalidTolerance(self.tolerance))
        }
    }

    /// Validate, solve and package a problem.
    ///
    /// Validation failures are returned before the engine runs. Infeasible,
    /// unbounded and numerically failed problems are reported through
    /// [`Solution::status`].
    pub fn solve(&self, problem: &Problem) -> Result<Solution, ValidationError> {
        self.validate()?;
        let standard = transform(problem)?;
        let outcome = self.solve_standard(&standard);

        let trace = if outcome.status.is_optimal() {
            clean(&outcome.trace, standard.sense)
        } else {
            Vec::new()
        };

        Ok(assemble(
            standard.sense,
            outcome.status,
            outcome.x,
            outcome.y,
            outcome.objective_value,
            trace,
            outcome.pivots,
        ))
    }

    /// Run both simplex phases on a fresh tableau
    pub fn solve_standard(&self, problem: &StandardProblem) -> EngineOutcome {
        if let Err(e) = self.validate() {
            return EngineOutcome::halted(SolveStatus::NumericalError(e.to_string()), 0);
        }
        let mut tableau = Tableau::build(problem);
        let mut pivots = 0;

        debug!(
            rows = tableau.n_rows(),
            slack = tableau.n_slack,
            artificial = tableau.n_artificial,
            "built tableau"
        );

        // Phase 1: find an initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut pivots) {
                Ok(true) => {
                    debug!(pivots, "phase 1 found a feasible basis");
                }
                Ok(false) => {
                    debug!(pivots, "phase 1 left artificial variables positive");
                    return EngineOutcome::halted(SolveStatus::Infeasible, pivots);
                }
                Err(status) => return EngineOutcome::halted(status, pivots),
            }
        }

        // Phase 2: optimize the true objective from that basis
        let objective = problem.objective;
        let mut costs = vec![0.0; tableau.n_cols() - 1];
        costs[0] = objective.cx;
        costs[1] = objective.cy;
        tableau.price_out(&costs);

        let mut trace = vec![tableau.sample(&objective)];
        let eligible = tableau.artificial_start();

        let result = self.run(&mut tableau, eligible, &mut pivots, Some((&mut trace, &objective)));
        debug!(pivots, ?result, "phase 2 finished");

        match result {
            SimplexResult::Optimal => {
                let (x, y) = tableau.vertex();
                EngineOutcome {
                    status: SolveStatus::Optimal,
                    trace,
                    x,
                    y,
                    objective_value: objective.dot(x, y),
                    pivots,
                }
            }
            other => EngineOutcome::halted(other.into_status(), pivots),
        }
    }

    /// Minimize the sum of artificial variables. `Ok(false)` means infeasible.
    fn phase1(&self, tableau: &mut Tableau, pivots: &mut usize) -> Result<bool, SolveStatus> {
        let art_start = tableau.artificial_start();
        let mut costs = vec![0.0; tableau.n_cols() - 1];
        for cost in costs.iter_mut().skip(art_start) {
            *cost = 1.0;
        }
        tableau.price_out(&costs);

        let eligible = tableau.n_cols() - 1;
        match self.run(tableau, eligible, pivots, None) {
            SimplexResult::Optimal => {}
            // The phase 1 objective is bounded below by zero
            SimplexResult::Unbounded => {
                return Err(SolveStatus::NumericalError("phase 1 objective reported unbounded".to_string()));
            }
            other => return Err(other.into_status()),
        }

        let infeasibility = tableau.objective_value();
        let scale = 1.0 + tableau.max_abs_rhs();
        if infeasibility > self.tolerance * scale {
            return Ok(false);
        }

        self.drive_out_artificials(tableau, pivots);
        Ok(true)
    }

    /// Replace artificial variables left basic at zero with real columns.
    /// A row with no usable entry is redundant and keeps its artificial.
    fn drive_out_artificials(&self, tableau: &mut Tableau, pivots: &mut usize) {
        let art_start = tableau.artificial_start();
        let rhs_col = tableau.rhs_col();

        for row in 0..tableau.n_rows() {
            if tableau.basic_vars[row] < art_start {
                continue;
            }
            let Some(col) = (0..art_start).find(|&j| tableau.data[row][j].abs() > self.tolerance) else {
                trace!(row, "redundant row kept with artificial basis");
                continue;
            };
            tableau.data[row][rhs_col] = 0.0;
            tableau.pivot(row, col);
            *pivots += 1;
        }
    }

    /// Pivot until optimal, unbounded or out of budget. Columns at or past
    /// `eligible` never enter. When `record` is set, a vertex sample is
    /// pushed after every pivot.
    fn run(
        &self,
        tableau: &mut Tableau,
        eligible: usize,
        pivots: &mut usize,
        mut record: Option<(&mut Trace, &CoefficientPair)>,
    ) -> SimplexResult {
        loop {
            let Some(col) = self.find_pivot_column(tableau, eligible) else {
                return SimplexResult::Optimal;
            };
            let Some(row) = self.find_pivot_row(tableau, col) else {
                return SimplexResult::Unbounded;
            };
            if *pivots >= self.max_iterations {
                return SimplexResult::IterationLimit;
            }

            trace!(row, col, leaving = tableau.basic_vars[row], "pivot");
            tableau.pivot(row, col);
            *pivots += 1;

            if !tableau.is_finite() {
                return SimplexResult::NonFinite;
            }
            if let Some((trace, objective)) = record.as_mut() {
                trace.push(tableau.sample(objective));
            }
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, eligible: usize) -> Option<usize> {
        let reduced = &tableau.data[tableau.obj_row()];

        match self.pivot_rule {
            PivotRule::MostNegative => {
                let mut min_val = -self.tolerance;
                let mut min_col = None;
                for (j, &d) in reduced.iter().enumerate().take(eligible) {
                    if d < min_val {
                        min_val = d;
                        min_col = Some(j);
                    }
                }
                min_col
            }
            PivotRule::Bland => (0..eligible).find(|&j| reduced[j] < -self.tolerance),
        }
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..tableau.n_rows() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            // Rounding can leave a basic value a hair below zero
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            match min_row {
                None => {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
                Some(current) => {
                    if ratio < min_ratio - self.tolerance {
                        min_ratio = ratio;
                        min_row = Some(i);
                    } else if self.pivot_rule == PivotRule::Bland
                        && ratio <= min_ratio + self.tolerance
                        && tableau.basic_vars[i] < tableau.basic_vars[current]
                    {
                        min_row = Some(i);
                    }
                }
            }
        }

        min_row
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimplexResult {
    Optimal,
    Unbounded,
    IterationLimit,
    NonFinite,
}

impl SimplexResult {
    fn into_status(self) -> SolveStatus {
        match self {
            SimplexResult::Optimal => SolveStatus::Optimal,
            SimplexResult::Unbounded => SolveStatus::Unbounded,
            SimplexResult::IterationLimit => SolveStatus::NumericalError("iteration limit exceeded".to_string()),
            SimplexResult::NonFinite => SolveStatus::NumericalError("non-finite value in tableau".to_string()),
        }
    }
}

/// Dense tableau: constraint rows followed by the reduced-cost row.
///
/// Columns are `x`, `y`, one slack per inequality row, the artificial
/// variables, then the right-hand side. The rhs entry of the reduced-cost
/// row holds the negated objective value.
struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn build(problem: &StandardProblem) -> Self {
        let n_rows = problem.num_rows();
        let n_slack = problem.inequalities.len();
        let n_artificial =
            problem.inequalities.iter().filter(|r| r.rhs < 0.0).count() + problem.equalities.len();

        let total_cols = N_VARS + n_slack + n_artificial + 1; // +1 for RHS
        let rhs_col = total_cols - 1;

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_rows + 1],
            basic_vars: vec![0; n_rows],
            n_slack,
            n_artificial,
        };

        let mut artificial_idx = N_VARS + n_slack;

        for (i, row) in problem.inequalities.iter().enumerate() {
            // Flip rows with a negative rhs so the starting basis is feasible
            let sign = if row.rhs < 0.0 { -1.0 } else { 1.0 };
            let slack_idx = N_VARS + i;
            tableau.data[i][0] = sign * row.coeffs.cx;
            tableau.data[i][1] = sign * row.coeffs.cy;
            tableau.data[i][slack_idx] = sign;
            tableau.data[i][rhs_col] = sign * row.rhs;

            if row.rhs < 0.0 {
                tableau.data[i][artificial_idx] = 1.0;
                tableau.basic_vars[i] = artificial_idx;
                artificial_idx += 1;
            } else {
                tableau.basic_vars[i] = slack_idx;
            }
        }

        for (k, row) in problem.equalities.iter().enumerate() {
            let i = n_slack + k;
            let sign = if row.rhs < 0.0 { -1.0 } else { 1.0 };
            tableau.data[i][0] = sign * row.coeffs.cx;
            tableau.data[i][1] = sign * row.coeffs.cy;
            tableau.data[i][rhs_col] = sign * row.rhs;
            tableau.data[i][artificial_idx] = 1.0;
            tableau.basic_vars[i] = artificial_idx;
            artificial_idx += 1;
        }

        tableau
    }

    fn n_rows(&self) -> usize {
        self.basic_vars.len()
    }

    fn n_cols(&self) -> usize {
        self.data[0].len()
    }

    fn obj_row(&self) -> usize {
        self.n_rows()
    }

    fn rhs_col(&self) -> usize {
        self.n_cols() - 1
    }

    fn artificial_start(&self) -> usize {
        N_VARS + self.n_slack
    }

    /// Load a cost vector into the reduced-cost row and zero it on the basis
    fn price_out(&mut self, costs: &[f64]) {
        let obj_row = self.obj_row();
        let n_cols = self.n_cols();

        for j in 0..n_cols {
            self.data[obj_row][j] = costs.get(j).copied().unwrap_or(0.0);
        }

        for i in 0..self.n_rows() {
            let basic = self.basic_vars[i];
            let ratio = self.data[obj_row][basic];
            if ratio != 0.0 {
                for j in 0..n_cols {
                    self.data[obj_row][j] -= ratio * self.data[i][j];
                }
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_cols = self.n_cols();

        // Update basic variable
        self.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = self.data[row][col];
        for j in 0..n_cols {
            self.data[row][j] /= pivot_val;
        }

        // Eliminate column in every other row, reduced costs included
        for i in 0..self.data.len() {
            if i != row {
                let factor = self.data[i][col];
                if factor != 0.0 {
                    for j in 0..n_cols {
                        self.data[i][j] -= factor * self.data[row][j];
                    }
                }
            }
        }
    }

    /// Current objective of whichever cost vector was last priced out
    fn objective_value(&self) -> f64 {
        -self.data[self.obj_row()][self.rhs_col()]
    }

    fn max_abs_rhs(&self) -> f64 {
        let rhs_col = self.rhs_col();
        self.data[..self.n_rows()]
            .iter()
            .map(|row| row[rhs_col].abs())
            .fold(0.0, f64::max)
    }

    /// Values of `x` and `y`, zero when non-basic
    fn vertex(&self) -> (f64, f64) {
        let rhs_col = self.rhs_col();
        let mut values = [0.0; N_VARS];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < N_VARS {
                values[basic] = self.data[i][rhs_col];
            }
        }
        (values[0], values[1])
    }

    fn sample(&self, objective: &CoefficientPair) -> VertexSample {
        let (x, y) = self.vertex();
        VertexSample {
            objective_value: objective.dot(x, y),
            x,
            y,
        }
    }

    fn is_finite(&self) -> bool {
        self.data.iter().all(|row| row.iter().all(|v| v.is_finite()))
    }
}
