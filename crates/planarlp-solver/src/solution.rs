use std::fmt;

use crate::problem::Sense;
use crate::trace::TraceEntry;

/// The result of solving a problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Solution status
    pub status: SolveStatus,
    /// Objective value in the caller's sense (only meaningful when optimal)
    pub objective_value: f64,
    pub x: f64,
    pub y: f64,
    /// Distinct vertices visited, last one flagged final; empty unless optimal
    pub trace: Vec<TraceEntry>,
    /// Simplex pivots performed across both phases
    pub pivots: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    /// An optimal vertex was found
    Optimal,
    /// The feasible region is empty
    Infeasible,
    /// The objective can improve without limit
    Unbounded,
    /// Arithmetic broke down or the iteration cap was hit
    NumericalError(String),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "Optimal"),
            SolveStatus::Infeasible => write!(f, "Infeasible"),
            SolveStatus::Unbounded => write!(f, "Unbounded"),
            SolveStatus::NumericalError(msg) => write!(f, "NumericalError: {}", msg),
        }
    }
}

/// Map `-0.0` to `0.0`, leaving every other value untouched
pub fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

/// Round to a fixed number of decimals for display
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(decimals as i32);
    normalize_zero((value * scale).round() / scale)
}

/// Package the engine's outcome into a [`Solution`] in the caller's sign convention.
///
/// `objective_value` is the engine's minimization value; it is negated back
/// for maximization problems.
pub fn assemble(
    sense: Sense,
    status: SolveStatus,
    x: f64,
    y: f64,
    objective_value: f64,
    trace: Vec<TraceEntry>,
    pivots: usize,
) -> Solution {
    match status {
        SolveStatus::Optimal => {
            let value = match sense {
                Sense::Maximize => -objective_value,
                Sense::Minimize => objective_value,
            };
            Solution {
                status,
                objective_value: normalize_zero(value),
                x: normalize_zero(x),
                y: normalize_zero(y),
                trace,
                pivots,
            }
        }
        SolveStatus::Infeasible => Solution::infeasible(sense, pivots),
        SolveStatus::Unbounded => Solution::unbounded(sense, pivots),
        SolveStatus::NumericalError(msg) => Solution::numerical_error(msg, pivots),
    }
}

impl Solution {
    /// No feasible point: the optimum over an empty set is the worst possible value
    pub fn infeasible(sense: Sense, pivots: usize) -> Self {
        let objective_value = match sense {
            Sense::Minimize => f64::INFINITY,
            Sense::Maximize => f64::NEG_INFINITY,
        };
        Self::without_vertex(SolveStatus::Infeasible, objective_value, pivots)
    }

    pub fn unbounded(sense: Sense, pivots: usize) -> Self {
        let objective_value = match sense {
            Sense::Minimize => f64::NEG_INFINITY,
            Sense::Maximize => f64::INFINITY,
        };
        Self::without_vertex(SolveStatus::Unbounded, objective_value, pivots)
    }

    pub fn numerical_error(message: impl Into<String>, pivots: usize) -> Self {
        Self::without_vertex(SolveStatus::NumericalError(message.into()), f64::NAN, pivots)
    }

    fn without_vertex(status: SolveStatus, objective_value: f64, pivots: usize) -> Self {
        Self {
            status,
            objective_value,
            x: f64::NAN,
            y: f64::NAN,
            trace: Vec::new(),
            pivots,
        }
    }

    /// Entry flagged as the optimal vertex, if any
    pub fn final_entry(&self) -> Option<&TraceEntry> {
        self.trace.iter().find(|e| e.is_final)
    }

    /// Copy with every reported number rounded for display
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            status: self.status.clone(),
            objective_value: round_to(self.objective_value, decimals),
            x: round_to(self.x, decimals),
            y: round_to(self.y, decimals),
            trace: self
                .trace
                .iter()
                .map(|e| TraceEntry {
                    objective_value: round_to(e.objective_value, decimals),
                    x: round_to(e.x, decimals),
                    y: round_to(e.y, decimals),
                    ..*e
                })
                .collect(),
            pivots: self.pivots,
        }
    }
}
