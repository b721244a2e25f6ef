mod problem;
mod simplex;
mod solution;
mod standard_form;
mod trace;

pub use problem::{CoefficientPair, Constraint, Objective, Problem, Relation, Sense, ValidationError};
pub use simplex::{EngineOutcome, PivotRule, Solver};
pub use solution::{Solution, SolveStatus, assemble, normalize_zero, round_to};
pub use standard_form::{Row, StandardProblem, transform};
pub use trace::{Trace, TraceEntry, VertexSample, clean, dedup};
