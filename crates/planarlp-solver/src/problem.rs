use std::fmt;
use std::ops::Neg;

use thiserror::Error;

/// Errors in caller input, detected before any solving is attempted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Objective function coefficients cannot both be zero")]
    EmptyObjective,
    #[error("At least one constraint with a non-zero coefficient is required")]
    NoValidConstraints,
    #[error("Non-finite value in {field}")]
    NonFiniteValue { field: String },
    #[error("Tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f64),
}

/// Coefficients of `x` and `y` in an objective or a constraint row
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoefficientPair {
    pub cx: f64,
    pub cy: f64,
}

impl CoefficientPair {
    pub fn new(cx: f64, cy: f64) -> Self {
        Self { cx, cy }
    }

    /// True when both coefficients are exactly zero
    pub fn is_zero(&self) -> bool {
        self.cx == 0.0 && self.cy == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.cx.is_finite() && self.cy.is_finite()
    }

    /// Evaluate `cx * x + cy * y`
    pub fn dot(&self, x: f64, y: f64) -> f64 {
        self.cx * x + self.cy * y
    }
}

impl Neg for CoefficientPair {
    type Output = CoefficientPair;

    fn neg(self) -> Self::Output {
        CoefficientPair {
            cx: -self.cx,
            cy: -self.cy,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    LessOrEqual,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    GreaterOrEqual,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Equal,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessOrEqual => write!(f, "<="),
            Relation::GreaterOrEqual => write!(f, ">="),
            Relation::Equal => write!(f, "="),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => write!(f, "Maximize"),
            Sense::Minimize => write!(f, "Minimize"),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub coeffs: CoefficientPair,
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    pub fn new(cx: f64, cy: f64, relation: Relation, rhs: f64) -> Self {
        Self {
            coeffs: CoefficientPair::new(cx, cy),
            relation,
            rhs,
        }
    }

    /// A row with both coefficients zero constrains nothing
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_zero()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub coeffs: CoefficientPair,
}

/// A two-variable linear program over `x >= 0`, `y >= 0`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
}

impl Problem {
    pub fn new(sense: Sense, cx: f64, cy: f64) -> Self {
        Self {
            objective: Objective {
                sense,
                coeffs: CoefficientPair::new(cx, cy),
            },
            constraints: Vec::new(),
        }
    }

    pub fn maximize(cx: f64, cy: f64) -> Self {
        Self::new(Sense::Maximize, cx, cy)
    }

    pub fn minimize(cx: f64, cy: f64) -> Self {
        Self::new(Sense::Minimize, cx, cy)
    }

    pub fn add_constraint(&mut self, cx: f64, cy: f64, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint::new(cx, cy, relation, rhs));
    }

    /// Chaining form of [`Problem::add_constraint`]
    pub fn with_constraint(mut self, cx: f64, cy: f64, relation: Relation, rhs: f64) -> Self {
        self.add_constraint(cx, cy, relation, rhs);
        self
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
