use crate::lexer::Span;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Objective(ObjectiveDecl),
    Constraint(ConstraintDecl),
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    Maximize,
    Minimize,
}

/// `maximize 3x + 5y`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveDecl {
    pub span: Span,
    pub goal: Goal,
    pub expr: LinearExpr,
}

/// `3x + 2y <= 18`; either side may mix variables and constants
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDecl {
    pub span: Span,
    pub lhs: LinearExpr,
    pub op: RelOp,
    pub rhs: LinearExpr,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LinearExpr {
    pub span: Span,
    pub terms: Vec<Term>,
}

/// A signed coefficient times a variable, or a bare constant when `variable` is `None`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    pub variable: Option<String>,
}

impl Term {
    pub fn is_constant(&self) -> bool {
        self.variable.is_none()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Le,
    Ge,
    Eq,
}

impl std::fmt::Display for RelOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelOp::Le => write!(f, "<="),
            RelOp::Ge => write!(f, ">="),
            RelOp::Eq => write!(f, "="),
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Goal::Maximize => write!(f, "maximize"),
            Goal::Minimize => write!(f, "minimize"),
        }
    }
}
