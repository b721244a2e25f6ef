use planarlp_solver::{CoefficientPair, Constraint, Objective, Problem, Relation, Sense};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::Span;
use crate::parser::ParseError;
use crate::Parser;

/// Most constraints a problem may declare
pub const MAX_CONSTRAINTS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Missing objective: expected a `maximize` or `minimize` line")]
    MissingObjective,
    #[error("Objective declared twice, second declaration at position {0:?}")]
    DuplicateObjective(Span),
    #[error("Unknown variable '{name}' at position {span:?}: only x and y are supported")]
    UnknownVariable { name: String, span: Span },
    #[error("Constant term not allowed in objective at position {0:?}")]
    ConstantInObjective(Span),
    #[error("Too many constraints: {count} given, at most {max} allowed")]
    TooManyConstraints { count: usize, max: usize },
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// Compiler for turning a parsed program into a solver [`Problem`]
pub struct Compiler {
    max_constraints: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            max_constraints: MAX_CONSTRAINTS,
        }
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_constraints(mut self, max: usize) -> Self {
        self.max_constraints = max;
        self
    }

    /// Parse and compile in one step
    pub fn compile_source(&self, source: &str) -> Result<Problem, CompileError> {
        let program = Parser::parse(source)?;
        self.compile(&program)
    }

    pub fn compile(&self, program: &Program) -> Result<Problem, CompileError> {
        let mut objective: Option<Objective> = None;
        let mut constraints = Vec::new();

        for item in &program.items {
            match item {
                Item::Objective(decl) => {
                    if objective.is_some() {
                        return Err(CompileError::DuplicateObjective(decl.span));
                    }
                    objective = Some(self.compile_objective(decl)?);
                }
                Item::Constraint(decl) => constraints.push(self.compile_constraint(decl)?),
            }
        }

        let objective = objective.ok_or(CompileError::MissingObjective)?;
        let problem = Problem {
            objective,
            constraints,
        };
        self.check_limits(&problem)?;
        Ok(problem)
    }

    /// Enforce the constraint cap on a problem built by any means, such as JSON
    pub fn check_limits(&self, problem: &Problem) -> Result<(), CompileError> {
        let count = problem.num_constraints();
        if count > self.max_constraints {
            return Err(CompileError::TooManyConstraints {
                count,
                max: self.max_constraints,
            });
        }
        Ok(())
    }

    fn compile_objective(&self, decl: &ObjectiveDecl) -> Result<Objective, CompileError> {
        if let Some(constant) = decl.expr.terms.iter().find(|t| t.is_constant()) {
            return Err(CompileError::ConstantInObjective(constant.span));
        }
        let (coeffs, _) = collect(&decl.expr)?;
        let sense = match decl.goal {
            Goal::Maximize => Sense::Maximize,
            Goal::Minimize => Sense::Minimize,
        };
        Ok(Objective { sense, coeffs })
    }

    /// Move variables to the left and constants to the right
    fn compile_constraint(&self, decl: &ConstraintDecl) -> Result<Constraint, CompileError> {
        let (left, left_constant) = collect(&decl.lhs)?;
        let (right, right_constant) = collect(&decl.rhs)?;

        let relation = match decl.op {
            RelOp::Le => Relation::LessOrEqual,
            RelOp::Ge => Relation::GreaterOrEqual,
            RelOp::Eq => Relation::Equal,
        };

        Ok(Constraint {
            coeffs: CoefficientPair::new(left.cx - right.cx, left.cy - right.cy),
            relation,
            rhs: right_constant - left_constant,
        })
    }
}

/// Sum the terms of an expression into `x`/`y` coefficients and a constant
fn collect(expr: &LinearExpr) -> Result<(CoefficientPair, f64), CompileError> {
    let mut coeffs = CoefficientPair::default();
    let mut constant = 0.0;

    for term in &expr.terms {
        match term.variable.as_deref() {
            None => constant += term.coefficient,
            Some(name) if name.eq_ignore_ascii_case("x") => coeffs.cx += term.coefficient,
            Some(name) if name.eq_ignore_ascii_case("y") => coeffs.cy += term.coefficient,
            Some(name) => {
                return Err(CompileError::UnknownVariable {
                    name: name.to_string(),
                    span: term.span,
                });
            }
        }
    }

    Ok((coeffs, constant))
}
