use crate::problem::{CoefficientPair, Problem, Relation, Sense, ValidationError};

/// One row `cx * x + cy * y (<= | =) rhs` of the standard form
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub coeffs: CoefficientPair,
    pub rhs: f64,
}

/// A problem rewritten as a minimization with every inequality oriented `<=`
#[derive(Debug, Clone, PartialEq)]
pub struct StandardProblem {
    /// Minimization target (negated when the caller asked to maximize)
    pub objective: CoefficientPair,
    /// Sense of the original objective, used to restore signs on output
    pub sense: Sense,
    pub inequalities: Vec<Row>,
    pub equalities: Vec<Row>,
}

impl StandardProblem {
    pub fn num_rows(&self) -> usize {
        self.inequalities.len() + self.equalities.len()
    }
}

/// Normalize a caller's problem into standard form
pub fn transform(problem: &Problem) -> Result<StandardProblem, ValidationError> {
    let objective = &problem.objective;
    if objective.coeffs.is_zero() {
        return Err(ValidationError::EmptyObjective);
    }
    if !objective.coeffs.is_finite() {
        return Err(ValidationError::NonFiniteValue {
            field: "objective".to_string(),
        });
    }

    let mut inequalities = Vec::new();
    let mut equalities = Vec::new();

    for (i, c) in problem.constraints.iter().enumerate() {
        if c.is_empty() {
            continue;
        }
        if !c.coeffs.is_finite() || !c.rhs.is_finite() {
            return Err(ValidationError::NonFiniteValue {
                field: format!("constraint {}", i + 1),
            });
        }

        match c.relation {
            Relation::LessOrEqual => inequalities.push(Row {
                coeffs: c.coeffs,
                rhs: c.rhs,
            }),
            Relation::GreaterOrEqual => inequalities.push(Row {
                coeffs: -c.coeffs,
                rhs: -c.rhs,
            }),
            Relation::Equal => equalities.push(Row {
                coeffs: c.coeffs,
                rhs: c.rhs,
            }),
        }
    }

    if inequalities.is_empty() && equalities.is_empty() {
        return Err(ValidationError::NoValidConstraints);
    }

    let target = match objective.sense {
        Sense::Maximize => -objective.coeffs,
        Sense::Minimize => objective.coeffs,
    };

    Ok(StandardProblem {
        objective: target,
        sense: objective.sense,
        inequalities,
        equalities,
    })
}
