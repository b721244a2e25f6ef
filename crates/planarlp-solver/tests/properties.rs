//! Property-based tests for the solving pipeline
//!
//! Problems are drawn with small integer data so that every run stays
//! well inside the solver's tolerance.

use planarlp_solver::{
    Constraint, Problem, Relation, Sense, SolveStatus, Solver, ValidationError, VertexSample, clean, dedup,
};
use proptest::prelude::*;

fn relation_strategy() -> impl Strategy<Value = Relation> {
    prop_oneof![
        Just(Relation::LessOrEqual),
        Just(Relation::GreaterOrEqual),
        Just(Relation::Equal),
    ]
}

fn constraint_strategy() -> impl Strategy<Value = Constraint> {
    (-5i32..=5, -5i32..=5, relation_strategy(), -10i32..=20)
        .prop_map(|(cx, cy, relation, rhs)| Constraint::new(cx as f64, cy as f64, relation, rhs as f64))
}

fn problem_strategy() -> impl Strategy<Value = Problem> {
    (
        -10i32..=10,
        -10i32..=10,
        prop::bool::ANY,
        prop::collection::vec(constraint_strategy(), 1..=5),
    )
        .prop_filter("objective must be non-zero", |(cx, cy, _, _)| *cx != 0 || *cy != 0)
        .prop_map(|(cx, cy, maximize, constraints)| {
            let sense = if maximize { Sense::Maximize } else { Sense::Minimize };
            let mut problem = Problem::new(sense, cx as f64, cy as f64);
            problem.constraints = constraints;
            problem
        })
}

/// Samples drawn from a tiny value set so duplicates are common
fn sample_strategy() -> impl Strategy<Value = VertexSample> {
    (0i32..3, 0i32..3, 0i32..3).prop_map(|(v, x, y)| VertexSample {
        objective_value: v as f64,
        x: x as f64,
        y: y as f64,
    })
}

fn satisfies(constraint: &Constraint, x: f64, y: f64) -> bool {
    let lhs = constraint.coeffs.dot(x, y);
    let slack = 1e-6 * (1.0 + constraint.rhs.abs());
    match constraint.relation {
        Relation::LessOrEqual => lhs <= constraint.rhs + slack,
        Relation::GreaterOrEqual => lhs >= constraint.rhs - slack,
        Relation::Equal => (lhs - constraint.rhs).abs() <= slack,
    }
}

proptest! {
    /// Maximizing c and minimizing -c reach the same vertex with negated values
    #[test]
    fn sign_duality(problem in problem_strategy()) {
        let mut max = problem.clone();
        max.objective.sense = Sense::Maximize;
        let mut min = problem;
        min.objective.sense = Sense::Minimize;
        min.objective.coeffs = -min.objective.coeffs;

        let solver = Solver::new();
        let max_solution = solver.solve(&max);
        let min_solution = solver.solve(&min);

        match (max_solution, min_solution) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(&a.status, &b.status);
                if a.status == SolveStatus::Optimal {
                    prop_assert_eq!((a.x, a.y), (b.x, b.y));
                    prop_assert_eq!(a.objective_value, -b.objective_value);
                }
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "validation differed between senses"),
        }
    }

    /// Optimal vertices satisfy every constraint and the implicit bounds
    #[test]
    fn optimal_vertex_is_feasible(problem in problem_strategy()) {
        let Ok(solution) = Solver::new().solve(&problem) else {
            return Ok(());
        };
        if solution.status == SolveStatus::Optimal {
            prop_assert!(solution.x >= -1e-9 && solution.y >= -1e-9);
            for c in problem.constraints.iter().filter(|c| !c.is_empty()) {
                prop_assert!(satisfies(c, solution.x, solution.y), "{:?} violated at ({}, {})", c, solution.x, solution.y);
            }
        }
    }

    /// The trace improves monotonically and ends at the reported optimum
    #[test]
    fn trace_ends_at_optimum(problem in problem_strategy()) {
        let Ok(solution) = Solver::new().solve(&problem) else {
            return Ok(());
        };
        if solution.status != SolveStatus::Optimal {
            prop_assert!(solution.trace.is_empty());
            return Ok(());
        }

        prop_assert!(!solution.trace.is_empty());
        prop_assert_eq!(solution.trace.iter().filter(|e| e.is_final).count(), 1);

        let last = solution.trace[solution.trace.len() - 1];
        prop_assert!(last.is_final);
        prop_assert!((last.objective_value - solution.objective_value).abs() < 1e-9);

        for (i, pair) in solution.trace.windows(2).enumerate() {
            prop_assert_eq!(pair[0].step_index, i);
            let step = pair[1].objective_value - pair[0].objective_value;
            let improved = match problem.objective.sense {
                Sense::Maximize => step >= -1e-9,
                Sense::Minimize => step <= 1e-9,
            };
            prop_assert!(improved, "objective worsened between steps {} and {}", i, i + 1);
        }
    }

    #[test]
    fn dedup_is_idempotent(samples in prop::collection::vec(sample_strategy(), 0..12)) {
        let once = dedup(&samples);
        prop_assert_eq!(dedup(&once), once.clone());

        let cleaned = clean(&samples, Sense::Minimize);
        let again: Vec<VertexSample> = cleaned.iter().map(|e| e.sample()).collect();
        prop_assert_eq!(clean(&again, Sense::Minimize), cleaned);
    }

    #[test]
    fn empty_objective_always_rejected(
        sense in prop::bool::ANY,
        constraints in prop::collection::vec(constraint_strategy(), 0..5),
    ) {
        let sense = if sense { Sense::Maximize } else { Sense::Minimize };
        let mut problem = Problem::new(sense, 0.0, 0.0);
        problem.constraints = constraints;
        prop_assert_eq!(Solver::new().solve(&problem), Err(ValidationError::EmptyObjective));
    }

    #[test]
    fn all_empty_constraints_rejected(
        rhs in prop::collection::vec(-10i32..10, 1..5),
        relation in relation_strategy(),
    ) {
        let mut problem = Problem::maximize(1.0, 2.0);
        for value in rhs {
            problem.add_constraint(0.0, 0.0, relation, value as f64);
        }
        prop_assert_eq!(Solver::new().solve(&problem), Err(ValidationError::NoValidConstraints));
    }
}
