use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use planarlp_lang::Compiler;
use planarlp_solver::{PivotRule, Problem, Relation, Sense, Solution, SolveStatus, Solver};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "planarlp")]
#[command(about = "Solve two-variable linear programs and show the simplex path", long_about = None)]
struct Cli {
    /// Log more detail to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem and output the optimal vertex with its iteration history
    Solve {
        /// The problem file (.json for a serialized problem, text otherwise)
        file: PathBuf,
        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Maximum simplex pivots before giving up
        #[arg(long, default_value_t = 1000)]
        max_iterations: usize,
        /// Tolerance for floating point comparisons
        #[arg(long, default_value_t = 1e-9, value_parser = parse_tolerance)]
        tolerance: f64,
        /// Use Bland's rule instead of the most negative reduced cost
        #[arg(long)]
        bland: bool,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Parse a text problem file and output the syntax tree
    Parse {
        /// The file to parse
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            file,
            format,
            max_iterations,
            tolerance,
            bland,
        } => {
            let problem = load_problem(&file);

            let rule = if bland { PivotRule::Bland } else { PivotRule::MostNegative };
            let solver = Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance)
                .with_pivot_rule(rule);

            let solution = match solver.solve(&problem) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Validation error: {}", e);
                    std::process::exit(1);
                }
            };

            if format == "json" {
                match serde_json::to_string_pretty(&solution.rounded(3)) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing solution: {}", e);
                        std::process::exit(1);
                    }
                }
                if !solution.status.is_optimal() {
                    std::process::exit(1);
                }
            } else {
                print_solution(&solution, problem.objective.sense);
            }
        }
        Commands::Check { file } => {
            let problem = load_problem(&file);

            if let Err(e) = planarlp_solver::transform(&problem) {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }

            let count = |relation: Relation| {
                problem
                    .constraints
                    .iter()
                    .filter(|c| !c.is_empty() && c.relation == relation)
                    .count()
            };
            let empty = problem.constraints.iter().filter(|c| c.is_empty()).count();

            let objective = &problem.objective;
            println!("✓ {} is valid", file.display());
            println!(
                "  objective: {} {}x {:+}y",
                objective.sense, objective.coeffs.cx, objective.coeffs.cy
            );
            println!("  {} <= constraints", count(Relation::LessOrEqual));
            println!("  {} >= constraints", count(Relation::GreaterOrEqual));
            println!("  {} = constraints", count(Relation::Equal));
            if empty > 0 {
                println!("  {} empty constraints (ignored)", empty);
            }
        }
        Commands::Parse { file, format } => {
            let source = read_source(&file);

            match planarlp_lang::Parser::parse(&source) {
                Ok(program) => {
                    if format == "json" {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&program)
                                .unwrap_or_else(|e| format!("Error serializing syntax tree: {}", e))
                        );
                    } else {
                        println!("{:#?}", program);
                    }
                }
                Err(e) => {
                    eprintln!("Parse error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tol: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if tol.is_finite() && tol > 0.0 {
        Ok(tol)
    } else {
        Err(format!("tolerance must be a positive finite number, got {}", s))
    }
}

fn read_source(file: &Path) -> String {
    match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Read a problem as JSON or as the text format, depending on the extension
fn load_problem(file: &Path) -> Problem {
    let source = read_source(file);
    let is_json = file.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let problem: Problem = match serde_json::from_str(&source) {
            Ok(problem) => problem,
            Err(e) => {
                eprintln!("Invalid problem JSON: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = Compiler::new().check_limits(&problem) {
            eprintln!("Invalid problem: {}", e);
            std::process::exit(1);
        }
        problem
    } else {
        match Compiler::new().compile_source(&source) {
            Ok(problem) => problem,
            Err(e) => {
                eprintln!("Compile error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn print_solution(solution: &Solution, sense: Sense) {
    let shown = solution.rounded(3);

    match &shown.status {
        SolveStatus::Optimal => {
            println!("Status: OPTIMAL");
            println!("Optimal {} Z: {:.3}", sense, shown.objective_value);
            println!("Final X value: {:.3}", shown.x);
            println!("Final Y value: {:.3}", shown.y);
            println!();

            if shown.trace.len() <= 1 {
                println!("The starting vertex is already optimal (0 iterations required).");
            }
            println!("Iteration history ({} pivots):", shown.pivots);
            println!("  {:>6} {:>20} {:>14} {:>14}", "Step", "Objective Value (Z)", "X Position", "Y Position");
            for entry in &shown.trace {
                let marker = if entry.is_final { "*" } else { " " };
                println!(
                    "{} {:>6} {:>20.3} {:>14.3} {:>14.3}",
                    marker, entry.step_index, entry.objective_value, entry.x, entry.y
                );
            }
        }
        SolveStatus::Infeasible => {
            println!("Status: INFEASIBLE");
            println!("No point satisfies all constraints.");
            std::process::exit(1);
        }
        SolveStatus::Unbounded => {
            println!("Status: UNBOUNDED");
            println!("The objective can improve without limit.");
            std::process::exit(1);
        }
        SolveStatus::NumericalError(msg) => {
            println!("Status: ERROR");
            println!("Solver encountered a numerical error: {}", msg);
            std::process::exit(1);
        }
    }
}
