#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use shiftplan::{io, SearchMode, SolveResult, Solver, SolverConfig};
use std::time::Duration;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI d'affectation des services (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du problème
    #[arg(long, global = true, default_value = "problem.json")]
    problem: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    First,
    Improve,
}

impl From<Mode> for SearchMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::First => SearchMode::FirstFeasible,
            Mode::Improve => SearchMode::Improve,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Résoudre le problème et exporter la solution
    Solve {
        /// Employés supplémentaires (CSV), ajoutés à ceux du problème
        #[arg(long)]
        employees: Option<String>,
        #[arg(long, value_enum, default_value_t = Mode::First)]
        mode: Mode,
        #[arg(long)]
        node_limit: Option<u64>,
        #[arg(long)]
        time_limit_secs: Option<u64>,
        /// Intervalle des traces de progression (secondes)
        #[arg(long)]
        progress_secs: Option<u64>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
        /// Affiche les statistiques de recherche
        #[arg(long)]
        stats: bool,
    },

    /// Vérifier une solution existante
    Check {
        #[arg(long)]
        solution: String,
        /// Export CSV des violations (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Afficher le calendrier de la période
    Days,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    }

    let mut problem = io::load_problem_json(&cli.problem)?;

    let code = match cli.cmd {
        Commands::Solve {
            employees,
            mode,
            node_limit,
            time_limit_secs,
            progress_secs,
            out_json,
            out_csv,
            stats,
        } => {
            if let Some(path) = employees {
                let imported = io::import_employees_csv(&path)
                    .with_context(|| format!("importing employees from {path}"))?;
                problem.employees.extend(imported);
            }
            let config = SolverConfig {
                mode: mode.into(),
                node_limit,
                time_limit: time_limit_secs.map(Duration::from_secs),
                log_interval: progress_secs.map(Duration::from_secs),
            };
            let outcome = Solver::new(config).solve(&problem)?;
            if stats {
                eprint!("{}", outcome.statistics());
            }
            match outcome.result() {
                SolveResult::Feasible(solution) => {
                    println!(
                        "FEASIBLE ({}): deviation {}min, {} avoided day(s) worked",
                        outcome.termination_reason(),
                        solution.objective.deviation_minutes,
                        solution.objective.avoided_days
                    );
                    for s in &solution.summaries {
                        println!(
                            "{} | {:.1}h (target {:.1}h) | {} shift(s), {} weekend, {} holiday",
                            s.employee,
                            s.realized_hours(),
                            s.target_minutes as f64 / 60.0,
                            s.shifts_worked,
                            s.weekend_shifts,
                            s.holiday_shifts
                        );
                    }
                    for b in &solution.flextime_breaches {
                        eprintln!(
                            "flextime: {} drifts {}min ({:?}, allowed {}min)",
                            b.employee, b.drift_minutes, b.scope, b.allowed_minutes
                        );
                    }
                    if let Some(path) = out_json {
                        io::export_solution_json(path, solution)?;
                    }
                    if let Some(path) = out_csv {
                        io::export_solution_csv(path, &problem, solution)?;
                    }
                    0
                }
                SolveResult::Infeasible => {
                    eprintln!("INFEASIBLE: no assignment satisfies the hard constraints");
                    2
                }
                SolveResult::Unknown => {
                    eprintln!("UNKNOWN: {}", outcome.termination_reason());
                    // Code 3 = budget épuisé sans solution
                    3
                }
            }
        }
        Commands::Check { solution, report } => {
            let solution = io::load_solution_json(&solution)?;
            let violations = shiftplan::check_solution(&problem, &solution)?;
            if violations.is_empty() {
                println!("OK: no violations");
                0
            } else {
                eprintln!("Found {} violation(s)", violations.len());
                for v in &violations {
                    eprintln!(
                        "{} | day {} | {} | {}",
                        v.kind.as_str(),
                        v.day.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                        v.employee.as_ref().map(|e| e.as_str()).unwrap_or("-"),
                        v.detail
                    );
                }
                if let Some(path) = report {
                    io::export_violations_csv(path, &violations)?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Days => {
            for day in problem.days()? {
                let mut flags = Vec::new();
                if day.is_weekend {
                    flags.push("weekend");
                }
                if day.is_holiday {
                    flags.push("holiday");
                }
                println!("{} | {} | {}", day.index, day.name, flags.join(","));
            }
            0
        }
    };

    std::process::exit(code);
}
