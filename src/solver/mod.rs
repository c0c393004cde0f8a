mod check;
pub(crate) mod compile;
mod monitor;
mod search;
mod stats;
mod types;

pub use check::{Violation, ViolationKind};
pub use monitor::{
    CompositeMonitor, InterruptMonitor, LogMonitor, NodeLimitMonitor, SearchCommand, SearchMonitor,
    TimeLimitMonitor,
};
pub use stats::SearchStatistics;
pub use types::{SearchMode, SolveOutcome, SolveResult, SolverConfig, TerminationReason};

use crate::model::EmployeeId;
use crate::problem::{Problem, ProblemError};
use crate::solution::Solution;
use compile::{CompiledProblem, Value};
use search::SearchEnd;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Solveur : valide, compile puis explore. Sans état entre deux appels.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            interrupt: None,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// La recherche s'arrête dès que `flag` passe à `true`.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn solve(&self, problem: &Problem) -> Result<SolveOutcome, ProblemError> {
        let mut monitor = self.default_monitor();
        self.solve_with_monitor(problem, &mut monitor)
    }

    /// Comme `solve`, avec un moniteur fourni par l'appelant à la place des
    /// limites de la configuration.
    pub fn solve_with_monitor(
        &self,
        problem: &Problem,
        monitor: &mut dyn SearchMonitor,
    ) -> Result<SolveOutcome, ProblemError> {
        problem.validate()?;
        let days = problem.days()?;
        let compiled = compile::compile(problem);
        tracing::info!(
            days = compiled.days,
            employees = compiled.employees,
            variables = compiled.variables(),
            constraints = compiled.constraints.len(),
            mode = %self.config.mode,
            "solve started"
        );

        let run = search::run(&compiled, self.config.mode, monitor);

        let flextime = problem.hard_constraints.as_ref().map(|hc| {
            (
                i64::from(hc.allowed_flextime_per_month) * 60,
                i64::from(hc.allowed_flextime_total) * 60,
            )
        });
        let solution = run
            .best
            .map(|(grid, _)| Solution::from_grid(&compiled, days, &grid, flextime));
        let aborted = matches!(run.end, SearchEnd::Aborted(_));
        let termination_reason = match run.end {
            SearchEnd::Stopped => TerminationReason::FirstSolution,
            SearchEnd::Exhausted => TerminationReason::SearchExhausted,
            SearchEnd::Aborted(reason) => TerminationReason::Aborted(reason),
        };
        let result = match solution {
            Some(solution) => SolveResult::Feasible(solution),
            None if aborted => SolveResult::Unknown,
            None => SolveResult::Infeasible,
        };

        tracing::info!(
            result = %result,
            termination = %termination_reason,
            nodes = run.statistics.nodes_explored,
            elapsed_ms = run.statistics.time_total.as_millis() as u64,
            "solve finished"
        );
        Ok(SolveOutcome::new(result, termination_reason, run.statistics))
    }

    fn default_monitor(&self) -> CompositeMonitor {
        let mut monitor = CompositeMonitor::new();
        if let Some(limit) = self.config.node_limit {
            monitor.add(NodeLimitMonitor::new(limit));
        }
        if let Some(limit) = self.config.time_limit {
            monitor.add(TimeLimitMonitor::with_default_check_interval(limit));
        }
        if let Some(flag) = &self.interrupt {
            monitor.add(InterruptMonitor::new(Arc::clone(flag)));
        }
        if let Some(interval) = self.config.log_interval {
            monitor.add(LogMonitor::new(interval, 4095));
        }
        monitor
    }
}

/// Résolution avec la configuration par défaut (première solution, sans limite).
pub fn solve(problem: &Problem) -> Result<SolveOutcome, ProblemError> {
    Solver::default().solve(problem)
}

/// Revalide une solution (éventuellement relue depuis un fichier) contre un problème.
pub fn check_solution(problem: &Problem, solution: &Solution) -> Result<Vec<Violation>, ProblemError> {
    problem.validate()?;
    let compiled = compile::compile(problem);
    let mut out = Vec::new();
    let grid = solution_grid(&compiled, solution, &mut out);
    out.extend(check::violations(&compiled, &grid));
    Ok(out)
}

/// Projette la solution sur la grille du problème ; les références
/// inconnues sont signalées et traitées comme du repos.
fn solution_grid(c: &CompiledProblem, solution: &Solution, out: &mut Vec<Violation>) -> Vec<Value> {
    let unknown = |day: Option<usize>, employee: Option<EmployeeId>, detail: String| Violation {
        kind: ViolationKind::UnknownReference,
        day: day.map(|d| d as u32),
        employee,
        detail,
    };

    if solution.assignments.len() != c.days {
        out.push(unknown(
            None,
            None,
            format!(
                "solution covers {} days, problem has {}",
                solution.assignments.len(),
                c.days
            ),
        ));
    }
    for id in &solution.employees {
        if !c.employee_ids.contains(id) {
            out.push(unknown(None, Some(id.clone()), "employee not in problem".into()));
        }
    }

    let mut grid = vec![None; c.variables()];
    for (e, id) in c.employee_ids.iter().enumerate() {
        let Some(column) = solution.employees.iter().position(|other| other == id) else {
            out.push(unknown(None, Some(id.clone()), "employee missing from solution".into()));
            continue;
        };
        for (d, row) in solution.assignments.iter().enumerate().take(c.days) {
            let Some(Some(shift)) = row.get(column) else {
                continue;
            };
            match c.shift_ids.iter().position(|s| s == shift) {
                Some(s) => grid[c.var(d, e)] = Some(s),
                None => out.push(unknown(
                    Some(d),
                    Some(id.clone()),
                    format!("unknown shift type {shift}"),
                )),
            }
        }
    }
    grid
}
