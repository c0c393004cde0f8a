use super::stats::SearchStatistics;
use crate::solution::Objective;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Commande renvoyée par un moniteur à chaque pas de recherche.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    Continue,
    Terminate(String),
}

/// Observe et contrôle la recherche (budgets, annulation, traces).
pub trait SearchMonitor: Send {
    fn name(&self) -> &str;

    /// Appelé une fois avant la boucle de recherche.
    fn on_enter_search(&mut self, _variables: usize) {}

    /// Appelé à chaque pas (propagation ou branchement).
    fn check_termination(&mut self, _stats: &SearchStatistics) -> SearchCommand {
        SearchCommand::Continue
    }

    fn on_solution(&mut self, _objective: &Objective, _stats: &SearchStatistics) {}

    fn on_backtrack(&mut self, _stats: &SearchStatistics) {}

    fn on_exit_search(&mut self, _stats: &SearchStatistics) {}
}

impl std::fmt::Debug for dyn SearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

/// Arrête la recherche après un nombre de nœuds explorés.
#[derive(Debug, Clone)]
pub struct NodeLimitMonitor {
    limit: u64,
}

impl NodeLimitMonitor {
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }
}

impl SearchMonitor for NodeLimitMonitor {
    fn name(&self) -> &str {
        "NodeLimitMonitor"
    }

    fn check_termination(&mut self, stats: &SearchStatistics) -> SearchCommand {
        if stats.nodes_explored >= self.limit {
            SearchCommand::Terminate(format!("node limit of {} reached", self.limit))
        } else {
            SearchCommand::Continue
        }
    }
}

/// Arrête la recherche après une durée donnée.
///
/// L'horloge n'est lue que tous les `check_interval` pas.
#[derive(Debug, Clone)]
pub struct TimeLimitMonitor {
    time_limit: Duration,
    start_time: Option<Instant>,
    check_interval: u64,
    ops_since_last_check: u64,
}

impl TimeLimitMonitor {
    pub fn new(time_limit: Duration, check_interval: u64) -> Self {
        Self {
            time_limit,
            start_time: None,
            check_interval: check_interval.max(1),
            ops_since_last_check: 0,
        }
    }

    pub fn with_default_check_interval(time_limit: Duration) -> Self {
        Self::new(time_limit, 1_024)
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _variables: usize) {
        self.start_time = Some(Instant::now());
        self.ops_since_last_check = 0;
    }

    fn check_termination(&mut self, _stats: &SearchStatistics) -> SearchCommand {
        self.ops_since_last_check = self.ops_since_last_check.saturating_add(1);
        if self.ops_since_last_check < self.check_interval {
            return SearchCommand::Continue;
        }
        self.ops_since_last_check = 0;

        match self.start_time {
            Some(start) if start.elapsed() > self.time_limit => SearchCommand::Terminate(format!(
                "time limit of {:.3}s exceeded",
                self.time_limit.as_secs_f64()
            )),
            _ => SearchCommand::Continue,
        }
    }

    fn on_exit_search(&mut self, _stats: &SearchStatistics) {
        self.start_time = None;
    }
}

/// Arrête la recherche quand le drapeau partagé passe à `true`.
#[derive(Debug, Clone)]
pub struct InterruptMonitor {
    stop_flag: Arc<AtomicBool>,
}

impl InterruptMonitor {
    pub fn new(stop_flag: Arc<AtomicBool>) -> Self {
        Self { stop_flag }
    }
}

impl SearchMonitor for InterruptMonitor {
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn check_termination(&mut self, _stats: &SearchStatistics) -> SearchCommand {
        if self.stop_flag.load(Ordering::Relaxed) {
            SearchCommand::Terminate("interrupt signal received".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}

/// Trace périodiquement l'avancement via `tracing`.
#[derive(Debug, Clone)]
pub struct LogMonitor {
    log_interval: Duration,
    clock_check_mask: u64,
    steps: u64,
    last_log_time: Instant,
    best: Option<Objective>,
}

impl LogMonitor {
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            log_interval,
            clock_check_mask,
            steps: 0,
            last_log_time: Instant::now(),
            best: None,
        }
    }
}

impl Default for LogMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl SearchMonitor for LogMonitor {
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&mut self, variables: usize) {
        self.steps = 0;
        self.best = None;
        self.last_log_time = Instant::now();
        tracing::info!(variables, "search started");
    }

    fn check_termination(&mut self, stats: &SearchStatistics) -> SearchCommand {
        self.steps = self.steps.wrapping_add(1);
        if self.steps & self.clock_check_mask == 0 && self.last_log_time.elapsed() >= self.log_interval
        {
            self.last_log_time = Instant::now();
            tracing::info!(
                nodes = stats.nodes_explored,
                depth = stats.max_depth,
                backtracks = stats.backtracks,
                prunings = stats.prunings_total(),
                best = ?self.best,
                "search progress"
            );
        }
        SearchCommand::Continue
    }

    fn on_solution(&mut self, objective: &Objective, stats: &SearchStatistics) {
        self.best = Some(*objective);
        tracing::info!(
            deviation_minutes = objective.deviation_minutes,
            avoided_days = objective.avoided_days,
            nodes = stats.nodes_explored,
            "solution found"
        );
    }

    fn on_exit_search(&mut self, stats: &SearchStatistics) {
        tracing::info!(
            nodes = stats.nodes_explored,
            solutions = stats.solutions_found,
            "search finished"
        );
    }
}

/// Combine plusieurs moniteurs ; le premier `Terminate` l'emporte.
#[derive(Debug, Default)]
pub struct CompositeMonitor {
    monitors: Vec<Box<dyn SearchMonitor>>,
}

impl CompositeMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<M: SearchMonitor + 'static>(&mut self, monitor: M) {
        self.monitors.push(Box::new(monitor));
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl SearchMonitor for CompositeMonitor {
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    fn on_enter_search(&mut self, variables: usize) {
        for m in &mut self.monitors {
            m.on_enter_search(variables);
        }
    }

    fn check_termination(&mut self, stats: &SearchStatistics) -> SearchCommand {
        for m in &mut self.monitors {
            if let SearchCommand::Terminate(reason) = m.check_termination(stats) {
                return SearchCommand::Terminate(reason);
            }
        }
        SearchCommand::Continue
    }

    fn on_solution(&mut self, objective: &Objective, stats: &SearchStatistics) {
        for m in &mut self.monitors {
            m.on_solution(objective, stats);
        }
    }

    fn on_backtrack(&mut self, stats: &SearchStatistics) {
        for m in &mut self.monitors {
            m.on_backtrack(stats);
        }
    }

    fn on_exit_search(&mut self, stats: &SearchStatistics) {
        for m in &mut self.monitors {
            m.on_exit_search(stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_limit_terminates_at_limit() {
        let mut monitor = NodeLimitMonitor::new(3);
        let mut stats = SearchStatistics::default();
        stats.nodes_explored = 2;
        assert_eq!(monitor.check_termination(&stats), SearchCommand::Continue);
        stats.nodes_explored = 3;
        assert_eq!(
            monitor.check_termination(&stats),
            SearchCommand::Terminate("node limit of 3 reached".into())
        );
    }

    #[test]
    fn interrupt_follows_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut monitor = InterruptMonitor::new(Arc::clone(&flag));
        let stats = SearchStatistics::default();
        assert_eq!(monitor.check_termination(&stats), SearchCommand::Continue);
        flag.store(true, Ordering::Relaxed);
        assert!(matches!(
            monitor.check_termination(&stats),
            SearchCommand::Terminate(_)
        ));
    }

    #[test]
    fn zero_time_limit_fires_on_first_clock_check() {
        let mut monitor = TimeLimitMonitor::new(Duration::ZERO, 1);
        monitor.on_enter_search(1);
        std::thread::sleep(Duration::from_millis(2));
        let stats = SearchStatistics::default();
        assert!(matches!(
            monitor.check_termination(&stats),
            SearchCommand::Terminate(_)
        ));
    }

    #[test]
    fn composite_returns_first_termination() {
        let mut composite = CompositeMonitor::new();
        composite.add(LogMonitor::default());
        composite.add(NodeLimitMonitor::new(0));
        assert_eq!(composite.len(), 2);
        let stats = SearchStatistics::default();
        assert_eq!(
            composite.check_termination(&stats),
            SearchCommand::Terminate("node limit of 0 reached".into())
        );
    }
}
