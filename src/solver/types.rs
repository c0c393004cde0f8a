use super::stats::SearchStatistics;
use crate::solution::Solution;
use std::fmt;
use std::time::Duration;

/// Stratégie de recherche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// S'arrête à la première affectation réalisable.
    #[default]
    FirstFeasible,
    /// Continue tant qu'une affectation strictement meilleure peut exister
    /// (ou jusqu'à épuisement du budget).
    Improve,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::FirstFeasible => f.write_str("first-feasible"),
            SearchMode::Improve => f.write_str("improve"),
        }
    }
}

/// Options de résolution
#[derive(Debug, Clone, Copy, Default)]
pub struct SolverConfig {
    pub mode: SearchMode,
    pub node_limit: Option<u64>,
    pub time_limit: Option<Duration>,
    /// Intervalle des traces de progression (aucune si `None`).
    pub log_interval: Option<Duration>,
}

impl SolverConfig {
    pub fn improve() -> Self {
        Self {
            mode: SearchMode::Improve,
            ..Self::default()
        }
    }

    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// Issue de la recherche.
#[derive(Debug, Clone)]
pub enum SolveResult {
    /// Une affectation respectant toutes les contraintes dures.
    Feasible(Solution),
    /// Aucune affectation n'existe (prouvé par épuisement de l'arbre).
    Infeasible,
    /// Budget épuisé avant de trouver une affectation ou de prouver l'infaisabilité.
    Unknown,
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveResult::Feasible(solution) => write!(
                f,
                "Feasible(deviation={}min, avoided={})",
                solution.objective.deviation_minutes, solution.objective.avoided_days
            ),
            SolveResult::Infeasible => f.write_str("Infeasible"),
            SolveResult::Unknown => f.write_str("Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// Arrêt sur la première solution (mode `FirstFeasible`).
    FirstSolution,
    /// Arbre entièrement exploré : infaisabilité prouvée, ou meilleure solution prouvée.
    SearchExhausted,
    /// Interrompu par un moniteur (limite de nœuds, de temps, signal).
    Aborted(String),
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::FirstSolution => f.write_str("First solution"),
            TerminationReason::SearchExhausted => f.write_str("Search exhausted"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {reason}"),
        }
    }
}

/// Résultat complet d'une résolution.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    result: SolveResult,
    termination_reason: TerminationReason,
    statistics: SearchStatistics,
}

impl SolveOutcome {
    pub(crate) fn new(
        result: SolveResult,
        termination_reason: TerminationReason,
        statistics: SearchStatistics,
    ) -> Self {
        Self {
            result,
            termination_reason,
            statistics,
        }
    }

    pub fn result(&self) -> &SolveResult {
        &self.result
    }

    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.result {
            SolveResult::Feasible(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self.result {
            SolveResult::Feasible(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self.result, SolveResult::Feasible(_))
    }

    /// Infaisabilité prouvée (et non simple budget épuisé).
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolveResult::Infeasible)
    }

    pub fn is_budget_exhausted(&self) -> bool {
        matches!(self.termination_reason, TerminationReason::Aborted(_))
    }
}
