use std::fmt;
use std::time::Duration;

/// Motif d'élagage d'une valeur candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prune {
    Rest,
    Hours,
    Rules,
    Staffing,
    Capacity,
    Bound,
}

/// Compteurs collectés pendant la recherche.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    pub nodes_explored: u64,
    pub backtracks: u64,
    pub max_depth: u64,
    pub solutions_found: u64,
    pub prunings_rest: u64,
    pub prunings_hours: u64,
    pub prunings_rules: u64,
    pub prunings_staffing: u64,
    pub prunings_capacity: u64,
    pub prunings_bound: u64,
    pub time_total: Duration,
}

impl SearchStatistics {
    #[inline]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    #[inline]
    pub fn on_backtrack(&mut self) {
        self.backtracks = self.backtracks.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub(crate) fn on_pruning(&mut self, reason: Prune) {
        let counter = match reason {
            Prune::Rest => &mut self.prunings_rest,
            Prune::Hours => &mut self.prunings_hours,
            Prune::Rules => &mut self.prunings_rules,
            Prune::Staffing => &mut self.prunings_staffing,
            Prune::Capacity => &mut self.prunings_capacity,
            Prune::Bound => &mut self.prunings_bound,
        };
        *counter = counter.saturating_add(1);
    }

    pub fn prunings_total(&self) -> u64 {
        self.prunings_rest
            .saturating_add(self.prunings_hours)
            .saturating_add(self.prunings_rules)
            .saturating_add(self.prunings_staffing)
            .saturating_add(self.prunings_capacity)
            .saturating_add(self.prunings_bound)
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search statistics:")?;
        writeln!(f, "  Nodes explored:        {}", self.nodes_explored)?;
        writeln!(f, "  Backtracks:            {}", self.backtracks)?;
        writeln!(f, "  Max depth reached:     {}", self.max_depth)?;
        writeln!(f, "  Solutions found:       {}", self.solutions_found)?;
        writeln!(f, "  Prunings (rest):       {}", self.prunings_rest)?;
        writeln!(f, "  Prunings (hours):      {}", self.prunings_hours)?;
        writeln!(f, "  Prunings (rules):      {}", self.prunings_rules)?;
        writeln!(f, "  Prunings (staffing):   {}", self.prunings_staffing)?;
        writeln!(f, "  Prunings (capacity):   {}", self.prunings_capacity)?;
        writeln!(f, "  Prunings (bound):      {}", self.prunings_bound)?;
        writeln!(f, "  Total time:            {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pruning_counters_are_routed_by_reason() {
        let mut stats = SearchStatistics::default();
        stats.on_pruning(Prune::Staffing);
        stats.on_pruning(Prune::Staffing);
        stats.on_pruning(Prune::Bound);
        assert_eq!(stats.prunings_staffing, 2);
        assert_eq!(stats.prunings_bound, 1);
        assert_eq!(stats.prunings_total(), 3);
    }

    #[test]
    fn depth_keeps_maximum() {
        let mut stats = SearchStatistics::default();
        stats.on_depth_update(5);
        stats.on_depth_update(3);
        assert_eq!(stats.max_depth, 5);
    }
}
