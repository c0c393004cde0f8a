//! Recherche en profondeur d'abord sur une pile de décisions explicite.
//!
//! Chaque valeur candidate passe par `admissible` avant d'être liée ; les
//! compteurs incrémentaux (minutes, jours travaillés, effectifs affectés)
//! sont mis à jour par `bind` et restaurés par `unbind` au retour arrière.

use super::check;
use super::compile::{CompiledProblem, Value};
use super::monitor::{SearchCommand, SearchMonitor};
use super::stats::{Prune, SearchStatistics};
use super::types::SearchMode;
use crate::solution::Objective;
use std::cmp::Ordering;
use std::time::Instant;

/// Cause de fin de la boucle de recherche.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SearchEnd {
    /// Arbre entièrement parcouru.
    Exhausted,
    /// Première solution atteinte en mode `FirstFeasible`.
    Stopped,
    Aborted(String),
}

#[derive(Debug)]
pub(crate) struct SearchRun {
    pub end: SearchEnd,
    pub best: Option<(Vec<Value>, Objective)>,
    pub statistics: SearchStatistics,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    var: usize,
    cursor: usize,
}

pub(crate) fn run(c: &CompiledProblem, mode: SearchMode, monitor: &mut dyn SearchMonitor) -> SearchRun {
    let start = Instant::now();
    let mut statistics = SearchStatistics::default();
    let mut best = None;
    monitor.on_enter_search(c.variables());

    let mut state = SearchState::new(c);
    let end = match state.root_infeasibility() {
        Some(reason) => {
            tracing::debug!(%reason, "infeasible before branching");
            SearchEnd::Exhausted
        }
        None => state.explore(mode, monitor, &mut statistics, &mut best),
    };

    statistics.set_total_time(start.elapsed());
    monitor.on_exit_search(&statistics);
    SearchRun {
        end,
        best,
        statistics,
    }
}

struct SearchState<'a> {
    c: &'a CompiledProblem,
    grid: Vec<Value>,
    /// `[employé]`
    minutes: Vec<i64>,
    /// `[employé]`
    worked: Vec<u32>,
    /// `[employé]` : jours travaillés d'affilée jusqu'au dernier jour lié.
    streak: Vec<u32>,
    /// `[variable]` : série de l'employé avant la liaison, restaurée par `unbind`.
    saved_streak: Vec<u32>,
    /// `[jour][exigence]`
    assigned: Vec<Vec<u32>>,
    avoided: u32,
}

impl<'a> SearchState<'a> {
    fn new(c: &'a CompiledProblem) -> Self {
        Self {
            c,
            grid: vec![None; c.variables()],
            minutes: vec![0; c.employees],
            worked: vec![0; c.employees],
            streak: vec![0; c.employees],
            saved_streak: vec![0; c.variables()],
            assigned: c.requirements.iter().map(|r| vec![0; r.len()]).collect(),
            avoided: 0,
        }
    }

    /// Échecs détectables sans brancher.
    fn root_infeasibility(&self) -> Option<String> {
        let c = self.c;
        for d in 0..c.days {
            for (ri, r) in c.requirements[d].iter().enumerate() {
                let candidates = c.candidates_after[d][ri][0];
                if candidates < r.min {
                    return Some(format!(
                        "day {d}: {} needs {} employees, {candidates} eligible",
                        c.shift_ids[r.shift], r.min
                    ));
                }
            }
            for g in &c.groups[d] {
                let needed = c.requirements[d][g.requirements.clone()]
                    .iter()
                    .map(|r| r.min)
                    .fold(0, u32::saturating_add);
                if needed > g.available_after[0] {
                    return Some(format!(
                        "day {d}: {needed} employees needed in one group, {} available",
                        g.available_after[0]
                    ));
                }
            }
        }
        for e in 0..c.employees {
            if c.future_max_minutes(e, 0, 0, 0) < c.min_minutes[e] {
                return Some(format!(
                    "employee {} cannot reach its minimum hours",
                    c.employee_ids[e]
                ));
            }
        }
        let capacity: u32 = (0..c.employees)
            .map(|e| c.shift_capacity(e, 0, 0, 0, 0))
            .fold(0, u32::saturating_add);
        if capacity < c.bodies_from[0] {
            return Some(format!(
                "{} shifts needed over the period, capacity is {capacity}",
                c.bodies_from[0]
            ));
        }
        None
    }

    fn explore(
        &mut self,
        mode: SearchMode,
        monitor: &mut dyn SearchMonitor,
        stats: &mut SearchStatistics,
        best: &mut Option<(Vec<Value>, Objective)>,
    ) -> SearchEnd {
        let c = self.c;
        let n = c.variables();
        let mut stack = vec![Frame { var: 0, cursor: 0 }];

        loop {
            if let SearchCommand::Terminate(reason) = monitor.check_termination(stats) {
                return SearchEnd::Aborted(reason);
            }
            let Some(top) = stack.last_mut() else {
                return SearchEnd::Exhausted;
            };
            let var = top.var;

            if var == n {
                stack.pop();
                let violations = check::violations(c, &self.grid);
                assert!(
                    violations.is_empty(),
                    "search reached an invalid assignment: {violations:?}"
                );
                let objective = Objective::evaluate(c, &self.grid);
                stats.on_solution_found();
                if best.as_ref().map_or(true, |(_, o)| objective < *o) {
                    tracing::debug!(?objective, nodes = stats.nodes_explored, "improved solution");
                    monitor.on_solution(&objective, stats);
                    *best = Some((self.grid.clone(), objective));
                }
                if mode == SearchMode::FirstFeasible {
                    return SearchEnd::Stopped;
                }
                if n > 0 {
                    self.unbind(n - 1);
                }
                continue;
            }

            let domain = &c.domains[var];
            if top.cursor < domain.len() {
                let value = domain[top.cursor];
                top.cursor += 1;
                stats.on_node_explored();
                let incumbent = best.as_ref().map(|(_, o)| o);
                match self.admissible(var, value, incumbent) {
                    Ok(()) => {
                        self.bind(var, value);
                        stats.on_depth_update(var as u64 + 1);
                        stack.push(Frame {
                            var: var + 1,
                            cursor: 0,
                        });
                    }
                    Err(reason) => stats.on_pruning(reason),
                }
            } else {
                stack.pop();
                if var > 0 {
                    self.unbind(var - 1);
                }
                stats.on_backtrack();
                monitor.on_backtrack(stats);
            }
        }
    }

    fn admissible(&self, var: usize, value: Value, incumbent: Option<&Objective>) -> Result<(), Prune> {
        let c = self.c;
        let d = var / c.employees;
        let e = var % c.employees;

        let (next_minutes, next_worked, next_streak) = match value {
            Some(s) => (self.minutes[e] + c.durations[s], self.worked[e] + 1, self.streak[e] + 1),
            None => (self.minutes[e], self.worked[e], 0),
        };

        if let Some(s) = value {
            if d > 0 {
                if let Some(previous) = self.grid[var - c.employees] {
                    if c.is_forbidden(previous, s) {
                        return Err(Prune::Rest);
                    }
                }
            }
            if next_minutes > c.max_minutes[e] {
                return Err(Prune::Hours);
            }
            if c.max_consecutive.is_some_and(|max| next_streak > max) {
                return Err(Prune::Rules);
            }
            if next_worked > c.work_day_cap {
                return Err(Prune::Rules);
            }
        }

        if next_minutes + c.future_max_minutes(e, d + 1, next_worked, next_streak) < c.min_minutes[e] {
            return Err(Prune::Hours);
        }

        self.staffing_reachable(d, e, value)?;
        self.next_day_reachable(d, e, next_minutes, next_streak)?;
        self.capacity_sufficient(d, e, next_minutes, next_worked, next_streak)?;

        if let Some(incumbent) = incumbent {
            if self.lower_bound(var, value, (next_minutes, next_worked, next_streak)) >= *incumbent {
                return Err(Prune::Bound);
            }
        }
        Ok(())
    }

    /// Chaque exigence du jour reste atteignable avec les employés suivants.
    fn staffing_reachable(&self, d: usize, e: usize, value: Value) -> Result<(), Prune> {
        let c = self.c;
        let reqs = &c.requirements[d];
        let role = c.roles[e];
        let count = |ri: usize| self.assigned[d][ri] + u32::from(reqs[ri].filled_by(role, value));

        for (ri, r) in reqs.iter().enumerate() {
            if count(ri) + c.candidates_after[d][ri][e + 1] < r.min {
                return Err(Prune::Staffing);
            }
        }
        // Un employé ne couvre qu'une exigence par jour dans un même groupe.
        for g in &c.groups[d] {
            let deficit = g
                .requirements
                .clone()
                .map(|ri| reqs[ri].min.saturating_sub(count(ri)))
                .fold(0, u32::saturating_add);
            if deficit > g.available_after[e + 1] {
                return Err(Prune::Staffing);
            }
        }
        Ok(())
    }

    /// Les employés au bout de leur série ou de leurs heures ne travaillent pas
    /// le lendemain : les exigences du lendemain restent couvrables sans eux.
    fn next_day_reachable(&self, d: usize, e: usize, next_minutes: i64, next_streak: u32) -> Result<(), Prune> {
        let c = self.c;
        let next = d + 1;
        if next >= c.days {
            return Ok(());
        }
        // Les employés pas encore liés au jour `d` peuvent s'y reposer.
        let fresh = |other: usize| {
            let (minutes, streak) = match other.cmp(&e) {
                Ordering::Less => (self.minutes[other], self.streak[other]),
                Ordering::Equal => (next_minutes, next_streak),
                Ordering::Greater => return true,
            };
            c.max_consecutive.map_or(true, |max| streak < max)
                && c.min_duration[other].is_some_and(|m| minutes + m <= c.max_minutes[other])
        };
        let can_cover = |other: usize, shift: usize| c.domains[c.var(next, other)].contains(&Some(shift));

        let reqs = &c.requirements[next];
        for g in &c.groups[next] {
            let span = &reqs[g.requirements.clone()];
            let members: Vec<usize> = (0..c.employees)
                .filter(|&o| g.group.contains(c.roles[o]) && fresh(o))
                .collect();
            let mut needed = 0u32;
            for r in span {
                let candidates = members.iter().filter(|&&o| can_cover(o, r.shift)).count();
                if u32::try_from(candidates).unwrap_or(u32::MAX) < r.min {
                    return Err(Prune::Staffing);
                }
                needed = needed.saturating_add(r.min);
            }
            let available = members
                .iter()
                .filter(|&&o| span.iter().any(|r| can_cover(o, r.shift)))
                .count();
            if u32::try_from(available).unwrap_or(u32::MAX) < needed {
                return Err(Prune::Staffing);
            }
        }
        Ok(())
    }

    /// Les jours suivants demandent au moins `bodies_from[d + 1]` services.
    fn capacity_sufficient(
        &self,
        d: usize,
        e: usize,
        next_minutes: i64,
        next_worked: u32,
        next_streak: u32,
    ) -> Result<(), Prune> {
        let c = self.c;
        let needed = c.bodies_from[d + 1];
        if needed == 0 {
            return Ok(());
        }
        let mut capacity = 0u32;
        for other in 0..c.employees {
            // Un employé pas encore lié au jour `d` peut s'y reposer.
            let (minutes, worked, streak) = match other.cmp(&e) {
                Ordering::Less => (self.minutes[other], self.worked[other], self.streak[other]),
                Ordering::Equal => (next_minutes, next_worked, next_streak),
                Ordering::Greater => (self.minutes[other], self.worked[other], 0),
            };
            capacity = capacity.saturating_add(c.shift_capacity(other, d + 1, minutes, worked, streak));
            if capacity >= needed {
                return Ok(());
            }
        }
        Err(Prune::Capacity)
    }

    /// `next` : minutes, jours travaillés et série de l'employé après liaison.
    fn lower_bound(&self, var: usize, value: Value, next: (i64, u32, u32)) -> Objective {
        let c = self.c;
        let d = var / c.employees;
        let e = var % c.employees;

        let mut deviation_minutes = 0i64;
        for other in 0..c.employees {
            let (minutes, worked, streak, from) = match other.cmp(&e) {
                Ordering::Equal => (next.0, next.1, next.2, d + 1),
                Ordering::Less => (self.minutes[other], self.worked[other], self.streak[other], d + 1),
                Ordering::Greater => (self.minutes[other], self.worked[other], self.streak[other], d),
            };
            let target = c.target_minutes[other];
            deviation_minutes += if minutes > target {
                minutes - target
            } else {
                (target - minutes - c.future_max_minutes(other, from, worked, streak)).max(0)
            };
        }
        let avoided_days = self.avoided + u32::from(value.is_some() && c.avoid[var]);
        Objective {
            deviation_minutes,
            avoided_days,
        }
    }

    fn bind(&mut self, var: usize, value: Value) {
        let e = var % self.c.employees;
        self.saved_streak[var] = self.streak[e];
        self.streak[e] = if value.is_some() { self.streak[e] + 1 } else { 0 };
        self.grid[var] = value;
        self.apply(var, value, true);
    }

    fn unbind(&mut self, var: usize) {
        let value = self.grid[var];
        self.apply(var, value, false);
        self.grid[var] = None;
        self.streak[var % self.c.employees] = self.saved_streak[var];
    }

    fn apply(&mut self, var: usize, value: Value, forward: bool) {
        let c = self.c;
        let Some(s) = value else {
            return;
        };
        let d = var / c.employees;
        let e = var % c.employees;
        let role = c.roles[e];
        if forward {
            self.minutes[e] += c.durations[s];
            self.worked[e] += 1;
            self.avoided += u32::from(c.avoid[var]);
        } else {
            self.minutes[e] -= c.durations[s];
            self.worked[e] -= 1;
            self.avoided -= u32::from(c.avoid[var]);
        }
        for (ri, r) in c.requirements[d].iter().enumerate() {
            if r.filled_by(role, value) {
                if forward {
                    self.assigned[d][ri] += 1;
                } else {
                    self.assigned[d][ri] -= 1;
                }
            }
        }
    }
}
