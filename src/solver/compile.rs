//! Compilation d'un `Problem` validé vers l'espace de décision de la recherche.
//!
//! Une variable par couple (jour, employé), ordonnées jour par jour puis dans
//! l'ordre d'insertion des employés. Chaque domaine liste les types de service
//! éligibles dans l'ordre du catalogue, puis le repos en dernier.

use crate::model::{EmployeeId, HardConstraints, RoleId, ShiftTypeId, TimeOfDay};
use crate::problem::Problem;
use std::ops::Range;

/// Valeur d'une variable : index de type de service, ou `None` pour le repos.
pub(crate) type Value = Option<usize>;

/// Population concernée par une exigence d'effectif.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Group {
    Global,
    Role(usize),
}

impl Group {
    #[inline]
    pub(crate) fn contains(self, role: Option<usize>) -> bool {
        match self {
            Group::Global => true,
            Group::Role(r) => role == Some(r),
        }
    }
}

/// « Au moins `min` employés de `group` sur `shift` ce jour-là. »
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Requirement {
    pub shift: usize,
    pub group: Group,
    pub min: u32,
}

impl Requirement {
    #[inline]
    pub(crate) fn filled_by(&self, role: Option<usize>, value: Value) -> bool {
        value == Some(self.shift) && self.group.contains(role)
    }
}

/// Exigences d'un même groupe pour un jour, contiguës dans `requirements[day]`.
#[derive(Debug, Clone)]
pub(crate) struct GroupSpan {
    pub group: Group,
    pub requirements: Range<usize>,
    /// `available_after[p]` : employés du groupe en position `>= p` pouvant
    /// couvrir au moins une exigence du groupe ce jour-là.
    pub available_after: Vec<u32>,
}

/// Ensemble fermé des contraintes dures, évaluées par `check::violations`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Constraint {
    Eligibility { employee: usize },
    Availability { employee: usize, day: usize },
    StaffingMinimum { day: usize, requirement: usize },
    RestRule { from: usize, to: usize },
    HoursBound { employee: usize },
    ConsecutiveDays { max: u32 },
    DaysOff { min: u32 },
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledProblem {
    pub days: usize,
    pub employees: usize,
    pub employee_ids: Vec<EmployeeId>,
    pub shift_ids: Vec<ShiftTypeId>,
    pub role_ids: Vec<RoleId>,
    pub durations: Vec<i64>,
    /// `[employé][type de service]`
    pub eligible: Vec<Vec<bool>>,
    /// `[employé]`
    pub roles: Vec<Option<usize>>,
    pub min_minutes: Vec<i64>,
    pub max_minutes: Vec<i64>,
    pub target_minutes: Vec<i64>,
    pub flextime_balance_minutes: Vec<i64>,
    /// `[variable]`
    pub domains: Vec<Vec<Value>>,
    /// `[variable]` : jour à éviter (préférence souple).
    pub avoid: Vec<bool>,
    /// `[variable]` : jour d'indisponibilité.
    pub unavailable: Vec<bool>,
    /// `[de * S + vers]` : `vers` interdit le lendemain de `de`.
    pub forbidden: Vec<bool>,
    pub max_consecutive: Option<u32>,
    pub min_days_off: u32,
    /// Nombre maximal de jours travaillés par employé.
    pub work_day_cap: u32,
    /// `[jour]`, triées par groupe.
    pub requirements: Vec<Vec<Requirement>>,
    /// `[jour][exigence][position]` : candidats en position `>= position`.
    pub candidates_after: Vec<Vec<Vec<u32>>>,
    /// `[jour]`
    pub groups: Vec<Vec<GroupSpan>>,
    /// `[jour]`, longueur `days + 1` : effectif minimal cumulé à partir du jour.
    pub bodies_from: Vec<u32>,
    /// `[employé][jour]`, longueur `days + 1` : jours travaillables à partir du jour.
    pub workable_from: Vec<Vec<u32>>,
    /// `[employé][jour]`, longueur `days + 1` : minutes maximales à partir du jour.
    pub max_minutes_from: Vec<Vec<i64>>,
    pub min_duration: Vec<Option<i64>>,
    pub max_duration: Vec<i64>,
    pub constraints: Vec<Constraint>,
}

impl CompiledProblem {
    #[inline]
    pub(crate) fn variables(&self) -> usize {
        self.days * self.employees
    }

    #[inline]
    pub(crate) fn var(&self, day: usize, employee: usize) -> usize {
        day * self.employees + employee
    }

    #[inline]
    pub(crate) fn is_forbidden(&self, from: usize, to: usize) -> bool {
        self.forbidden[from * self.shift_ids.len() + to]
    }

    /// Jours encore travaillables à partir de `from_day` sous la limite de
    /// jours consécutifs, pour une série en cours de `streak` jours.
    pub(crate) fn streak_cap(&self, from_day: usize, streak: u32) -> u32 {
        let remaining = u32::try_from(self.days.saturating_sub(from_day)).unwrap_or(u32::MAX);
        let Some(max) = self.max_consecutive else {
            return remaining;
        };
        let first = remaining.min(max.saturating_sub(streak));
        if first == remaining {
            return first;
        }
        // Repos imposé, puis des blocs de `max` jours suivis d'un repos.
        let after = remaining - first - 1;
        first + after - after / (max + 1)
    }

    #[inline]
    fn days_left(&self, from_day: usize, worked: u32, streak: u32) -> u32 {
        self.work_day_cap
            .saturating_sub(worked)
            .min(self.streak_cap(from_day, streak))
    }

    /// Minutes encore atteignables à partir de `from_day` pour un employé
    /// ayant déjà travaillé `worked` jours, dont `streak` d'affilée.
    #[inline]
    pub(crate) fn future_max_minutes(&self, employee: usize, from_day: usize, worked: u32, streak: u32) -> i64 {
        let days = self.workable_from[employee][from_day].min(self.days_left(from_day, worked, streak));
        self.max_minutes_from[employee][from_day]
            .min(i64::from(days) * self.max_duration[employee])
    }

    /// Nombre maximal de services encore possibles à partir de `from_day`.
    #[inline]
    pub(crate) fn shift_capacity(
        &self,
        employee: usize,
        from_day: usize,
        minutes: i64,
        worked: u32,
        streak: u32,
    ) -> u32 {
        let Some(min_duration) = self.min_duration[employee] else {
            return 0;
        };
        let by_days = self.workable_from[employee][from_day];
        let by_hours = (self.max_minutes[employee] - minutes).max(0) / min_duration;
        let by_hours = u32::try_from(by_hours).unwrap_or(u32::MAX);
        by_days.min(by_hours).min(self.days_left(from_day, worked, streak))
    }
}

/// Compile un problème déjà validé (`Problem::validate`).
pub(crate) fn compile(problem: &Problem) -> CompiledProblem {
    let days = usize::try_from(problem.period_days).unwrap_or(0);
    let employees = problem.employees.len();
    let shifts = problem.shift_types.len();

    let shift_ids: Vec<ShiftTypeId> = problem.shift_types.iter().map(|s| s.id.clone()).collect();
    let role_ids: Vec<RoleId> = problem.roles.iter().map(|r| r.id.clone()).collect();
    let shift_index = |id: &ShiftTypeId| shift_ids.iter().position(|s| s == id);
    let role_index = |id: &RoleId| role_ids.iter().position(|r| r == id);

    let durations: Vec<i64> = problem.shift_types.iter().map(|s| s.duration_minutes()).collect();
    let buckets = shift_buckets(problem);

    let mut eligible = vec![vec![false; shifts]; employees];
    for (e, employee) in problem.employees.iter().enumerate() {
        for id in &employee.works_shifts {
            if let Some(s) = shift_index(id) {
                eligible[e][s] = true;
            }
        }
    }
    let roles: Vec<Option<usize>> = problem
        .employees
        .iter()
        .map(|e| e.role.as_ref().and_then(role_index))
        .collect();

    let hours_to_minutes = |h: i32| i64::from(h) * 60;
    let min_minutes = problem.employees.iter().map(|e| hours_to_minutes(e.min_hours)).collect();
    let max_minutes: Vec<i64> = problem.employees.iter().map(|e| hours_to_minutes(e.max_hours)).collect();
    let target_minutes = problem.employees.iter().map(|e| hours_to_minutes(e.target_hours)).collect();
    let flextime_balance_minutes = problem
        .employees
        .iter()
        .map(|e| hours_to_minutes(e.flextime_balance_hours))
        .collect();

    let mut domains = Vec::with_capacity(days * employees);
    let mut avoid = Vec::with_capacity(days * employees);
    let mut unavailable = Vec::with_capacity(days * employees);
    for d in 0..days {
        let day = d as u32;
        for (e, employee) in problem.employees.iter().enumerate() {
            let off = employee.unavailable_days.contains(&day);
            let mut domain: Vec<Value> = Vec::new();
            if !off {
                domain.extend((0..shifts).filter(|&s| eligible[e][s]).map(Some));
            }
            domain.push(None);
            domains.push(domain);
            avoid.push(employee.avoid_days.contains(&day));
            unavailable.push(off);
        }
    }

    let forbidden = forbidden_successors(problem, &shift_ids, &durations);

    let rules = problem.rules.clone().unwrap_or_default();
    let max_consecutive = rules.max_consecutive_days.map(u32::from);
    let min_days_off = rules.mandatory_off_days.map(u32::from).unwrap_or(0);
    let work_day_cap = (days as u32).saturating_sub(min_days_off);

    let mut requirements = Vec::with_capacity(days);
    let mut bodies = Vec::with_capacity(days);
    for d in 0..days {
        let day_reqs = day_requirements(problem, d as u32, &buckets, &role_ids);
        bodies.push(bodies_needed(&day_reqs, shifts));
        requirements.push(day_reqs);
    }
    let mut bodies_from = vec![0u32; days + 1];
    for d in (0..days).rev() {
        bodies_from[d] = bodies_from[d + 1].saturating_add(bodies[d]);
    }

    let mut compiled = CompiledProblem {
        days,
        employees,
        employee_ids: problem.employees.iter().map(|e| e.id.clone()).collect(),
        shift_ids,
        role_ids,
        durations,
        eligible,
        roles,
        min_minutes,
        max_minutes,
        target_minutes,
        flextime_balance_minutes,
        domains,
        avoid,
        unavailable,
        forbidden,
        max_consecutive,
        min_days_off,
        work_day_cap,
        requirements,
        candidates_after: Vec::new(),
        groups: Vec::new(),
        bodies_from,
        workable_from: Vec::new(),
        max_minutes_from: Vec::new(),
        min_duration: Vec::new(),
        max_duration: Vec::new(),
        constraints: Vec::new(),
    };
    fill_candidate_tables(&mut compiled);
    fill_employee_tables(&mut compiled);
    compiled.constraints = constraint_set(&compiled);
    compiled
}

/// Tranche de chaque type de service, selon la fenêtre de jour configurée.
fn shift_buckets(problem: &Problem) -> Vec<TimeOfDay> {
    let window = problem
        .hard_constraints
        .as_ref()
        .map(|hc| hc.daytime)
        .unwrap_or_default();
    problem
        .shift_types
        .iter()
        .map(|s| window.classify(s.start))
        .collect()
}

fn forbidden_successors(problem: &Problem, shift_ids: &[ShiftTypeId], durations: &[i64]) -> Vec<bool> {
    let shifts = shift_ids.len();
    let mut forbidden = vec![false; shifts * shifts];
    let position = |id: &ShiftTypeId| shift_ids.iter().position(|s| s == id);

    if let Some(hc) = &problem.hard_constraints {
        for (from, to) in &hc.shift_off_shift {
            if let (Some(a), Some(b)) = (position(from), position(to)) {
                forbidden[a * shifts + b] = true;
            }
        }
    }

    // Écart entre la fin de `a` (jour J) et le début de `b` (jour J+1).
    let Some(min_rest) = problem
        .rules
        .as_ref()
        .and_then(|r| r.min_rest_hours)
        .filter(|&h| h > 0)
        .map(|h| i64::from(h) * 60)
    else {
        return forbidden;
    };
    for (a, shift_a) in problem.shift_types.iter().enumerate() {
        let end_a = minutes_from_midnight(shift_a.start) + durations[a];
        for (b, shift_b) in problem.shift_types.iter().enumerate() {
            let gap = 24 * 60 + minutes_from_midnight(shift_b.start) - end_a;
            if gap < min_rest {
                forbidden[a * shifts + b] = true;
            }
        }
    }
    forbidden
}

fn minutes_from_midnight(t: chrono::NaiveTime) -> i64 {
    use chrono::Timelike;
    i64::from(t.num_seconds_from_midnight() / 60)
}

fn required_global(hc: Option<&HardConstraints>, day: u32, bucket: TimeOfDay) -> i32 {
    let Some(hc) = hc else {
        return 0;
    };
    hc.day_overrides
        .iter()
        .filter(|o| o.day == day && o.role.is_none())
        .find_map(|o| o.required(bucket))
        .unwrap_or_else(|| hc.required_people(bucket))
}

fn required_role(problem: &Problem, role: &RoleId, day: u32, bucket: TimeOfDay) -> i32 {
    let declared = problem.role(role).map(|r| r.required(bucket)).unwrap_or(0);
    let Some(hc) = problem.hard_constraints.as_ref() else {
        return declared;
    };
    hc.day_overrides
        .iter()
        .filter(|o| o.day == day && o.role.as_ref() == Some(role))
        .find_map(|o| o.required(bucket))
        .or_else(|| hc.required_roles(bucket).get(role).copied())
        .unwrap_or(declared)
}

fn day_requirements(
    problem: &Problem,
    day: u32,
    buckets: &[TimeOfDay],
    role_ids: &[RoleId],
) -> Vec<Requirement> {
    let hc = problem.hard_constraints.as_ref();
    let mut out = Vec::new();
    for (shift, &bucket) in buckets.iter().enumerate() {
        let min = required_global(hc, day, bucket).max(0) as u32;
        if min > 0 {
            out.push(Requirement {
                shift,
                group: Group::Global,
                min,
            });
        }
    }
    for (r, role) in role_ids.iter().enumerate() {
        for (shift, &bucket) in buckets.iter().enumerate() {
            let min = required_role(problem, role, day, bucket).max(0) as u32;
            if min > 0 {
                out.push(Requirement {
                    shift,
                    group: Group::Role(r),
                    min,
                });
            }
        }
    }
    out
}

/// Borne inférieure du nombre d'employés distincts mobilisés un jour donné.
fn bodies_needed(requirements: &[Requirement], shifts: usize) -> u32 {
    let mut global = vec![0u32; shifts];
    let mut by_roles = vec![0u32; shifts];
    for r in requirements {
        match r.group {
            Group::Global => global[r.shift] = global[r.shift].max(r.min),
            Group::Role(_) => by_roles[r.shift] = by_roles[r.shift].saturating_add(r.min),
        }
    }
    global
        .iter()
        .zip(&by_roles)
        .map(|(g, r)| (*g).max(*r))
        .fold(0, u32::saturating_add)
}

fn fill_candidate_tables(c: &mut CompiledProblem) {
    let mut candidates_after = Vec::with_capacity(c.days);
    let mut groups = Vec::with_capacity(c.days);
    for d in 0..c.days {
        let reqs = &c.requirements[d];
        let mut per_req = Vec::with_capacity(reqs.len());
        for r in reqs {
            let mut suffix = vec![0u32; c.employees + 1];
            for e in (0..c.employees).rev() {
                let can = r.group.contains(c.roles[e]) && c.domains[c.var(d, e)].contains(&Some(r.shift));
                suffix[e] = suffix[e + 1] + u32::from(can);
            }
            per_req.push(suffix);
        }
        candidates_after.push(per_req);

        let mut spans: Vec<GroupSpan> = Vec::new();
        let mut start = 0;
        while start < reqs.len() {
            let group = reqs[start].group;
            let end = start + reqs[start..].iter().take_while(|r| r.group == group).count();
            let mut available_after = vec![0u32; c.employees + 1];
            for e in (0..c.employees).rev() {
                let domain = &c.domains[c.var(d, e)];
                let can = group.contains(c.roles[e])
                    && reqs[start..end].iter().any(|r| domain.contains(&Some(r.shift)));
                available_after[e] = available_after[e + 1] + u32::from(can);
            }
            spans.push(GroupSpan {
                group,
                requirements: start..end,
                available_after,
            });
            start = end;
        }
        groups.push(spans);
    }
    c.candidates_after = candidates_after;
    c.groups = groups;
}

fn fill_employee_tables(c: &mut CompiledProblem) {
    for e in 0..c.employees {
        let eligible: Vec<i64> = (0..c.shift_ids.len())
            .filter(|&s| c.eligible[e][s])
            .map(|s| c.durations[s])
            .collect();
        c.min_duration.push(eligible.iter().copied().min());
        c.max_duration.push(eligible.iter().copied().max().unwrap_or(0));

        let mut workable = vec![0u32; c.days + 1];
        let mut minutes = vec![0i64; c.days + 1];
        for d in (0..c.days).rev() {
            let best = c.domains[c.var(d, e)]
                .iter()
                .filter_map(|v| v.map(|s| c.durations[s]))
                .max();
            workable[d] = workable[d + 1] + u32::from(best.is_some());
            minutes[d] = minutes[d + 1] + best.unwrap_or(0);
        }
        c.workable_from.push(workable);
        c.max_minutes_from.push(minutes);
    }
}

fn constraint_set(c: &CompiledProblem) -> Vec<Constraint> {
    let mut out = Vec::new();
    for e in 0..c.employees {
        out.push(Constraint::Eligibility { employee: e });
        out.push(Constraint::HoursBound { employee: e });
        for d in 0..c.days {
            if c.unavailable[c.var(d, e)] {
                out.push(Constraint::Availability { employee: e, day: d });
            }
        }
    }
    for (d, reqs) in c.requirements.iter().enumerate() {
        for requirement in 0..reqs.len() {
            out.push(Constraint::StaffingMinimum { day: d, requirement });
        }
    }
    let shifts = c.shift_ids.len();
    for from in 0..shifts {
        for to in 0..shifts {
            if c.is_forbidden(from, to) {
                out.push(Constraint::RestRule { from, to });
            }
        }
    }
    if let Some(max) = c.max_consecutive {
        out.push(Constraint::ConsecutiveDays { max });
    }
    if c.min_days_off > 0 {
        out.push(Constraint::DaysOff { min: c.min_days_off });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Employee, Role, Rules, ShiftType, StaffingOverride};
    use chrono::NaiveTime;

    fn t(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn problem() -> Problem {
        let shifts = vec![
            ShiftType::new(ShiftTypeId::new("early"), "Early", t(6), t(14)),
            ShiftType::new(ShiftTypeId::new("late"), "Late", t(14), t(22)),
            ShiftType::new(ShiftTypeId::new("night"), "Night", t(22), t(6)),
        ];
        let roles = vec![Role::new(RoleId::new("nurse"), "Nurse").with_required(1, 0)];
        let employees = vec![
            Employee::new(EmployeeId::new("a"), "A")
                .with_shifts([ShiftTypeId::new("early"), ShiftTypeId::new("night")])
                .with_hours(0, 100, 40)
                .with_unavailable([1])
                .with_role(RoleId::new("nurse")),
            Employee::new(EmployeeId::new("b"), "B")
                .with_shifts([ShiftTypeId::new("late")])
                .with_hours(0, 100, 40),
        ];
        let mut hc = HardConstraints {
            nighttime_required_people: 1,
            ..HardConstraints::default()
        };
        hc.shift_off_shift
            .insert(ShiftTypeId::new("late"), ShiftTypeId::new("early"));
        hc.day_overrides.push(StaffingOverride {
            day: 2,
            role: None,
            daytime_required: None,
            nighttime_required: Some(0),
        });
        Problem::new(3, shifts, roles, employees).with_hard_constraints(hc)
    }

    #[test]
    fn domains_put_rest_last_and_honour_unavailability() {
        let c = compile(&problem());
        assert_eq!(c.domains[c.var(0, 0)], vec![Some(0), Some(2), None]);
        assert_eq!(c.domains[c.var(1, 0)], vec![None]);
        assert_eq!(c.domains[c.var(0, 1)], vec![Some(1), None]);
    }

    #[test]
    fn buckets_follow_start_time() {
        assert_eq!(
            shift_buckets(&problem()),
            vec![TimeOfDay::Daytime, TimeOfDay::Daytime, TimeOfDay::Nighttime]
        );
    }

    #[test]
    fn requirements_apply_overrides_per_day() {
        let c = compile(&problem());
        // Jour 0 : nuit globale + early/late pour le rôle.
        assert_eq!(c.requirements[0].len(), 3);
        assert_eq!(
            c.requirements[0][0],
            Requirement {
                shift: 2,
                group: Group::Global,
                min: 1
            }
        );
        // Jour 2 : la nuit est levée par la surcharge.
        assert!(c.requirements[2].iter().all(|r| r.group != Group::Global));
        assert_eq!(c.bodies_from[2], 2);
    }

    #[test]
    fn candidate_suffixes_count_eligible_members() {
        let c = compile(&problem());
        // Exigence rôle/early au jour 0 : seul A (position 0) peut la couvrir.
        let idx = c.requirements[0]
            .iter()
            .position(|r| r.group == Group::Role(0) && r.shift == 0)
            .unwrap();
        assert_eq!(c.candidates_after[0][idx], vec![1, 0, 0]);
        // Jour 1 : A est indisponible.
        assert_eq!(c.candidates_after[1][idx], vec![0, 0, 0]);
    }

    #[test]
    fn rest_rules_merge_explicit_pairs_and_min_rest() {
        let c = compile(&problem());
        assert!(c.is_forbidden(1, 0));
        assert!(!c.is_forbidden(0, 1));
        // night (22-6) puis early (6-14) : écart nul, pas de chevauchement.
        assert!(!c.is_forbidden(2, 0));
        assert_eq!(c.constraints.iter().filter(|k| matches!(k, Constraint::RestRule { .. })).count(), 1);

        let with_rest = problem().with_rules(Rules {
            min_rest_hours: Some(11),
            ..Rules::default()
        });
        let c = compile(&with_rest);
        assert!(c.is_forbidden(2, 0));
        assert!(c.is_forbidden(2, 1));
        assert!(!c.is_forbidden(0, 0));
    }

    #[test]
    fn employee_tables_bound_future_work() {
        let c = compile(&problem());
        assert_eq!(c.workable_from[0], vec![2, 1, 1, 0]);
        assert_eq!(c.max_minutes_from[0], vec![960, 480, 480, 0]);
        assert_eq!(c.min_duration[1], Some(480));
        assert_eq!(c.shift_capacity(0, 0, 0, 0, 0), 2);
        assert_eq!(c.future_max_minutes(0, 0, 0, 0), 960);
    }

    #[test]
    fn overlapping_pairs_are_allowed_without_rest_rules() {
        let mut p = problem();
        p.shift_types[2] = ShiftType::new(ShiftTypeId::new("night"), "Night", t(22), t(8));
        let c = compile(&p);
        // night (22-8) chevauche early (6-14) du lendemain.
        assert!(!c.is_forbidden(2, 0));

        let c = compile(&p.with_rules(Rules {
            min_rest_hours: Some(1),
            ..Rules::default()
        }));
        assert!(c.is_forbidden(2, 0));
        assert!(!c.is_forbidden(2, 1));
    }

    #[test]
    fn streak_cap_counts_forced_rest_days() {
        let mut c = compile(&problem());
        c.days = 14;
        assert_eq!(c.streak_cap(0, 0), 14);
        c.max_consecutive = Some(5);
        // 5 jours, repos, 5 jours, repos, 2 jours.
        assert_eq!(c.streak_cap(0, 0), 12);
        // Série de 5 en cours : repos immédiat puis 5, repos, 5, repos, 1.
        assert_eq!(c.streak_cap(0, 5), 11);
        assert_eq!(c.streak_cap(10, 3), 3);
        assert_eq!(c.streak_cap(14, 0), 0);
        c.max_consecutive = Some(0);
        assert_eq!(c.streak_cap(0, 0), 0);
    }

    #[test]
    fn huge_headcounts_saturate() {
        let mut p = problem();
        p.roles.push(Role::new(RoleId::new("aide"), "Aide").with_required(i32::MAX, 0));
        p.roles[0].daytime_required = i32::MAX;
        if let Some(hc) = p.hard_constraints.as_mut() {
            hc.daytime_required_people = i32::MAX;
        }
        let c = compile(&p);
        assert_eq!(c.bodies_from[0], u32::MAX);
    }
}
