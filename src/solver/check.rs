use super::compile::{CompiledProblem, Constraint, Group, Value};
use crate::model::EmployeeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Eligibility,
    Availability,
    Staffing,
    RestRule,
    HoursBound,
    ConsecutiveDays,
    DaysOff,
    /// Solution externe référençant un jour, employé ou type de service inconnu.
    UnknownReference,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Eligibility => "eligibility",
            ViolationKind::Availability => "availability",
            ViolationKind::Staffing => "staffing",
            ViolationKind::RestRule => "rest",
            ViolationKind::HoursBound => "hours",
            ViolationKind::ConsecutiveDays => "consecutive",
            ViolationKind::DaysOff => "days_off",
            ViolationKind::UnknownReference => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub day: Option<u32>,
    pub employee: Option<EmployeeId>,
    pub detail: String,
}

/// Évalue l'ensemble des contraintes dures sur une grille complète `[jour * E + employé]`.
pub(crate) fn violations(c: &CompiledProblem, grid: &[Value]) -> Vec<Violation> {
    let mut out = Vec::new();
    for constraint in &c.constraints {
        check(c, grid, constraint, &mut out);
    }
    out
}

fn check(c: &CompiledProblem, grid: &[Value], constraint: &Constraint, out: &mut Vec<Violation>) {
    let violation = |kind, day: Option<usize>, employee: Option<usize>, detail: String| Violation {
        kind,
        day: day.map(|d| d as u32),
        employee: employee.map(|e| c.employee_ids[e].clone()),
        detail,
    };

    match *constraint {
        Constraint::Eligibility { employee } => {
            for d in 0..c.days {
                if let Some(s) = grid[c.var(d, employee)] {
                    if !c.eligible[employee][s] {
                        out.push(violation(
                            ViolationKind::Eligibility,
                            Some(d),
                            Some(employee),
                            format!("not eligible for {}", c.shift_ids[s]),
                        ));
                    }
                }
            }
        }
        Constraint::Availability { employee, day } => {
            if let Some(s) = grid[c.var(day, employee)] {
                out.push(violation(
                    ViolationKind::Availability,
                    Some(day),
                    Some(employee),
                    format!("assigned {} on an unavailable day", c.shift_ids[s]),
                ));
            }
        }
        Constraint::StaffingMinimum { day, requirement } => {
            let r = c.requirements[day][requirement];
            let count = (0..c.employees)
                .filter(|&e| r.filled_by(c.roles[e], grid[c.var(day, e)]))
                .count() as u32;
            if count < r.min {
                let scope = match r.group {
                    Group::Global => "global".to_string(),
                    Group::Role(role) => format!("role {}", c.role_ids[role]),
                };
                out.push(violation(
                    ViolationKind::Staffing,
                    Some(day),
                    None,
                    format!(
                        "{} {scope}: {count} assigned, {} required",
                        c.shift_ids[r.shift], r.min
                    ),
                ));
            }
        }
        Constraint::RestRule { from, to } => {
            for d in 1..c.days {
                for e in 0..c.employees {
                    if grid[c.var(d - 1, e)] == Some(from) && grid[c.var(d, e)] == Some(to) {
                        out.push(violation(
                            ViolationKind::RestRule,
                            Some(d),
                            Some(e),
                            format!("{} after {}", c.shift_ids[to], c.shift_ids[from]),
                        ));
                    }
                }
            }
        }
        Constraint::HoursBound { employee } => {
            let minutes: i64 = (0..c.days)
                .filter_map(|d| grid[c.var(d, employee)].map(|s| c.durations[s]))
                .sum();
            let (min, max) = (c.min_minutes[employee], c.max_minutes[employee]);
            if minutes < min || minutes > max {
                out.push(violation(
                    ViolationKind::HoursBound,
                    None,
                    Some(employee),
                    format!("{minutes}min outside of [{min}, {max}]min"),
                ));
            }
        }
        Constraint::ConsecutiveDays { max } => {
            for e in 0..c.employees {
                let mut streak = 0u32;
                for d in 0..c.days {
                    if grid[c.var(d, e)].is_some() {
                        streak += 1;
                        if streak == max + 1 {
                            out.push(violation(
                                ViolationKind::ConsecutiveDays,
                                Some(d),
                                Some(e),
                                format!("more than {max} consecutive working days"),
                            ));
                        }
                    } else {
                        streak = 0;
                    }
                }
            }
        }
        Constraint::DaysOff { min } => {
            for e in 0..c.employees {
                let off = (0..c.days).filter(|&d| grid[c.var(d, e)].is_none()).count() as u32;
                if off < min {
                    out.push(violation(
                        ViolationKind::DaysOff,
                        None,
                        Some(e),
                        format!("{off} days off, {min} required"),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Employee, HardConstraints, Role, RoleId, Rules, ShiftType, ShiftTypeId,
    };
    use crate::problem::Problem;
    use crate::solver::compile::compile;
    use chrono::NaiveTime;

    fn problem() -> Problem {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let shifts = vec![
            ShiftType::new(ShiftTypeId::new("day"), "Day", t(8), t(16)),
            ShiftType::new(ShiftTypeId::new("late"), "Late", t(20), t(4)),
        ];
        let employees = vec![
            Employee::new(EmployeeId::new("a"), "A")
                .with_shifts([ShiftTypeId::new("day")])
                .with_hours(8, 16, 16)
                .with_unavailable([2]),
            Employee::new(EmployeeId::new("b"), "B")
                .with_shifts([ShiftTypeId::new("day"), ShiftTypeId::new("late")])
                .with_hours(0, 24, 16)
                .with_role(RoleId::new("nurse")),
        ];
        let mut hc = HardConstraints {
            daytime_required_people: 1,
            ..HardConstraints::default()
        };
        hc.shift_off_shift
            .insert(ShiftTypeId::new("late"), ShiftTypeId::new("day"));
        Problem::new(3, shifts, vec![Role::new(RoleId::new("nurse"), "Nurse")], employees)
            .with_hard_constraints(hc)
            .with_rules(Rules {
                max_consecutive_days: Some(2),
                ..Rules::default()
            })
    }

    #[test]
    fn clean_grid_has_no_violation() {
        let c = compile(&problem());
        // jour : (A, B)
        let grid = vec![Some(0), None, Some(0), None, None, Some(0)];
        let v = violations(&c, &grid);
        assert!(v.is_empty(), "{v:?}");
    }

    #[test]
    fn detects_rest_and_streak_violations() {
        let c = compile(&problem());
        // B : late, late, day
        let grid = vec![Some(0), Some(1), Some(0), Some(1), None, Some(0)];
        let v = violations(&c, &grid);
        assert_eq!(v.len(), 2, "{v:?}");
        assert!(v
            .iter()
            .any(|v| v.kind == ViolationKind::RestRule && v.day == Some(2)));
        assert!(v.iter().any(|v| v.kind == ViolationKind::ConsecutiveDays
            && v.employee == Some(EmployeeId::new("b"))));
    }

    #[test]
    fn uncovered_days_are_reported_once_per_requirement() {
        let c = compile(&problem());
        let grid = vec![Some(0), None, None, None, None, None];
        let v = violations(&c, &grid);
        assert_eq!(v.len(), 2, "{v:?}");
        assert!(v.iter().all(|v| v.kind == ViolationKind::Staffing));
        assert_eq!(v[0].day, Some(1));
        assert_eq!(v[0].detail, "day global: 0 assigned, 1 required");
    }

    #[test]
    fn reports_each_broken_constraint_kind() {
        let c = compile(&problem());
        // A travaille late (non éligible), le jour 2 (indisponible), 24h > 16h.
        let grid = vec![Some(1), Some(0), Some(0), Some(1), Some(0), Some(1)];
        let v = violations(&c, &grid);
        let kinds: Vec<ViolationKind> = v.iter().map(|v| v.kind).collect();
        assert!(kinds.contains(&ViolationKind::Eligibility));
        assert!(kinds.contains(&ViolationKind::Availability));
        assert!(kinds.contains(&ViolationKind::HoursBound));
        assert!(v
            .iter()
            .filter(|v| v.employee.is_some())
            .all(|v| v.employee == Some(EmployeeId::new("a")) || v.kind == ViolationKind::ConsecutiveDays));
    }
}
