use crate::calendar::Day;
use crate::model::{EmployeeId, ShiftTypeId};
use crate::solver::compile::{CompiledProblem, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Qualité d'une affectation, comparée lexicographiquement : écart total aux
/// heures cibles d'abord, puis nombre de jours « à éviter » travaillés.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Objective {
    pub deviation_minutes: i64,
    pub avoided_days: u32,
}

impl Objective {
    pub(crate) fn evaluate(c: &CompiledProblem, grid: &[Value]) -> Self {
        let mut minutes = vec![0i64; c.employees];
        let mut avoided_days = 0u32;
        for (var, value) in grid.iter().enumerate() {
            if let Some(s) = value {
                minutes[var % c.employees] += c.durations[*s];
                avoided_days += u32::from(c.avoid[var]);
            }
        }
        let deviation_minutes = minutes
            .iter()
            .zip(&c.target_minutes)
            .map(|(m, t)| (m - t).abs())
            .sum();
        Self {
            deviation_minutes,
            avoided_days,
        }
    }
}

impl PartialOrd for Objective {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Objective {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deviation_minutes
            .cmp(&other.deviation_minutes)
            .then(self.avoided_days.cmp(&other.avoided_days))
    }
}

/// Vue par employé d'une affectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    pub employee: EmployeeId,
    pub realized_minutes: i64,
    pub target_minutes: i64,
    pub shifts_worked: u32,
    pub weekend_shifts: u32,
    pub holiday_shifts: u32,
    pub avoided_days_worked: u32,
}

impl EmployeeSummary {
    pub fn realized_hours(&self) -> f64 {
        self.realized_minutes as f64 / 60.0
    }

    /// Écart signé à la cible (positif : heures supplémentaires).
    pub fn deviation_minutes(&self) -> i64 {
        self.realized_minutes - self.target_minutes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlextimeScope {
    /// Écart de la période seule.
    PerMonth,
    /// Écart cumulé, solde reporté inclus.
    Total,
}

/// Dépassement du crédit d'heures autorisé. Indicatif : n'invalide pas la solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlextimeBreach {
    pub employee: EmployeeId,
    pub scope: FlextimeScope,
    pub drift_minutes: i64,
    pub allowed_minutes: i64,
}

/// Affectation complète de la période.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub days: Vec<Day>,
    pub employees: Vec<EmployeeId>,
    pub shift_types: Vec<ShiftTypeId>,
    /// `[jour][employé]`, dans l'ordre de `employees`.
    pub assignments: Vec<Vec<Option<ShiftTypeId>>>,
    #[serde(default)]
    pub summaries: Vec<EmployeeSummary>,
    /// `[jour][type de service]`, dans l'ordre de `shift_types`.
    #[serde(default)]
    pub headcounts: Vec<Vec<u32>>,
    #[serde(default)]
    pub flextime_breaches: Vec<FlextimeBreach>,
    #[serde(default)]
    pub objective: Objective,
}

impl Solution {
    /// `flextime` : crédits autorisés (par période, total) en minutes, si définis.
    pub(crate) fn from_grid(
        c: &CompiledProblem,
        days: Vec<Day>,
        grid: &[Value],
        flextime: Option<(i64, i64)>,
    ) -> Self {
        let shifts = c.shift_ids.len();
        let mut assignments = Vec::with_capacity(c.days);
        let mut headcounts = Vec::with_capacity(c.days);
        for d in 0..c.days {
            let row = &grid[c.var(d, 0)..c.var(d + 1, 0)];
            let mut counts = vec![0u32; shifts];
            for s in row.iter().flatten() {
                counts[*s] += 1;
            }
            headcounts.push(counts);
            assignments.push(
                row.iter()
                    .map(|v| v.map(|s| c.shift_ids[s].clone()))
                    .collect(),
            );
        }

        let mut summaries = Vec::with_capacity(c.employees);
        for e in 0..c.employees {
            let mut summary = EmployeeSummary {
                employee: c.employee_ids[e].clone(),
                realized_minutes: 0,
                target_minutes: c.target_minutes[e],
                shifts_worked: 0,
                weekend_shifts: 0,
                holiday_shifts: 0,
                avoided_days_worked: 0,
            };
            for (d, day) in days.iter().enumerate().take(c.days) {
                let var = c.var(d, e);
                if let Some(s) = grid[var] {
                    summary.realized_minutes += c.durations[s];
                    summary.shifts_worked += 1;
                    summary.weekend_shifts += u32::from(day.is_weekend);
                    summary.holiday_shifts += u32::from(day.is_holiday);
                    summary.avoided_days_worked += u32::from(c.avoid[var]);
                }
            }
            summaries.push(summary);
        }

        let flextime_breaches = flextime
            .map(|(per_month, total)| flextime_breaches(c, &summaries, per_month, total))
            .unwrap_or_default();

        Self {
            days,
            employees: c.employee_ids.clone(),
            shift_types: c.shift_ids.clone(),
            assignments,
            summaries,
            headcounts,
            flextime_breaches,
            objective: Objective::evaluate(c, grid),
        }
    }

    pub fn shift_of(&self, day: usize, employee: &EmployeeId) -> Option<&ShiftTypeId> {
        let e = self.employees.iter().position(|id| id == employee)?;
        self.assignments.get(day)?.get(e)?.as_ref()
    }

    pub fn summary(&self, employee: &EmployeeId) -> Option<&EmployeeSummary> {
        self.summaries.iter().find(|s| &s.employee == employee)
    }

    pub fn realized_hours(&self, employee: &EmployeeId) -> Option<f64> {
        self.summary(employee).map(EmployeeSummary::realized_hours)
    }

    pub fn headcount(&self, day: usize, shift: &ShiftTypeId) -> u32 {
        let Some(s) = self.shift_types.iter().position(|id| id == shift) else {
            return 0;
        };
        self.headcounts
            .get(day)
            .and_then(|row| row.get(s))
            .copied()
            .unwrap_or(0)
    }

    /// Nombre total de services affectés.
    pub fn assigned_count(&self) -> usize {
        self.assignments
            .iter()
            .map(|row| row.iter().filter(|v| v.is_some()).count())
            .sum()
    }
}

fn flextime_breaches(
    c: &CompiledProblem,
    summaries: &[EmployeeSummary],
    per_month: i64,
    total: i64,
) -> Vec<FlextimeBreach> {
    let mut out = Vec::new();
    for (e, summary) in summaries.iter().enumerate() {
        let drift = summary.deviation_minutes();
        if drift.abs() > per_month {
            out.push(FlextimeBreach {
                employee: summary.employee.clone(),
                scope: FlextimeScope::PerMonth,
                drift_minutes: drift,
                allowed_minutes: per_month,
            });
        }
        let cumulated = c.flextime_balance_minutes[e] + drift;
        if cumulated.abs() > total {
            out.push(FlextimeBreach {
                employee: summary.employee.clone(),
                scope: FlextimeScope::Total,
                drift_minutes: cumulated,
                allowed_minutes: total,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_orders_deviation_before_avoided_days() {
        let a = Objective {
            deviation_minutes: 60,
            avoided_days: 5,
        };
        let b = Objective {
            deviation_minutes: 120,
            avoided_days: 0,
        };
        let c = Objective {
            deviation_minutes: 60,
            avoided_days: 1,
        };
        assert!(a < b);
        assert!(c < a);
        assert_eq!(a.max(b), b);
    }

    #[test]
    fn summary_deviation_is_signed() {
        let summary = EmployeeSummary {
            employee: EmployeeId::new("a"),
            realized_minutes: 90,
            target_minutes: 120,
            shifts_worked: 1,
            weekend_shifts: 0,
            holiday_shifts: 0,
            avoided_days_worked: 0,
        };
        assert_eq!(summary.deviation_minutes(), -30);
        assert!((summary.realized_hours() - 1.5).abs() < f64::EPSILON);
    }
}
