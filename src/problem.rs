use crate::calendar::{self, Day};
use crate::model::{
    Employee, EmployeeId, HardConstraints, Role, RoleId, Rules, ShiftType, ShiftTypeId, TimeOfDay,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProblemError {
    #[error("period length must be positive, got {0}")]
    NonPositivePeriod(i32),
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("shift type {0} has identical start and end")]
    EmptyShift(ShiftTypeId),
    #[error("shift type {shift} lasts {minutes} minutes, more than the allowed {max_hours}h")]
    ShiftTooLong {
        shift: ShiftTypeId,
        minutes: i64,
        max_hours: u16,
    },
    #[error("employee {employee}: min hours {min} exceed max hours {max}")]
    HoursBoundsInverted {
        employee: EmployeeId,
        min: i32,
        max: i32,
    },
    #[error("employee {0}: hours must not be negative")]
    NegativeHours(EmployeeId),
    #[error("{context}: unknown shift type {shift}")]
    UnknownShiftType { context: String, shift: ShiftTypeId },
    #[error("{context}: unknown role {role}")]
    UnknownRole { context: String, role: RoleId },
    #[error("{context}: required headcount must not be negative, got {value}")]
    NegativeRequirement { context: String, value: i32 },
    #[error("{context}: day {day} outside of the {period}-day period")]
    DayOutOfRange {
        context: String,
        day: u32,
        period: i32,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Description autonome d'une résolution : période, catalogue, effectifs et règles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub period_days: i32,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_holidays: Vec<NaiveDate>,
    pub shift_types: Vec<ShiftType>,
    #[serde(default)]
    pub roles: Vec<Role>,
    pub employees: Vec<Employee>,
    /// Absent : aucun effectif requis, aucune règle de repos, pas de flextime.
    #[serde(default)]
    pub hard_constraints: Option<HardConstraints>,
    #[serde(default)]
    pub rules: Option<Rules>,
}

impl Problem {
    pub fn new(
        period_days: i32,
        shift_types: Vec<ShiftType>,
        roles: Vec<Role>,
        employees: Vec<Employee>,
    ) -> Self {
        Self {
            period_days,
            start_date: None,
            public_holidays: Vec::new(),
            shift_types,
            roles,
            employees,
            hard_constraints: None,
            rules: None,
        }
    }

    pub fn with_hard_constraints(mut self, hard_constraints: HardConstraints) -> Self {
        self.hard_constraints = Some(hard_constraints);
        self
    }

    pub fn with_rules(mut self, rules: Rules) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn starting_on(mut self, start: NaiveDate, public_holidays: Vec<NaiveDate>) -> Self {
        self.start_date = Some(start);
        self.public_holidays = public_holidays;
        self
    }

    /// Jours de la période (à appeler sur un problème validé).
    pub fn days(&self) -> Result<Vec<Day>, ProblemError> {
        let period = u32::try_from(self.period_days)
            .map_err(|_| ProblemError::NonPositivePeriod(self.period_days))?;
        Ok(calendar::build_days(
            period,
            self.start_date,
            &self.public_holidays,
        )?)
    }

    pub fn shift_type(&self, id: &ShiftTypeId) -> Option<&ShiftType> {
        self.shift_types.iter().find(|s| &s.id == id)
    }

    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| &e.id == id)
    }

    pub fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| &r.id == id)
    }

    pub fn validate(&self) -> Result<(), ProblemError> {
        if self.period_days <= 0 {
            return Err(ProblemError::NonPositivePeriod(self.period_days));
        }
        check_unique("shift type", self.shift_types.iter().map(|s| s.id.as_str()))?;
        check_unique("role", self.roles.iter().map(|r| r.id.as_str()))?;
        check_unique("employee", self.employees.iter().map(|e| e.id.as_str()))?;

        let max_shift_hours = self.rules.as_ref().and_then(|r| r.max_shift_hours);
        for shift in &self.shift_types {
            if shift.start == shift.end {
                return Err(ProblemError::EmptyShift(shift.id.clone()));
            }
            if let Some(max_hours) = max_shift_hours {
                let minutes = shift.duration_minutes();
                if minutes > i64::from(max_hours) * 60 {
                    return Err(ProblemError::ShiftTooLong {
                        shift: shift.id.clone(),
                        minutes,
                        max_hours,
                    });
                }
            }
        }

        for role in &self.roles {
            let context = format!("role {}", role.id);
            check_requirement(&context, role.daytime_required)?;
            check_requirement(&context, role.nighttime_required)?;
        }

        for employee in &self.employees {
            self.validate_employee(employee)?;
        }

        if let Some(hc) = &self.hard_constraints {
            self.validate_hard_constraints(hc)?;
        }
        Ok(())
    }

    fn validate_employee(&self, employee: &Employee) -> Result<(), ProblemError> {
        if employee.min_hours < 0 || employee.max_hours < 0 || employee.target_hours < 0 {
            return Err(ProblemError::NegativeHours(employee.id.clone()));
        }
        if employee.min_hours > employee.max_hours {
            return Err(ProblemError::HoursBoundsInverted {
                employee: employee.id.clone(),
                min: employee.min_hours,
                max: employee.max_hours,
            });
        }
        let context = format!("employee {}", employee.id);
        for shift in &employee.works_shifts {
            self.check_shift_ref(&context, shift)?;
        }
        if let Some(role) = &employee.role {
            self.check_role_ref(&context, role)?;
        }
        for &day in employee.unavailable_days.iter().chain(&employee.avoid_days) {
            self.check_day(&context, day)?;
        }
        Ok(())
    }

    fn validate_hard_constraints(&self, hc: &HardConstraints) -> Result<(), ProblemError> {
        for (from, to) in &hc.shift_off_shift {
            self.check_shift_ref("shift_off_shift", from)?;
            self.check_shift_ref("shift_off_shift", to)?;
        }
        for bucket in [TimeOfDay::Daytime, TimeOfDay::Nighttime] {
            let context = format!("{bucket} required people");
            check_requirement(&context, hc.required_people(bucket))?;
            for (role, &value) in hc.required_roles(bucket) {
                let context = format!("{bucket} required roles");
                self.check_role_ref(&context, role)?;
                check_requirement(&context, value)?;
            }
        }
        if hc.allowed_flextime_total < 0 {
            return Err(ProblemError::NegativeRequirement {
                context: "allowed flextime total".into(),
                value: hc.allowed_flextime_total,
            });
        }
        if hc.allowed_flextime_per_month < 0 {
            return Err(ProblemError::NegativeRequirement {
                context: "allowed flextime per month".into(),
                value: hc.allowed_flextime_per_month,
            });
        }
        for o in &hc.day_overrides {
            let context = format!("day override {}", o.day);
            self.check_day(&context, o.day)?;
            if let Some(role) = &o.role {
                self.check_role_ref(&context, role)?;
            }
            for value in [o.daytime_required, o.nighttime_required].into_iter().flatten() {
                check_requirement(&context, value)?;
            }
        }
        Ok(())
    }

    fn check_shift_ref(&self, context: &str, shift: &ShiftTypeId) -> Result<(), ProblemError> {
        if self.shift_type(shift).is_none() {
            return Err(ProblemError::UnknownShiftType {
                context: context.to_string(),
                shift: shift.clone(),
            });
        }
        Ok(())
    }

    fn check_role_ref(&self, context: &str, role: &RoleId) -> Result<(), ProblemError> {
        if self.role(role).is_none() {
            return Err(ProblemError::UnknownRole {
                context: context.to_string(),
                role: role.clone(),
            });
        }
        Ok(())
    }

    fn check_day(&self, context: &str, day: u32) -> Result<(), ProblemError> {
        if i64::from(day) >= i64::from(self.period_days) {
            return Err(ProblemError::DayOutOfRange {
                context: context.to_string(),
                day,
                period: self.period_days,
            });
        }
        Ok(())
    }
}

fn check_requirement(context: &str, value: i32) -> Result<(), ProblemError> {
    if value < 0 {
        return Err(ProblemError::NegativeRequirement {
            context: context.to_string(),
            value,
        });
    }
    Ok(())
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ProblemError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ProblemError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StaffingOverride;
    use chrono::NaiveTime;

    fn base() -> Problem {
        let early = ShiftType::new(
            ShiftTypeId::new("early"),
            "Early",
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        );
        let nurse = Role::new(RoleId::new("nurse"), "Nurse");
        let alice = Employee::new(EmployeeId::new("alice"), "Alice")
            .with_shifts([ShiftTypeId::new("early")])
            .with_hours(10, 40, 24)
            .with_role(RoleId::new("nurse"));
        Problem::new(7, vec![early], vec![nurse], vec![alice])
    }

    #[test]
    fn valid_problem_passes() {
        base().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_period() {
        let mut p = base();
        p.period_days = 0;
        assert!(matches!(
            p.validate(),
            Err(ProblemError::NonPositivePeriod(0))
        ));
    }

    #[test]
    fn rejects_inverted_hours() {
        let mut p = base();
        p.employees[0].min_hours = 50;
        assert!(matches!(
            p.validate(),
            Err(ProblemError::HoursBoundsInverted { min: 50, max: 40, .. })
        ));
    }

    #[test]
    fn rejects_dangling_shift_reference() {
        let mut p = base();
        p.employees[0].works_shifts.push(ShiftTypeId::new("night"));
        let err = p.validate().unwrap_err();
        assert!(matches!(err, ProblemError::UnknownShiftType { .. }));
        assert_eq!(err.to_string(), "employee alice: unknown shift type night");
    }

    #[test]
    fn rejects_negative_requirement() {
        let mut p = base();
        p.roles[0].nighttime_required = -1;
        assert!(matches!(
            p.validate(),
            Err(ProblemError::NegativeRequirement { value: -1, .. })
        ));

        let mut p = base();
        p.hard_constraints = Some(HardConstraints {
            daytime_required_people: -2,
            ..HardConstraints::default()
        });
        assert!(matches!(
            p.validate(),
            Err(ProblemError::NegativeRequirement { value: -2, .. })
        ));
    }

    #[test]
    fn rejects_days_outside_period() {
        let mut p = base();
        p.employees[0].unavailable_days.insert(7);
        assert!(matches!(
            p.validate(),
            Err(ProblemError::DayOutOfRange { day: 7, .. })
        ));

        let mut p = base();
        p.hard_constraints = Some(HardConstraints {
            day_overrides: vec![StaffingOverride {
                day: 9,
                role: None,
                daytime_required: Some(1),
                nighttime_required: None,
            }],
            ..HardConstraints::default()
        });
        assert!(matches!(
            p.validate(),
            Err(ProblemError::DayOutOfRange { day: 9, .. })
        ));
    }

    #[test]
    fn rejects_unknown_role_in_hard_constraints() {
        let mut p = base();
        let mut hc = HardConstraints::default();
        hc.daytime_required_roles.insert(RoleId::new("doctor"), 1);
        p.hard_constraints = Some(hc);
        assert!(matches!(p.validate(), Err(ProblemError::UnknownRole { .. })));
    }

    #[test]
    fn rejects_shift_longer_than_rule() {
        let p = base().with_rules(Rules {
            max_shift_hours: Some(6),
            ..Rules::default()
        });
        assert!(matches!(
            p.validate(),
            Err(ProblemError::ShiftTooLong { minutes: 480, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut p = base();
        let twin = p.employees[0].clone();
        p.employees.push(twin);
        assert!(matches!(
            p.validate(),
            Err(ProblemError::DuplicateId { kind: "employee", .. })
        ));
    }
}
