use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Employee
    EmployeeId
);
string_id!(
    /// Identifiant fort pour ShiftType
    ShiftTypeId
);
string_id!(
    /// Identifiant fort pour Role
    RoleId
);

/// Tranche horaire d'un type de service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Daytime,
    Nighttime,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Daytime => f.write_str("daytime"),
            TimeOfDay::Nighttime => f.write_str("nighttime"),
        }
    }
}

/// Fenêtre `[start, end)` des débuts de service considérés « de jour ».
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaytimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for DaytimeWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::MIN + Duration::hours(6),
            end: NaiveTime::MIN + Duration::hours(20),
        }
    }
}

impl DaytimeWindow {
    /// Classe un début de service. Une fenêtre qui passe minuit (`end <= start`)
    /// est acceptée.
    pub fn classify(&self, shift_start: NaiveTime) -> TimeOfDay {
        let inside = if self.start < self.end {
            self.start <= shift_start && shift_start < self.end
        } else {
            shift_start >= self.start || shift_start < self.end
        };
        if inside {
            TimeOfDay::Daytime
        } else {
            TimeOfDay::Nighttime
        }
    }
}

/// Type de service (créneau journalier répété)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftType {
    pub id: ShiftTypeId,
    pub name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftType {
    pub fn new<N: Into<String>>(id: ShiftTypeId, name: N, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            id,
            name: name.into(),
            start,
            end,
        }
    }

    /// Durée en minutes, dérivée des horaires (passage de minuit inclus).
    pub fn duration_minutes(&self) -> i64 {
        let minutes = (self.end - self.start).num_minutes();
        if minutes <= 0 {
            minutes + 24 * 60
        } else {
            minutes
        }
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    pub fn spans_midnight(&self) -> bool {
        self.end <= self.start
    }
}

/// Rôle (fonction) avec ses effectifs requis par tranche.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub daytime_required: i32,
    #[serde(default)]
    pub nighttime_required: i32,
}

impl Role {
    pub fn new<N: Into<String>>(id: RoleId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            daytime_required: 0,
            nighttime_required: 0,
        }
    }

    pub fn with_required(mut self, daytime: i32, nighttime: i32) -> Self {
        self.daytime_required = daytime;
        self.nighttime_required = nighttime;
        self
    }

    pub fn required(&self, bucket: TimeOfDay) -> i32 {
        match bucket {
            TimeOfDay::Daytime => self.daytime_required,
            TimeOfDay::Nighttime => self.nighttime_required,
        }
    }
}

/// Employé, avec ses bornes horaires sur la période (en heures).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub works_shifts: Vec<ShiftTypeId>,
    pub min_hours: i32,
    pub max_hours: i32,
    pub target_hours: i32,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unavailable_days: BTreeSet<u32>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub avoid_days: BTreeSet<u32>,
    #[serde(default)]
    pub role: Option<RoleId>,
    /// Solde d'heures reporté des périodes précédentes.
    #[serde(default)]
    pub flextime_balance_hours: i32,
}

impl Employee {
    pub fn new<N: Into<String>>(id: EmployeeId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            works_shifts: Vec::new(),
            min_hours: 0,
            max_hours: 0,
            target_hours: 0,
            unavailable_days: BTreeSet::new(),
            avoid_days: BTreeSet::new(),
            role: None,
            flextime_balance_hours: 0,
        }
    }

    pub fn with_shifts<I: IntoIterator<Item = ShiftTypeId>>(mut self, shifts: I) -> Self {
        self.works_shifts = shifts.into_iter().collect();
        self
    }

    pub fn with_hours(mut self, min: i32, max: i32, target: i32) -> Self {
        self.min_hours = min;
        self.max_hours = max;
        self.target_hours = target;
        self
    }

    pub fn with_unavailable<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.unavailable_days = days.into_iter().collect();
        self
    }

    pub fn with_avoid<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.avoid_days = days.into_iter().collect();
        self
    }

    pub fn with_role(mut self, role: RoleId) -> Self {
        self.role = Some(role);
        self
    }
}

/// Surcharge d'effectif pour un jour donné (global si `role` est absent).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingOverride {
    pub day: u32,
    #[serde(default)]
    pub role: Option<RoleId>,
    #[serde(default)]
    pub daytime_required: Option<i32>,
    #[serde(default)]
    pub nighttime_required: Option<i32>,
}

impl StaffingOverride {
    pub fn required(&self, bucket: TimeOfDay) -> Option<i32> {
        match bucket {
            TimeOfDay::Daytime => self.daytime_required,
            TimeOfDay::Nighttime => self.nighttime_required,
        }
    }
}

/// Contraintes dures globales d'une résolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardConstraints {
    /// `a -> b` : `b` interdit le lendemain d'un `a`.
    #[serde(default)]
    pub shift_off_shift: BTreeMap<ShiftTypeId, ShiftTypeId>,
    #[serde(default)]
    pub daytime_required_roles: BTreeMap<RoleId, i32>,
    #[serde(default)]
    pub nighttime_required_roles: BTreeMap<RoleId, i32>,
    #[serde(default)]
    pub daytime_required_people: i32,
    #[serde(default)]
    pub nighttime_required_people: i32,
    #[serde(default)]
    pub allowed_flextime_total: i32,
    #[serde(default)]
    pub allowed_flextime_per_month: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub day_overrides: Vec<StaffingOverride>,
    #[serde(default)]
    pub daytime: DaytimeWindow,
}

impl HardConstraints {
    pub fn required_people(&self, bucket: TimeOfDay) -> i32 {
        match bucket {
            TimeOfDay::Daytime => self.daytime_required_people,
            TimeOfDay::Nighttime => self.nighttime_required_people,
        }
    }

    pub fn required_roles(&self, bucket: TimeOfDay) -> &BTreeMap<RoleId, i32> {
        match bucket {
            TimeOfDay::Daytime => &self.daytime_required_roles,
            TimeOfDay::Nighttime => &self.nighttime_required_roles,
        }
    }
}

/// Règles de planification optionnelles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default)]
    pub min_rest_hours: Option<u16>,
    #[serde(default)]
    pub max_consecutive_days: Option<u8>,
    #[serde(default)]
    pub mandatory_off_days: Option<u16>,
    #[serde(default)]
    pub max_shift_hours: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn duration_wraps_past_midnight() {
        let late = ShiftType::new(ShiftTypeId::new("late"), "Late", t(16, 0), t(0, 0));
        assert_eq!(late.duration_minutes(), 8 * 60);
        assert!(late.spans_midnight());

        let night = ShiftType::new(ShiftTypeId::new("night"), "Night", t(22, 30), t(7, 0));
        assert_eq!(night.duration_minutes(), 8 * 60 + 30);

        let early = ShiftType::new(ShiftTypeId::new("early"), "Early", t(8, 0), t(16, 0));
        assert_eq!(early.duration_minutes(), 8 * 60);
        assert!(!early.spans_midnight());
    }

    #[test]
    fn default_window_classifies_afternoon_as_daytime() {
        let window = DaytimeWindow::default();
        assert_eq!(window.classify(t(8, 0)), TimeOfDay::Daytime);
        assert_eq!(window.classify(t(16, 0)), TimeOfDay::Daytime);
        assert_eq!(window.classify(t(20, 0)), TimeOfDay::Nighttime);
        assert_eq!(window.classify(t(2, 0)), TimeOfDay::Nighttime);
    }

    #[test]
    fn default_window_spans_six_to_twenty() {
        let window = DaytimeWindow::default();
        assert_eq!(window.start, t(6, 0));
        assert_eq!(window.end, t(20, 0));
    }

    #[test]
    fn wrapping_window_classifies_both_sides() {
        let window = DaytimeWindow {
            start: t(22, 0),
            end: t(4, 0),
        };
        assert_eq!(window.classify(t(23, 0)), TimeOfDay::Daytime);
        assert_eq!(window.classify(t(1, 0)), TimeOfDay::Daytime);
        assert_eq!(window.classify(t(12, 0)), TimeOfDay::Nighttime);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = EmployeeId::new("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"alice\"");
        assert_eq!(id.to_string(), "alice");
        assert_ne!(RoleId::random(), RoleId::random());
    }
}
