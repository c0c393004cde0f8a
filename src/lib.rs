#![forbid(unsafe_code)]
//! Shiftplan — affectation des services hospitaliers (sans BD).
//!
//! - Problème autonome (JSON) : période, types de service, rôles, employés.
//! - Recherche en profondeur avec élagage et retour arrière.
//! - Aucune contrainte dure n'est jamais violée silencieusement.
//! - Import CSV des employés, export JSON/CSV des solutions.

pub mod calendar;
pub mod io;
pub mod model;
pub mod problem;
pub mod solution;
pub mod solver;

pub use calendar::Day;
pub use model::{
    DaytimeWindow, Employee, EmployeeId, HardConstraints, Role, RoleId, Rules, ShiftType,
    ShiftTypeId, StaffingOverride, TimeOfDay,
};
pub use problem::{Problem, ProblemError};
pub use solution::{EmployeeSummary, FlextimeBreach, FlextimeScope, Objective, Solution};
pub use solver::{
    check_solution, solve, SearchMode, SearchStatistics, SolveOutcome, SolveResult, Solver,
    SolverConfig, TerminationReason, Violation, ViolationKind,
};
