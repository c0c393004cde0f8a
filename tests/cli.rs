#![forbid(unsafe_code)]
use assert_cmd::Command;
use chrono::{NaiveDate, NaiveTime};
use predicates::prelude::*;
use shiftplan::{Employee, EmployeeId, HardConstraints, Problem, ShiftType, ShiftTypeId, Solution};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn problem(required: i32, max_hours: i32) -> Problem {
    let day = ShiftType::new(
        ShiftTypeId::new("day"),
        "Day",
        NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
    );
    let employees = ["alice", "bob"]
        .into_iter()
        .map(|id| {
            Employee::new(EmployeeId::new(id), id)
                .with_shifts([ShiftTypeId::new("day")])
                .with_hours(0, max_hours, 40)
        })
        .collect();
    Problem::new(7, vec![day], vec![], employees)
        .with_hard_constraints(HardConstraints {
            daytime_required_people: required,
            ..HardConstraints::default()
        })
        .starting_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), vec![])
}

fn write_problem(dir: &Path, problem: &Problem) -> PathBuf {
    let path = dir.join("problem.json");
    fs::write(&path, serde_json::to_string_pretty(problem).unwrap()).unwrap();
    path
}

fn cli() -> Command {
    Command::cargo_bin("shiftplan-cli").unwrap()
}

#[test]
fn solve_exports_and_check_accepts_the_solution() {
    let dir = tempdir().unwrap();
    let problem_path = write_problem(dir.path(), &problem(1, 40));
    let json = dir.path().join("solution.json");
    let csv = dir.path().join("solution.csv");

    cli()
        .arg("--problem")
        .arg(&problem_path)
        .arg("solve")
        .arg("--out-json")
        .arg(&json)
        .arg("--out-csv")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("FEASIBLE"))
        .stdout(predicate::str::contains("alice"));

    let csv = fs::read_to_string(&csv).unwrap();
    assert!(csv.starts_with("day,date,employee,shift_type,minutes"));
    // 5 services chacun, plafonnés par les 40h maximales.
    assert_eq!(csv.lines().count(), 1 + 10);

    cli()
        .arg("--problem")
        .arg(&problem_path)
        .arg("check")
        .arg("--solution")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no violations"));
}

#[test]
fn infeasible_problem_exits_with_code_2() {
    let dir = tempdir().unwrap();
    let problem_path = write_problem(dir.path(), &problem(3, 40));
    cli()
        .arg("--problem")
        .arg(&problem_path)
        .arg("solve")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("INFEASIBLE"));
}

#[test]
fn exhausted_budget_exits_with_code_3() {
    let dir = tempdir().unwrap();
    let problem_path = write_problem(dir.path(), &problem(1, 40));
    cli()
        .args(["solve", "--node-limit", "1", "--stats"])
        .arg("--problem")
        .arg(&problem_path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("node limit of 1 reached"))
        .stderr(predicate::str::contains("Nodes explored"));
}

#[test]
fn improve_mode_balances_hours() {
    let dir = tempdir().unwrap();
    // 5 services chacun atteignent exactement la cible de 40h.
    let problem_path = write_problem(dir.path(), &problem(1, 40));
    cli()
        .arg("--problem")
        .arg(&problem_path)
        .args(["solve", "--mode", "improve"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deviation 0min"))
        .stdout(predicate::str::contains("Search exhausted"));
}

#[test]
fn check_reports_violations_to_csv() {
    let dir = tempdir().unwrap();
    let problem = problem(1, 40);
    let problem_path = write_problem(dir.path(), &problem);

    let mut solution: Solution = shiftplan::solve(&problem).unwrap().into_solution().unwrap();
    for slot in &mut solution.assignments[2] {
        *slot = None;
    }
    let solution_path = dir.path().join("tampered.json");
    fs::write(&solution_path, serde_json::to_string(&solution).unwrap()).unwrap();
    let report = dir.path().join("report.csv");

    cli()
        .arg("--problem")
        .arg(&problem_path)
        .arg("check")
        .arg("--solution")
        .arg(&solution_path)
        .arg("--report")
        .arg(&report)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Found 1 violation(s)"));

    let report = fs::read_to_string(&report).unwrap();
    assert!(report.starts_with("kind,day,employee,detail"));
    assert!(report.contains("staffing,2,,\"day global: 0 assigned, 1 required\""));
}

#[test]
fn employees_csv_is_appended_before_solving() {
    let dir = tempdir().unwrap();
    // Sans renfort, deux employés ne couvrent pas 3 personnes par jour.
    let problem_path = write_problem(dir.path(), &problem(3, 56));
    let employees = dir.path().join("employees.csv");
    fs::write(
        &employees,
        "id,name,works_shifts,min_hours,max_hours,target_hours\ncarol,Carol,day,0,56,40\n",
    )
    .unwrap();

    cli()
        .arg("--problem")
        .arg(&problem_path)
        .arg("solve")
        .arg("--employees")
        .arg(&employees)
        .assert()
        .success()
        .stdout(predicate::str::contains("carol"));
}

#[test]
fn days_prints_the_anchored_calendar() {
    let dir = tempdir().unwrap();
    let problem_path = write_problem(dir.path(), &problem(1, 40));
    cli()
        .arg("--problem")
        .arg(&problem_path)
        .arg("days")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 | 2024-01-01 Mon | "))
        .stdout(predicate::str::contains("5 | 2024-01-06 Sat | weekend"));
}

#[test]
fn invalid_problem_fails_with_context() {
    let dir = tempdir().unwrap();
    let mut bad = problem(1, 40);
    bad.employees[0].min_hours = 80;
    let problem_path = write_problem(dir.path(), &bad);
    cli()
        .arg("--problem")
        .arg(&problem_path)
        .arg("solve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("min hours 80 exceed max hours 40"));
}
