use crate::model::{Employee, EmployeeId, RoleId, ShiftTypeId};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::solver::Violation;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Charge et valide un problème JSON.
pub fn load_problem_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Problem> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let problem: Problem =
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))?;
    problem
        .validate()
        .with_context(|| format!("invalid problem in {}", path.display()))?;
    Ok(problem)
}

pub fn load_solution_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Solution> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

/// Import d'employés depuis CSV: header
/// `id,name,works_shifts,min_hours,max_hours,target_hours[,unavailable][,avoid][,role][,flextime_balance]`.
///
/// Les listes sont séparées par `;`, les jours acceptent les plages `a..b` (incluses).
pub fn import_employees_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Employee>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let id = rec.get(0).context("missing id")?.trim();
        let name = rec.get(1).context("missing name")?.trim();
        if id.is_empty() || name.is_empty() {
            bail!("invalid employee row (empty)");
        }
        let mut employee = Employee::new(EmployeeId::new(id), name);
        employee.works_shifts = split_list(rec.get(2).unwrap_or(""))
            .map(ShiftTypeId::new)
            .collect();
        employee.min_hours = parse_hours(&rec, 3, "min_hours", id)?;
        employee.max_hours = parse_hours(&rec, 4, "max_hours", id)?;
        employee.target_hours = parse_hours(&rec, 5, "target_hours", id)?;
        if let Some(days) = non_empty(&rec, 6) {
            employee.unavailable_days = parse_days(days)
                .with_context(|| format!("invalid unavailable value for employee {id}"))?;
        }
        if let Some(days) = non_empty(&rec, 7) {
            employee.avoid_days = parse_days(days)
                .with_context(|| format!("invalid avoid value for employee {id}"))?;
        }
        employee.role = non_empty(&rec, 8).map(RoleId::new);
        if let Some(balance) = non_empty(&rec, 9) {
            employee.flextime_balance_hours = balance
                .parse()
                .with_context(|| format!("invalid flextime_balance value for employee {id}"))?;
        }
        out.push(employee);
    }
    Ok(out)
}

fn non_empty(rec: &StringRecord, index: usize) -> Option<&str> {
    rec.get(index).map(str::trim).filter(|s| !s.is_empty())
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|chunk| !chunk.is_empty())
}

fn parse_hours(rec: &StringRecord, index: usize, column: &str, id: &str) -> anyhow::Result<i32> {
    let raw = non_empty(rec, index).with_context(|| format!("missing {column} for employee {id}"))?;
    raw.parse()
        .with_context(|| format!("invalid {column} value for employee {id}"))
}

fn parse_days(raw: &str) -> anyhow::Result<BTreeSet<u32>> {
    let mut days = BTreeSet::new();
    for chunk in split_list(raw) {
        if let Some((start, end)) = chunk.split_once("..") {
            let start: u32 = start.trim().parse().with_context(|| format!("invalid day: {start}"))?;
            let end: u32 = end.trim().parse().with_context(|| format!("invalid day: {end}"))?;
            if end < start {
                bail!("empty day range: {chunk}");
            }
            days.extend(start..=end);
        } else {
            days.insert(chunk.parse().with_context(|| format!("invalid day: {chunk}"))?);
        }
    }
    Ok(days)
}

/// Export JSON de la solution (jolie mise en forme), écrit de manière atomique.
pub fn export_solution_json<P: AsRef<Path>>(path: P, solution: &Solution) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_vec_pretty(solution)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| "atomic rename")?;
    Ok(())
}

/// Export CSV des affectations: header `day,date,employee,shift_type,minutes`.
/// Une ligne par service affecté, jour par jour.
pub fn export_solution_csv<P: AsRef<Path>>(
    path: P,
    problem: &Problem,
    solution: &Solution,
) -> anyhow::Result<()> {
    let file = fs::File::create(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;
    write_solution_csv(file, problem, solution)
}

pub fn write_solution_csv<W: Write>(
    writer: W,
    problem: &Problem,
    solution: &Solution,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    w.write_record(["day", "date", "employee", "shift_type", "minutes"])?;
    let mut day_buf = itoa::Buffer::new();
    let mut minutes_buf = itoa::Buffer::new();
    for (d, row) in solution.assignments.iter().enumerate() {
        let date = solution
            .days
            .get(d)
            .and_then(|day| day.date)
            .map(|date| date.to_string())
            .unwrap_or_default();
        for (employee, shift) in solution.employees.iter().zip(row) {
            let Some(shift) = shift else {
                continue;
            };
            let minutes = problem
                .shift_type(shift)
                .map(|s| s.duration_minutes())
                .with_context(|| format!("unknown shift type {shift}"))?;
            w.write_record([
                day_buf.format(d),
                date.as_str(),
                employee.as_str(),
                shift.as_str(),
                minutes_buf.format(minutes),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des violations: header `kind,day,employee,detail`.
pub fn export_violations_csv<P: AsRef<Path>>(
    path: P,
    violations: &[Violation],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["kind", "day", "employee", "detail"])?;
    let mut buf = itoa::Buffer::new();
    for v in violations {
        let day = v.day.map(|d| buf.format(d).to_owned()).unwrap_or_default();
        w.write_record([
            v.kind.as_str(),
            day.as_str(),
            v.employee.as_ref().map(|e| e.as_str()).unwrap_or(""),
            v.detail.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_lists_accept_ranges() {
        let days = parse_days("1; 3..5;9").unwrap();
        assert_eq!(days.into_iter().collect::<Vec<_>>(), vec![1, 3, 4, 5, 9]);
        assert!(parse_days("5..2").is_err());
        assert!(parse_days("x").is_err());
    }
}
