use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Jour de la période de planification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
    pub index: u32,
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub is_weekend: bool,
    #[serde(default)]
    pub is_holiday: bool,
}

/// Construit les jours de la période. Sans date de début, les jours sont
/// anonymes (`Day 1`, `Day 2`, ...).
pub fn build_days(
    period_days: u32,
    start: Option<NaiveDate>,
    public_holidays: &[NaiveDate],
) -> Result<Vec<Day>> {
    let Some(start) = start else {
        return Ok((0..period_days)
            .map(|index| Day {
                index,
                name: format!("Day {}", index + 1),
                date: None,
                is_weekend: false,
                is_holiday: false,
            })
            .collect());
    };

    let mut days = Vec::with_capacity(period_days as usize);
    let mut current = start;
    for index in 0..period_days {
        let weekday = current.weekday();
        days.push(Day {
            index,
            name: format!("{} {}", current, short_weekday(weekday)),
            date: Some(current),
            is_weekend: matches!(weekday, Weekday::Sat | Weekday::Sun),
            is_holiday: public_holidays.contains(&current),
        });
        current = current.succ_opt().context("date overflow")?;
    }
    Ok(days)
}

fn short_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}
