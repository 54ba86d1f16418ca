use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime};

use crate::model::{ForecastDay, ForecastEntry, ForecastSeries};

pub const DEFAULT_FORECAST_DAYS: usize = 3;

const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reduce a 3-hour forecast series to at most `max_days` daily summaries,
/// in the order the days first appear.
pub fn summarize(series: &ForecastSeries, max_days: usize) -> Vec<ForecastDay> {
    let mut days: Vec<(String, Vec<&ForecastEntry>)> = Vec::new();

    for entry in &series.entries {
        let label = day_label(entry);
        match days.iter_mut().find(|(day, _)| *day == label) {
            Some((_, entries)) => entries.push(entry),
            None => days.push((label, vec![entry])),
        }
    }

    days.into_iter()
        .take(max_days)
        .filter_map(|(day, entries)| summarize_day(day, &entries))
        .collect()
}

fn summarize_day(day: String, entries: &[&ForecastEntry]) -> Option<ForecastDay> {
    let first = entries.first()?;

    let (min, max) = entries.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
        (lo.min(e.temperature_c), hi.max(e.temperature_c))
    });

    Some(ForecastDay {
        day,
        min_c: round1(min),
        max_c: round1(max),
        description: representative_description(entries)
            .unwrap_or_else(|| first.description.clone()),
        icon: first.icon.clone(),
    })
}

/// Most frequent description; on a tie the one seen last wins.
fn representative_description(entries: &[&ForecastEntry]) -> Option<String> {
    let mut seen: HashMap<&str, (usize, usize)> = HashMap::new();
    for (idx, e) in entries.iter().enumerate() {
        let slot = seen.entry(e.description.as_str()).or_insert((0, idx));
        slot.0 += 1;
        slot.1 = idx;
    }

    seen.into_iter()
        .max_by_key(|(_, (count, last))| (*count, *last))
        .map(|(desc, _)| desc.to_string())
}

/// "Mon, 5 Jun", from the provider's timestamp text or, failing that, `dt`.
fn day_label(entry: &ForecastEntry) -> String {
    let naive = NaiveDateTime::parse_from_str(&entry.dt_txt, DT_TXT_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::from_timestamp(entry.dt, 0).map(|dt| dt.naive_utc())
        });

    match naive {
        Some(dt) => dt.format("%a, %-d %b").to_string(),
        None => entry.dt_txt.clone(),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
