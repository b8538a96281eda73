use chrono::{Datelike, Duration, NaiveDate, Weekday};

// ── Calendar expansion primitives ────────────────────────────────

/// Labels for each one-hour block in `[start, end)`, e.g. `hour_blocks(6, 9)`
/// → `["06-07", "07-08", "08-09"]`. Pure; returns `end - start` labels when
/// `start < end`, nothing otherwise.
pub fn hour_blocks(start: u32, end: u32) -> Vec<String> {
    (start..end)
        .map(|h| {
            let next = h + 1;
            format!("{h:02}-{next:02}")
        })
        .collect()
}

/// Every date in `[start, end]` inclusive whose weekday is in `targets`,
/// ascending. An empty `targets` slice matches every weekday — callers pass
/// an empty filter to mean "no weekday filter", so don't change this to
/// mean "match nothing".
pub fn dates_in_range(start: NaiveDate, end: NaiveDate, targets: &[Weekday]) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut date = start;
    while date <= end {
        if targets.is_empty() || targets.contains(&date.weekday()) {
            dates.push(date);
        }
        date += Duration::days(1);
    }
    dates
}

/// Every date in `[start, end]` inclusive falling on `target`, ascending.
/// Finds the first occurrence at or after `start`, then steps by 7 days.
pub fn dates_matching_weekday(
    start: NaiveDate,
    end: NaiveDate,
    target: Weekday,
) -> Vec<NaiveDate> {
    let offset =
        (target.num_days_from_monday() + 7 - start.weekday().num_days_from_monday()) % 7;
    let mut date = start + Duration::days(i64::from(offset));
    let mut dates = Vec::new();
    while date <= end {
        dates.push(date);
        date += Duration::days(7);
    }
    dates
}
