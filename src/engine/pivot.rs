use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::model::weekday_name;

use super::materialize::SlotRow;

// ── Pivot grids ──────────────────────────────────────────────────

/// Date-rows × hour-block-columns grid of joined strings. `cells` is
/// aligned with `columns`; absent data is the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pivot {
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PivotRow {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub cells: Vec<String>,
}

/// Occupancy counts, zero-filled over the full grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountPivot {
    pub columns: Vec<String>,
    pub rows: Vec<CountRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub cells: Vec<u32>,
}

/// Display style for one count cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStyle {
    Available,
    Neutral,
    FullyBooked,
}

/// Three-way coloring policy: every court taken → `FullyBooked`, nothing
/// taken → `Available`, anything in between → `Neutral`. `courts` is the
/// roster size — callers pass `Court::ALL.len()`, never a literal.
pub fn cell_style(count: u32, courts: u32) -> CellStyle {
    if courts > 0 && count >= courts {
        CellStyle::FullyBooked
    } else if count == 0 {
        CellStyle::Available
    } else {
        CellStyle::Neutral
    }
}

/// Hour-block columns (sorted, which is chronological thanks to the
/// zero-padded labels) and date rows present in the slot table.
fn grid(rows: &[SlotRow]) -> (Vec<String>, Vec<NaiveDate>) {
    let columns: BTreeSet<String> = rows.iter().map(|r| r.hour_block.clone()).collect();
    let dates: BTreeSet<NaiveDate> = rows.iter().map(|r| r.date).collect();
    (columns.into_iter().collect(), dates.into_iter().collect())
}

fn join_cell(mut values: Vec<String>) -> String {
    values.sort();
    values.join(" || ")
}

fn string_pivot<F>(rows: &[SlotRow], value: F) -> Pivot
where
    F: Fn(&SlotRow) -> Option<String>,
{
    let (columns, dates) = grid(rows);
    let mut cells: HashMap<(NaiveDate, String), Vec<String>> = HashMap::new();
    for row in rows {
        if let Some(v) = value(row) {
            cells
                .entry((row.date, row.hour_block.clone()))
                .or_default()
                .push(v);
        }
    }

    let rows = dates
        .into_iter()
        .map(|date| PivotRow {
            date,
            day_name: weekday_name(date.weekday()),
            cells: columns
                .iter()
                .map(|col| {
                    cells
                        .remove(&(date, col.clone()))
                        .map(join_cell)
                        .unwrap_or_default()
                })
                .collect(),
        })
        .collect();
    Pivot { columns, rows }
}

/// Cell = sorted ` || `-joined customer IDs. Unfilled slots contribute an
/// empty string, so a padded-but-empty cell renders as `""`, not as a gap.
pub fn pivot_customers(rows: &[SlotRow]) -> Pivot {
    string_pivot(rows, |r| {
        Some(
            r.fill
                .as_ref()
                .map(|f| f.customer_id.clone())
                .unwrap_or_default(),
        )
    })
}

/// Cell = sorted ` || `-joined court labels, empty string for unfilled.
pub fn pivot_courts(rows: &[SlotRow]) -> Pivot {
    string_pivot(rows, |r| {
        Some(
            r.fill
                .as_ref()
                .map(|f| f.court.label().to_string())
                .unwrap_or_default(),
        )
    })
}

/// Cell = sorted ` || `-joined non-empty notes.
pub fn pivot_notes(rows: &[SlotRow]) -> Pivot {
    string_pivot(rows, |r| {
        r.fill
            .as_ref()
            .filter(|f| !f.note.is_empty())
            .map(|f| f.note.clone())
    })
}

/// Cell = number of bookings occupying the slot, zero-filled.
pub fn pivot_counts(rows: &[SlotRow]) -> CountPivot {
    let (columns, dates) = grid(rows);
    let mut counts: HashMap<(NaiveDate, String), u32> = HashMap::new();
    for row in rows {
        if row.fill.is_some() {
            *counts
                .entry((row.date, row.hour_block.clone()))
                .or_default() += 1;
        }
    }

    let rows = dates
        .into_iter()
        .map(|date| CountRow {
            date,
            day_name: weekday_name(date.weekday()),
            cells: columns
                .iter()
                .map(|col| counts.get(&(date, col.clone())).copied().unwrap_or(0))
                .collect(),
        })
        .collect();
    CountPivot { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Court, CustomerType};
    use crate::engine::materialize::SlotFill;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn filled(day: u32, block: &str, customer: &str, court: Court, note: &str) -> SlotRow {
        let date = d(day);
        SlotRow {
            date,
            day_name: weekday_name(date.weekday()),
            hour_block: block.into(),
            fill: Some(SlotFill {
                order_id: format!("ord_{customer}"),
                customer_id: customer.into(),
                customer_type: CustomerType::Regular,
                court,
                note: note.into(),
            }),
        }
    }

    fn padded(day: u32, block: &str) -> SlotRow {
        let date = d(day);
        SlotRow {
            date,
            day_name: weekday_name(date.weekday()),
            hour_block: block.into(),
            fill: None,
        }
    }

    #[test]
    fn customers_cell_is_sorted_and_pipe_joined() {
        let rows = vec![
            filled(3, "08-09", "zoe", Court::C1, ""),
            filled(3, "08-09", "alice", Court::C2, ""),
        ];
        let pivot = pivot_customers(&rows);
        assert_eq!(pivot.columns, vec!["08-09"]);
        assert_eq!(pivot.rows.len(), 1);
        assert_eq!(pivot.rows[0].cells[0], "alice || zoe");
        assert_eq!(pivot.rows[0].day_name, "Monday");
    }

    #[test]
    fn padded_slot_contributes_empty_string() {
        let rows = vec![padded(3, "08-09")];
        let pivot = pivot_customers(&rows);
        assert_eq!(pivot.rows[0].cells[0], "");
    }

    #[test]
    fn courts_pivot_uses_labels() {
        let rows = vec![
            filled(3, "08-09", "alice", Court::C2, ""),
            filled(3, "08-09", "bob", Court::C1, ""),
        ];
        let pivot = pivot_courts(&rows);
        assert_eq!(pivot.rows[0].cells[0], "C_1 || C_2");
    }

    #[test]
    fn notes_pivot_skips_empty_notes() {
        let rows = vec![
            filled(3, "08-09", "alice", Court::C1, "bring shuttles"),
            filled(3, "08-09", "bob", Court::C2, ""),
            padded(3, "09-10"),
        ];
        let pivot = pivot_notes(&rows);
        assert_eq!(pivot.columns, vec!["08-09", "09-10"]);
        assert_eq!(pivot.rows[0].cells, vec!["bring shuttles", ""]);
    }

    #[test]
    fn counts_are_zero_filled_over_the_grid() {
        let rows = vec![
            filled(3, "08-09", "alice", Court::C1, ""),
            filled(3, "08-09", "bob", Court::C2, ""),
            filled(4, "09-10", "carol", Court::C1, ""),
            padded(4, "08-09"),
        ];
        let pivot = pivot_counts(&rows);
        assert_eq!(pivot.columns, vec!["08-09", "09-10"]);
        assert_eq!(pivot.rows.len(), 2);
        // Jun 3: two in 08-09, none in 09-10 (not even padded).
        assert_eq!(pivot.rows[0].cells, vec![2, 0]);
        // Jun 4: padded 08-09 counts zero, one real slot in 09-10.
        assert_eq!(pivot.rows[1].cells, vec![0, 1]);
    }

    #[test]
    fn cell_style_thresholds() {
        let courts = Court::ALL.len() as u32;
        assert_eq!(cell_style(0, courts), CellStyle::Available);
        assert_eq!(cell_style(1, courts), CellStyle::Neutral);
        assert_eq!(cell_style(2, courts), CellStyle::Neutral);
        assert_eq!(cell_style(3, courts), CellStyle::FullyBooked);
    }

    #[test]
    fn cell_style_follows_roster_size() {
        // Not hardcoded to three courts.
        assert_eq!(cell_style(3, 5), CellStyle::Neutral);
        assert_eq!(cell_style(5, 5), CellStyle::FullyBooked);
        assert_eq!(cell_style(0, 5), CellStyle::Available);
    }

    #[test]
    fn columns_sort_chronologically() {
        let rows = vec![
            filled(3, "10-11", "alice", Court::C1, ""),
            filled(3, "06-07", "bob", Court::C1, ""),
            filled(3, "09-10", "carol", Court::C1, ""),
        ];
        let pivot = pivot_counts(&rows);
        assert_eq!(pivot.columns, vec!["06-07", "09-10", "10-11"]);
    }
}
