use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::limits::{CLOSE_HOUR, OPEN_HOUR};
use crate::model::{weekday_name, Booking, Court, CustomerType};

use super::expand::{dates_in_range, dates_matching_weekday, hour_blocks};
use super::EngineError;

/// Which rows a calendar render returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarMode {
    /// Only slots that belong to a booking.
    Filtered,
    /// Every (date, hour-block) cell of the display window; cells without a
    /// booking appear as unfilled rows instead of being omitted.
    #[default]
    All,
}

/// The booking-derived part of a slot row. Absent on window-padding rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotFill {
    #[serde(rename = "OrderID")]
    pub order_id: String,
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "CustomerType")]
    pub customer_type: CustomerType,
    #[serde(rename = "CourtNumber")]
    pub court: Court,
    #[serde(rename = "Note")]
    pub note: String,
}

/// One concrete (date, hour-block) occupancy row. Derived on every render,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRow {
    #[serde(rename = "DeliverDate")]
    pub date: NaiveDate,
    #[serde(rename = "DayName")]
    pub day_name: &'static str,
    #[serde(rename = "HourBlock")]
    pub hour_block: String,
    #[serde(flatten)]
    pub fill: Option<SlotFill>,
}

/// Explode every booking into per-(date, hour-block) slot rows.
///
/// Each booking contributes the cross product of the concrete dates matching
/// its weekday set within `[start_date, end_date]` and the hour blocks in
/// `[start_time, end_time)`. Rows are sorted by (order id, date, block).
/// In `All` mode the rows are then left-joined onto the full
/// `[window_start, window_end]` × display-hours grid: grid cells with no
/// booking become unfilled rows, and slots outside the window are dropped.
pub fn materialize(
    bookings: &[Booking],
    window_start: NaiveDate,
    window_end: NaiveDate,
    mode: CalendarMode,
) -> Result<Vec<SlotRow>, EngineError> {
    if bookings.is_empty() {
        return Err(EngineError::EmptyTable);
    }

    let mut filled: Vec<SlotRow> = Vec::new();
    for booking in bookings {
        let order_id = booking.order_id();
        let blocks = hour_blocks(booking.start_time, booking.end_time);
        for weekday in booking.day_of_week.iter() {
            for date in dates_matching_weekday(booking.start_date, booking.end_date, weekday) {
                for block in &blocks {
                    filled.push(SlotRow {
                        date,
                        day_name: weekday_name(weekday),
                        hour_block: block.clone(),
                        fill: Some(SlotFill {
                            order_id: order_id.clone(),
                            customer_id: booking.customer_id.clone(),
                            customer_type: booking.customer_type,
                            court: booking.court,
                            note: booking.note.clone(),
                        }),
                    });
                }
            }
        }
    }

    filled.sort_by(|a, b| {
        let ka = a.fill.as_ref().map(|f| f.order_id.as_str());
        let kb = b.fill.as_ref().map(|f| f.order_id.as_str());
        ka.cmp(&kb)
            .then_with(|| a.date.cmp(&b.date))
            .then_with(|| a.hour_block.cmp(&b.hour_block))
    });

    match mode {
        CalendarMode::Filtered => Ok(filled),
        CalendarMode::All => {
            let blocks = hour_blocks(OPEN_HOUR, CLOSE_HOUR);
            let mut rows = Vec::new();
            for date in dates_in_range(window_start, window_end, &[]) {
                for block in &blocks {
                    let mut matched = false;
                    for row in &filled {
                        if row.date == date && row.hour_block == *block {
                            rows.push(row.clone());
                            matched = true;
                        }
                    }
                    if !matched {
                        rows.push(SlotRow {
                            date,
                            day_name: weekday_name(date.weekday()),
                            hour_block: block.clone(),
                            fill: None,
                        });
                    }
                }
            }
            Ok(rows)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeekdaySet;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn booking(days: Vec<Weekday>, s: u32, e: u32, court: Court) -> Booking {
        Booking {
            order_time: d(2024, 6, 1),
            customer_id: "alice".into(),
            customer_type: CustomerType::Regular,
            start_time: s,
            end_time: e,
            start_date: d(2024, 6, 3),
            end_date: d(2024, 6, 9),
            day_of_week: WeekdaySet::new(days),
            court,
            note: String::new(),
        }
    }

    #[test]
    fn one_booking_expands_to_weekday_hour_cross_product() {
        // Mon 2024-06-03 .. Sun 2024-06-09, Monday+Wednesday, 8-10, C_1.
        let table = vec![booking(vec![Weekday::Mon, Weekday::Wed], 8, 10, Court::C1)];
        let rows = materialize(&table, d(2024, 6, 1), d(2024, 6, 30), CalendarMode::Filtered)
            .unwrap();

        let got: Vec<(NaiveDate, &str)> = rows
            .iter()
            .map(|r| (r.date, r.hour_block.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (d(2024, 6, 3), "08-09"),
                (d(2024, 6, 3), "09-10"),
                (d(2024, 6, 5), "08-09"),
                (d(2024, 6, 5), "09-10"),
            ]
        );
        for row in &rows {
            let fill = row.fill.as_ref().unwrap();
            assert_eq!(fill.court, Court::C1);
            assert_eq!(fill.customer_id, "alice");
            assert_eq!(fill.order_id, table[0].order_id());
        }
        assert_eq!(rows[0].day_name, "Monday");
        assert_eq!(rows[2].day_name, "Wednesday");
    }

    #[test]
    fn rows_sort_by_order_id_then_date_then_block() {
        let a = booking(vec![Weekday::Mon], 8, 10, Court::C1);
        let b = booking(vec![Weekday::Mon], 8, 10, Court::C2);
        let table = vec![a.clone(), b.clone()];
        let rows =
            materialize(&table, d(2024, 6, 1), d(2024, 6, 30), CalendarMode::Filtered).unwrap();

        let keys: Vec<(String, NaiveDate, String)> = rows
            .iter()
            .map(|r| {
                (
                    r.fill.as_ref().unwrap().order_id.clone(),
                    r.date,
                    r.hour_block.clone(),
                )
            })
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn materialization_is_idempotent() {
        let table = vec![
            booking(vec![Weekday::Mon, Weekday::Wed], 8, 10, Court::C1),
            booking(vec![Weekday::Sat], 6, 12, Court::C3),
        ];
        let first =
            materialize(&table, d(2024, 6, 1), d(2024, 6, 30), CalendarMode::All).unwrap();
        let second =
            materialize(&table, d(2024, 6, 1), d(2024, 6, 30), CalendarMode::All).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_table_is_rejected() {
        let err =
            materialize(&[], d(2024, 6, 1), d(2024, 6, 30), CalendarMode::All).unwrap_err();
        assert_eq!(err, EngineError::EmptyTable);
    }

    #[test]
    fn all_mode_pads_every_window_cell() {
        let table = vec![booking(vec![Weekday::Mon], 8, 9, Court::C1)];
        // One-week window: 7 days x 17 display blocks, one cell filled.
        let rows =
            materialize(&table, d(2024, 6, 3), d(2024, 6, 9), CalendarMode::All).unwrap();
        assert_eq!(rows.len(), 7 * 17);
        let filled: Vec<_> = rows.iter().filter(|r| r.fill.is_some()).collect();
        assert_eq!(filled.len(), 1);
        assert_eq!(filled[0].date, d(2024, 6, 3));
        assert_eq!(filled[0].hour_block, "08-09");
    }

    #[test]
    fn all_mode_drops_slots_outside_window() {
        let table = vec![booking(vec![Weekday::Mon], 8, 9, Court::C1)];
        // Window in July; the booking only materializes in early June.
        let rows =
            materialize(&table, d(2024, 7, 1), d(2024, 7, 7), CalendarMode::All).unwrap();
        assert!(rows.iter().all(|r| r.fill.is_none()));
        assert_eq!(rows.len(), 7 * 17);
    }

    #[test]
    fn filtered_mode_ignores_window() {
        let table = vec![booking(vec![Weekday::Mon], 8, 9, Court::C1)];
        let rows =
            materialize(&table, d(2024, 7, 1), d(2024, 7, 7), CalendarMode::Filtered).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, d(2024, 6, 3));
    }

    #[test]
    fn two_bookings_share_a_padded_cell() {
        let table = vec![
            booking(vec![Weekday::Mon], 8, 9, Court::C1),
            booking(vec![Weekday::Mon], 8, 9, Court::C2),
        ];
        let rows =
            materialize(&table, d(2024, 6, 3), d(2024, 6, 3), CalendarMode::All).unwrap();
        // 17 grid cells; the 08-09 cell has two rows.
        assert_eq!(rows.len(), 17 + 1);
        let in_cell: Vec<_> = rows.iter().filter(|r| r.hour_block == "08-09").collect();
        assert_eq!(in_cell.len(), 2);
        assert!(in_cell.iter().all(|r| r.fill.is_some()));
    }
}
