use chrono::{NaiveDate, Weekday};

use crate::model::Booking;

/// Inclusive date ranges share at least one day.
pub(crate) fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Half-open hour ranges share at least one block. Touching endpoints
/// (one booking ends exactly when the other starts) do not overlap.
pub(crate) fn hour_ranges_overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// The existing booking occupying the candidate's slot on `weekday`, if any.
///
/// A conflict requires all four: the existing booking recurs on `weekday`,
/// its date range overlaps the candidate's, its hour range overlaps, and it
/// is on the same court.
pub fn conflicting_booking<'a>(
    candidate: &Booking,
    weekday: Weekday,
    existing: &'a [Booking],
) -> Option<&'a Booking> {
    existing.iter().find(|b| {
        b.day_of_week.contains(weekday)
            && date_ranges_overlap(
                b.start_date,
                b.end_date,
                candidate.start_date,
                candidate.end_date,
            )
            && hour_ranges_overlap(
                b.start_time,
                b.end_time,
                candidate.start_time,
                candidate.end_time,
            )
            && b.court == candidate.court
    })
}

/// Scan every weekday the candidate asks for; the first occupied one wins.
pub fn find_conflict<'a>(
    candidate: &Booking,
    existing: &'a [Booking],
) -> Option<(Weekday, &'a Booking)> {
    candidate.day_of_week.iter().find_map(|weekday| {
        conflicting_booking(candidate, weekday, existing).map(|b| (weekday, b))
    })
}
