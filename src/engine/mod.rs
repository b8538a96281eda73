mod conflict;
mod error;
mod expand;
mod materialize;
mod pivot;

pub use conflict::{conflicting_booking, find_conflict};
pub use error::EngineError;
pub use expand::{dates_in_range, dates_matching_weekday, hour_blocks};
pub use materialize::{materialize, CalendarMode, SlotFill, SlotRow};
pub use pivot::{
    cell_style, pivot_counts, pivot_customers, pivot_courts, pivot_notes, CellStyle, CountPivot,
    CountRow, Pivot, PivotRow,
};

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::limits::*;
use crate::model::{Booking, WeekdaySet};
use crate::sheet::BookingStore;

/// Everything a calendar page needs: the raw slot table plus the four
/// date × hour-block pivots.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub slots: Vec<SlotRow>,
    pub customers: Pivot,
    pub courts: Pivot,
    pub counts: CountPivot,
    pub notes: Pivot,
}

/// The occupancy-check view: counts (for coloring) and notes over a
/// filtered window.
#[derive(Debug, Clone, Serialize)]
pub struct CheckView {
    pub counts: CountPivot,
    pub notes: Pivot,
}

pub struct Engine {
    store: Arc<dyn BookingStore>,
    /// Serializes read-check-append so two submissions cannot both pass the
    /// conflict check against the same sheet snapshot.
    submit_lock: Mutex<()>,
}

impl Engine {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self {
            store,
            submit_lock: Mutex::new(()),
        }
    }

    fn validate(booking: &Booking) -> Result<(), EngineError> {
        if booking.customer_id.trim().is_empty() {
            return Err(EngineError::Validation("customer id is required"));
        }
        if booking.customer_id.len() > MAX_CUSTOMER_ID_LEN {
            return Err(EngineError::LimitExceeded("customer id too long"));
        }
        if booking.note.len() > MAX_NOTE_LEN {
            return Err(EngineError::LimitExceeded("note too long"));
        }
        if booking.day_of_week.is_empty() {
            return Err(EngineError::Validation("at least one weekday is required"));
        }
        if booking.start_time < OPEN_HOUR || booking.end_time > CLOSE_HOUR {
            return Err(EngineError::Validation("hours fall outside opening hours"));
        }
        if booking.end_time <= booking.start_time {
            return Err(EngineError::Validation("end time must be after start time"));
        }
        if booking.end_date < booking.start_date {
            return Err(EngineError::Validation("end date precedes start date"));
        }
        for weekday in booking.day_of_week.iter() {
            if dates_matching_weekday(booking.start_date, booking.end_date, weekday).is_empty() {
                return Err(EngineError::WeekdayOutsideRange(weekday));
            }
        }
        Ok(())
    }

    fn validate_window(start: NaiveDate, end: NaiveDate) -> Result<(), EngineError> {
        if end < start {
            return Err(EngineError::Validation("window end precedes window start"));
        }
        if (end - start).num_days() > MAX_WINDOW_DAYS {
            return Err(EngineError::LimitExceeded("calendar window too wide"));
        }
        Ok(())
    }

    async fn read_sheet(&self) -> Result<Vec<Booking>, EngineError> {
        self.store
            .read_all()
            .await
            .map_err(|e| EngineError::Store(e.to_string()))
    }

    /// Validate, re-read the sheet, check for conflicts, append. Returns the
    /// new booking's order id. Nothing is persisted on any failure.
    pub async fn submit_booking(&self, booking: Booking) -> Result<String, EngineError> {
        Self::validate(&booking)?;

        let _guard = self.submit_lock.lock().await;
        let existing = self.read_sheet().await?;
        if let Some((weekday, hit)) = find_conflict(&booking, &existing) {
            return Err(EngineError::Conflict {
                weekday,
                order_id: hit.order_id(),
            });
        }
        self.store
            .append(&booking)
            .await
            .map_err(|e| EngineError::Store(e.to_string()))?;
        tracing::info!(order_id = %booking.order_id(), customer = %booking.customer_id, "booking accepted");
        Ok(booking.order_id())
    }

    /// Materialize the sheet over `[window_start, window_end]` and build the
    /// display pivots. An empty sheet is reported as `EmptyTable` before the
    /// materializer runs.
    pub async fn render_calendar(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
        mode: CalendarMode,
    ) -> Result<CalendarView, EngineError> {
        Self::validate_window(window_start, window_end)?;
        let bookings = self.read_sheet().await?;
        if bookings.is_empty() {
            return Err(EngineError::EmptyTable);
        }
        let slots = materialize(&bookings, window_start, window_end, mode)?;
        Ok(CalendarView {
            customers: pivot_customers(&slots),
            courts: pivot_courts(&slots),
            counts: pivot_counts(&slots),
            notes: pivot_notes(&slots),
            slots,
        })
    }

    /// Occupancy check over a filtered window: restrict slots to the dates
    /// matching `weekdays` (empty set = every day) and to `blocks` (empty =
    /// every block), then pivot counts and notes.
    pub async fn check_view(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
        blocks: &[String],
        weekdays: &WeekdaySet,
    ) -> Result<CheckView, EngineError> {
        Self::validate_window(window_start, window_end)?;
        let bookings = self.read_sheet().await?;
        if bookings.is_empty() {
            return Err(EngineError::EmptyTable);
        }
        let slots = materialize(&bookings, window_start, window_end, CalendarMode::Filtered)?;

        let targets: Vec<_> = weekdays.iter().collect();
        let dates = dates_in_range(window_start, window_end, &targets);
        let rows: Vec<SlotRow> = slots
            .into_iter()
            .filter(|r| {
                dates.contains(&r.date) && (blocks.is_empty() || blocks.contains(&r.hour_block))
            })
            .collect();

        Ok(CheckView {
            counts: pivot_counts(&rows),
            notes: pivot_notes(&rows),
        })
    }

    /// The raw sheet, for export.
    pub async fn bookings(&self) -> Result<Vec<Booking>, EngineError> {
        self.read_sheet().await
    }
}
