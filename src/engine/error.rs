use chrono::Weekday;

use crate::model::weekday_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The booking sheet has zero rows; there is nothing to materialize.
    EmptyTable,
    Validation(&'static str),
    /// A selected weekday never occurs between the start and end dates.
    WeekdayOutsideRange(Weekday),
    LimitExceeded(&'static str),
    /// The requested slot is already taken on `weekday` by `order_id`.
    Conflict { weekday: Weekday, order_id: String },
    Store(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::EmptyTable => write!(f, "booking table has no rows"),
            EngineError::Validation(msg) => write!(f, "invalid booking: {msg}"),
            EngineError::WeekdayOutsideRange(day) => {
                write!(
                    f,
                    "{} does not occur between the start and end dates",
                    weekday_name(*day)
                )
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::Conflict { weekday, order_id } => {
                write!(
                    f,
                    "slot occupied on {} by booking {order_id}",
                    weekday_name(*weekday)
                )
            }
            EngineError::Store(e) => write!(f, "sheet error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
