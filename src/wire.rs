use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};

use crate::engine::{
    CalendarMode, CalendarView, CheckView, CountPivot, Engine, EngineError, Pivot, SlotRow,
};
use crate::limits::MAX_LINE_LEN;
use crate::model::{Booking, WeekdaySet};
use crate::observability;

/// One request per line, JSON, tagged by `cmd`. The first request on a
/// connection must be `auth`.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    Auth {
        password: String,
    },
    Submit {
        booking: Booking,
    },
    Calendar {
        start: NaiveDate,
        end: NaiveDate,
        #[serde(default)]
        mode: CalendarMode,
    },
    Check {
        start: NaiveDate,
        end: NaiveDate,
        /// Empty = every hour block.
        #[serde(default)]
        hour_blocks: Vec<String>,
        /// Empty = every weekday.
        #[serde(default)]
        weekdays: WeekdaySet,
    },
    Bookings,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Booked {
        order_id: String,
    },
    Calendar {
        slots: Vec<SlotRow>,
        customers: Pivot,
        courts: Pivot,
        counts: CountPivot,
        notes: Pivot,
    },
    Check {
        counts: CountPivot,
        notes: Pivot,
    },
    Bookings {
        bookings: Vec<Booking>,
    },
    Error {
        message: String,
    },
}

type WireResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Serve one connection: password handshake, then a request/response loop.
/// Domain errors go back as `error` responses and keep the connection open;
/// protocol errors (bad framing, closed socket) end it.
pub async fn process_connection(
    socket: TcpStream,
    engine: Arc<Engine>,
    password: String,
) -> WireResult {
    let mut framed = Framed::new(socket, LinesCodec::new_with_max_length(MAX_LINE_LEN));

    // Password gate. Anything other than a correct `auth` closes the
    // connection after one error response.
    let Some(first) = framed.next().await else {
        return Ok(());
    };
    match serde_json::from_str::<Request>(&first?) {
        Ok(Request::Auth { password: supplied }) if supplied == password => {
            framed.send(serde_json::to_string(&Response::Ok)?).await?;
        }
        _ => {
            metrics::counter!(observability::AUTH_FAILURES_TOTAL).increment(1);
            let denied = Response::Error {
                message: "authentication required".into(),
            };
            framed.send(serde_json::to_string(&denied)?).await?;
            return Ok(());
        }
    }

    while let Some(line) = framed.next().await {
        let line = line?;
        let request: Request = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let bad = Response::Error {
                    message: format!("bad request: {e}"),
                };
                framed.send(serde_json::to_string(&bad)?).await?;
                continue;
            }
        };

        let label = observability::request_label(&request);
        let start = Instant::now();
        let response = handle(&engine, request).await;
        let status = if matches!(response, Response::Error { .. }) {
            "error"
        } else {
            "ok"
        };
        metrics::counter!(observability::REQUESTS_TOTAL, "cmd" => label, "status" => status)
            .increment(1);
        metrics::histogram!(observability::REQUEST_DURATION_SECONDS, "cmd" => label)
            .record(start.elapsed().as_secs_f64());

        framed.send(serde_json::to_string(&response)?).await?;
    }

    Ok(())
}

async fn handle(engine: &Engine, request: Request) -> Response {
    match request {
        Request::Auth { .. } => Response::Error {
            message: "already authenticated".into(),
        },
        Request::Submit { booking } => match engine.submit_booking(booking).await {
            Ok(order_id) => {
                metrics::counter!(observability::SUBMISSIONS_TOTAL).increment(1);
                Response::Booked { order_id }
            }
            Err(e) => {
                if matches!(e, EngineError::Conflict { .. }) {
                    metrics::counter!(observability::CONFLICTS_TOTAL).increment(1);
                }
                error_response(e)
            }
        },
        Request::Calendar { start, end, mode } => {
            match engine.render_calendar(start, end, mode).await {
                Ok(CalendarView {
                    slots,
                    customers,
                    courts,
                    counts,
                    notes,
                }) => Response::Calendar {
                    slots,
                    customers,
                    courts,
                    counts,
                    notes,
                },
                Err(e) => error_response(e),
            }
        }
        Request::Check {
            start,
            end,
            hour_blocks,
            weekdays,
        } => match engine.check_view(start, end, &hour_blocks, &weekdays).await {
            Ok(CheckView { counts, notes }) => Response::Check { counts, notes },
            Err(e) => error_response(e),
        },
        Request::Bookings => match engine.bookings().await {
            Ok(bookings) => Response::Bookings { bookings },
            Err(e) => error_response(e),
        },
    }
}

fn error_response(e: EngineError) -> Response {
    Response::Error {
        message: e.to_string(),
    }
}
