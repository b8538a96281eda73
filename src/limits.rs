//! Hard limits on inputs. Everything here is a rejection threshold, not a
//! tuning knob — requests beyond these bounds fail with `LimitExceeded`.

/// Earliest bookable hour (inclusive).
pub const OPEN_HOUR: u32 = 6;

/// Latest bookable hour; the last block is `"22-23"`.
pub const CLOSE_HOUR: u32 = 23;

pub const MAX_CUSTOMER_ID_LEN: usize = 128;

pub const MAX_NOTE_LEN: usize = 512;

/// Widest calendar window a single render may request, in days.
pub const MAX_WINDOW_DAYS: i64 = 366;

/// Longest accepted request line on the wire.
pub const MAX_LINE_LEN: usize = 64 * 1024;
