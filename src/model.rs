use std::fmt;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Monday-first, matching `Weekday::num_days_from_monday`.
const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAY_NAMES[day.num_days_from_monday() as usize]
}

/// Parse one canonical weekday name. Abbreviations are not accepted —
/// the persisted format stores full names only.
pub fn parse_weekday(name: &str) -> Option<Weekday> {
    WEEKDAY_NAMES
        .iter()
        .position(|n| *n == name)
        .map(|i| WEEKDAYS[i])
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownWeekday(pub String);

impl fmt::Display for UnknownWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown weekday: {}", self.0)
    }
}

impl std::error::Error for UnknownWeekday {}

/// Ordered set of weekdays, persisted as underscore-joined names
/// (`"Monday_Wednesday"`). Order is whatever the client sent; membership is
/// exact token equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekdaySet(Vec<Weekday>);

impl WeekdaySet {
    pub fn new(days: Vec<Weekday>) -> Self {
        Self(days)
    }

    /// Parse the underscore-joined form. The empty string is the empty set.
    pub fn parse(joined: &str) -> Result<Self, UnknownWeekday> {
        if joined.is_empty() {
            return Ok(Self::default());
        }
        joined
            .split('_')
            .map(|token| parse_weekday(token).ok_or_else(|| UnknownWeekday(token.to_string())))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(|d| weekday_name(*d))
            .collect::<Vec<_>>()
            .join("_")
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Serialize for WeekdaySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.joined())
    }
}

impl<'de> Deserialize<'de> for WeekdaySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let joined = String::deserialize(deserializer)?;
        Self::parse(&joined).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerType {
    Regular,
    #[serde(rename = "Walk-in")]
    WalkIn,
}

/// The fixed court roster. Adding a court means adding a variant here and
/// to `ALL`; the fully-booked display threshold follows `ALL.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Court {
    #[serde(rename = "C_1")]
    C1,
    #[serde(rename = "C_2")]
    C2,
    #[serde(rename = "C_3")]
    C3,
}

impl Court {
    pub const ALL: [Court; 3] = [Court::C1, Court::C2, Court::C3];

    pub fn label(&self) -> &'static str {
        match self {
            Court::C1 => "C_1",
            Court::C2 => "C_2",
            Court::C3 => "C_3",
        }
    }
}

impl fmt::Display for Court {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One reservation, exactly as persisted on the sheet. Append-only: a
/// booking is never edited or deleted once written.
///
/// A recurring booking covers every hour block in `[start_time, end_time)`
/// on each selected weekday between `start_date` and `end_date` inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "OrderTime")]
    pub order_time: NaiveDate,
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "CustomerType")]
    pub customer_type: CustomerType,
    #[serde(rename = "StartTime")]
    pub start_time: u32,
    #[serde(rename = "EndTime")]
    pub end_time: u32,
    #[serde(rename = "StartDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "EndDate")]
    pub end_date: NaiveDate,
    #[serde(rename = "DayOfWeek")]
    pub day_of_week: WeekdaySet,
    #[serde(rename = "CourtNumber")]
    pub court: Court,
    #[serde(rename = "Note", default)]
    pub note: String,
}

impl Booking {
    /// Stable grouping key for the slots a booking expands to: `ord_` plus
    /// the first 6 hex chars of the SHA-256 of every field except
    /// `customer_type`, rendered in persisted column order. Truncation
    /// collisions are accepted — this is a display aggregation key, not a
    /// uniqueness guarantee.
    pub fn order_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.order_time.to_string());
        hasher.update(&self.customer_id);
        hasher.update(self.start_time.to_string());
        hasher.update(self.end_time.to_string());
        hasher.update(self.start_date.to_string());
        hasher.update(self.end_date.to_string());
        hasher.update(self.day_of_week.joined());
        hasher.update(self.court.label());
        hasher.update(&self.note);
        let digest = hasher.finalize();
        let mut id = String::from("ord_");
        for byte in &digest[..3] {
            id.push_str(&format!("{byte:02x}"));
        }
        id
    }
}
