//! SQLite storage bootstrap, schema migrations and value codecs.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the tracker store.
//! - Apply schema migrations in deterministic order.
//! - Convert domain time values to and from their column encodings.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No repository reads or writes before migrations succeed.
//! - Instants are stored as epoch milliseconds of their wall-clock value;
//!   calendar dates are stored as `YYYY-MM-DD` text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
pub use rusqlite::Connection;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "tracker database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Encodes a wall-clock instant as epoch milliseconds.
pub fn instant_to_db(at: NaiveDateTime) -> i64 {
    at.and_utc().timestamp_millis()
}

/// Decodes epoch milliseconds; `None` when out of chrono's range.
pub fn instant_from_db(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|at| at.naive_utc())
}

pub fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn date_from_db(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn bool_to_db(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{date_from_db, date_to_db, instant_from_db, instant_to_db};
    use chrono::NaiveDate;

    #[test]
    fn instant_codec_keeps_wall_clock_millis() {
        let at = NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_milli_opt(8, 15, 30, 250)
            .unwrap();
        assert_eq!(instant_from_db(instant_to_db(at)), Some(at));
    }

    #[test]
    fn date_codec_uses_iso_days() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(date_to_db(date), "2024-02-29");
        assert_eq!(date_from_db("2024-02-29"), Some(date));
        assert_eq!(date_from_db("29/02/2024"), None);
    }
}
