//! Application settings
//!
//! Small key/value settings: the planner's expected seats and seed markers.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

const EXPECTED_SEATS_KEY: &str = "expected_seats";

/// Planner settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerSettings {
    pub expected_seats: i64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self { expected_seats: 1 }
    }
}

/// Coerce user input for seats, falling back to 1
pub fn normalize_seats(seats: Option<i64>) -> i64 {
    match seats {
        Some(n) if n >= 1 => n,
        _ => 1,
    }
}

impl PlannerSettings {
    /// Load planner settings, or `None` if never saved
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let raw = get_value(conn, EXPECTED_SEATS_KEY)?;
        Ok(raw.map(|value| Self {
            expected_seats: normalize_seats(value.trim().parse().ok()),
        }))
    }

    /// Load planner settings, defaulting when never saved
    pub fn get_or_default(conn: &Connection) -> DbResult<Self> {
        Ok(Self::get(conn)?.unwrap_or_default())
    }

    /// Save the expected seats (coerced to at least 1)
    pub fn set_expected_seats(conn: &Connection, seats: i64) -> DbResult<Self> {
        let settings = Self {
            expected_seats: normalize_seats(Some(seats)),
        };
        set_value(conn, EXPECTED_SEATS_KEY, &settings.expected_seats.to_string())?;
        Ok(settings)
    }
}

/// Read a raw setting
pub fn get_value(conn: &Connection, key: &str) -> DbResult<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM app_settings WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

/// Write a raw setting
pub fn set_value(conn: &Connection, key: &str, value: &str) -> DbResult<()> {
    conn.execute(
        r#"
        INSERT INTO app_settings (key, value) VALUES (?1, ?2)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
        params![key, value],
    )?;
    Ok(())
}
