//! Ingredient densities
//!
//! Grams per US cup for dry ingredients, used by the converter.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::measure::DEFAULT_DENSITIES;

/// A stored density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Density {
    pub name: String,
    pub grams_per_cup: f64,
}

impl Density {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get("name")?,
            grams_per_cup: row.get("grams_per_cup")?,
        })
    }

    /// List all densities sorted by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT name, grams_per_cup FROM densities ORDER BY name COLLATE NOCASE"
        )?;
        let densities = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(densities)
    }

    /// Get the grams per cup for an ingredient
    pub fn get(conn: &Connection, name: &str) -> DbResult<Option<f64>> {
        let value = conn
            .query_row(
                "SELECT grams_per_cup FROM densities WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Add or overwrite a density
    ///
    /// The caller validates that `grams_per_cup` is positive; the table
    /// rejects anything else.
    pub fn upsert(conn: &Connection, name: &str, grams_per_cup: f64) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO densities (name, grams_per_cup) VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET
                grams_per_cup = excluded.grams_per_cup,
                updated_at = datetime('now')
            "#,
            params![name, grams_per_cup],
        )?;
        Ok(Self {
            name: name.to_string(),
            grams_per_cup,
        })
    }

    /// Delete a density
    pub fn delete(conn: &Connection, name: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM densities WHERE name = ?1", [name])?;
        Ok(rows > 0)
    }

    /// Replace the table with the built-in defaults
    pub fn reset_to_defaults(conn: &Connection) -> DbResult<usize> {
        conn.execute("DELETE FROM densities", [])?;
        for (name, grams_per_cup) in DEFAULT_DENSITIES {
            Self::upsert(conn, name, *grams_per_cup)?;
        }
        Ok(DEFAULT_DENSITIES.len())
    }

    /// All densities keyed by name
    pub fn as_map(conn: &Connection) -> DbResult<BTreeMap<String, f64>> {
        Ok(Self::list(conn)?
            .into_iter()
            .map(|d| (d.name, d.grams_per_cup))
            .collect())
    }
}
