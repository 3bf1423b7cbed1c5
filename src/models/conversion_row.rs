//! Converter rows
//!
//! Saved rows of the ingredient converter. Amounts are kept as entered so a
//! half-typed value survives a reload.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::measure::{convert_by_density, DensityConversion, MetricUnit};

/// Shown when a row has no ingredient picked
pub const PICK_INGREDIENT: &str = "Pick ingredient";
/// Shown when the picked ingredient has no density
pub const UNKNOWN_DENSITY: &str = "Unknown density — add it below";
/// Shown when the amount is missing or not positive
pub const ENTER_AMOUNT: &str = "Enter amount";

/// A saved converter row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRow {
    pub id: i64,
    /// Density table name, or empty when nothing is picked
    pub ingredient: String,
    pub override_name: String,
    pub amount: String,
    pub unit: MetricUnit,
}

/// Data for adding a converter row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionRowCreate {
    #[serde(default)]
    pub ingredient: String,
    #[serde(default)]
    pub override_name: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub unit: MetricUnit,
}

/// Data for updating a converter row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionRowUpdate {
    pub ingredient: Option<String>,
    pub override_name: Option<String>,
    pub amount: Option<String>,
    pub unit: Option<MetricUnit>,
}

/// Outcome of converting one row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowConversion {
    Converted {
        display_name: String,
        conversion: DensityConversion,
        summary: String,
    },
    Pending {
        message: &'static str,
    },
}

impl RowConversion {
    /// Text of the conversions cell
    pub fn text(&self) -> String {
        match self {
            RowConversion::Converted { summary, .. } => summary.clone(),
            RowConversion::Pending { message } => message.to_string(),
        }
    }
}

/// Collapse runs of whitespace to single spaces
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl ConversionRow {
    /// Read a row, or report why it cannot be used
    fn from_row(row: &Row) -> rusqlite::Result<Result<Self, String>> {
        let id: i64 = row.get("id")?;
        let unit: String = row.get("unit")?;
        let Some(unit) = MetricUnit::from_str(&unit) else {
            return Ok(Err(format!("converter row {} has unknown unit '{}'", id, unit)));
        };
        Ok(Ok(Self {
            id,
            ingredient: row.get("ingredient")?,
            override_name: row.get("override_name")?,
            amount: row.get("amount")?,
            unit,
        }))
    }

    /// Name shown for the row: the override if given, else the ingredient
    pub fn display_name(&self) -> String {
        let name = collapse_whitespace(&self.override_name);
        if name.is_empty() {
            collapse_whitespace(&self.ingredient)
        } else {
            name
        }
    }

    /// Parsed amount, if it is a positive number
    pub fn parsed_amount(&self) -> Option<f64> {
        self.amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite() && *a > 0.0)
    }

    /// Convert the row against a density table
    pub fn resolve(&self, densities: &BTreeMap<String, f64>) -> RowConversion {
        if self.ingredient.trim().is_empty() {
            return RowConversion::Pending { message: PICK_INGREDIENT };
        }
        let Some(density) = densities.get(&self.ingredient).copied().filter(|d| *d > 0.0) else {
            return RowConversion::Pending { message: UNKNOWN_DENSITY };
        };
        let Some(amount) = self.parsed_amount() else {
            return RowConversion::Pending { message: ENTER_AMOUNT };
        };

        match convert_by_density(amount, self.unit, density) {
            Ok(conversion) => RowConversion::Converted {
                display_name: self.display_name(),
                summary: conversion.summary(),
                conversion,
            },
            Err(_) => RowConversion::Pending { message: ENTER_AMOUNT },
        }
    }

    /// Add a row
    pub fn create(conn: &Connection, data: &ConversionRowCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO conversion_rows (ingredient, override_name, amount, unit)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                data.ingredient.trim(),
                data.override_name.trim(),
                data.amount.trim(),
                data.unit.as_str()
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a row by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM conversion_rows WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(Ok(row)) => Ok(Some(row)),
            Ok(Err(reason)) => Err(DbError::Malformed(reason)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List rows in entry order, dropping any that cannot be read
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM conversion_rows ORDER BY id")?;
        let rows = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Ok(row) => Some(row),
                Err(reason) => {
                    tracing::warn!("dropping {}", reason);
                    None
                }
            })
            .collect())
    }

    /// Update a row
    pub fn update(conn: &Connection, id: i64, data: &ConversionRowUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref ingredient) = data.ingredient {
            updates.push(format!("ingredient = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(ingredient.trim().to_string()));
        }
        if let Some(ref override_name) = data.override_name {
            updates.push(format!("override_name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(override_name.trim().to_string()));
        }
        if let Some(ref amount) = data.amount {
            updates.push(format!("amount = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(amount.trim().to_string()));
        }
        if let Some(unit) = data.unit {
            updates.push(format!("unit = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(unit.as_str()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE conversion_rows SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a row
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM conversion_rows WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete every row
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM conversion_rows", [])?)
    }

    /// Unpick an ingredient on every row that uses it
    pub fn clear_ingredient(conn: &Connection, ingredient: &str) -> DbResult<usize> {
        Ok(conn.execute(
            "UPDATE conversion_rows SET ingredient = '', updated_at = datetime('now') WHERE ingredient = ?1",
            [ingredient],
        )?)
    }

    /// Add the starter row when there are no rows at all
    pub fn ensure_default(conn: &Connection) -> DbResult<Option<Self>> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM conversion_rows", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(None);
        }
        let row = Self::create(
            conn,
            &ConversionRowCreate {
                ingredient: "All-Purpose Flour".to_string(),
                override_name: String::new(),
                amount: "100".to_string(),
                unit: MetricUnit::G,
            },
        )?;
        Ok(Some(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn row(ingredient: &str, override_name: &str, amount: &str, unit: MetricUnit) -> ConversionRow {
        ConversionRow {
            id: 1,
            ingredient: ingredient.to_string(),
            override_name: override_name.to_string(),
            amount: amount.to_string(),
            unit,
        }
    }

    fn flour() -> BTreeMap<String, f64> {
        BTreeMap::from([("All-Purpose Flour".to_string(), 120.0)])
    }

    #[test]
    fn test_resolve_flour() {
        let outcome = row("All-Purpose Flour", "", "100", MetricUnit::G).resolve(&flour());
        match outcome {
            RowConversion::Converted { display_name, summary, .. } => {
                assert_eq!(display_name, "All-Purpose Flour");
                assert_eq!(summary, "0.833 cup(s) | 13.33 tbsp | 40.00 tsp (100.0 g)");
            }
            other => panic!("expected conversion, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_reason_precedence() {
        let densities = flour();
        assert_eq!(row("", "", "", MetricUnit::G).resolve(&densities).text(), PICK_INGREDIENT);
        assert_eq!(row("Cocoa", "", "abc", MetricUnit::G).resolve(&densities).text(), UNKNOWN_DENSITY);
        assert_eq!(row("All-Purpose Flour", "", "abc", MetricUnit::G).resolve(&densities).text(), ENTER_AMOUNT);
        assert_eq!(row("All-Purpose Flour", "", "-5", MetricUnit::G).resolve(&densities).text(), ENTER_AMOUNT);
    }

    #[test]
    fn test_display_name_collapses_override() {
        let r = row("All-Purpose Flour", "  Flour   for   bread ", "100", MetricUnit::G);
        assert_eq!(r.display_name(), "Flour for bread");
        assert_eq!(row("Cornmeal", "   ", "1", MetricUnit::G).display_name(), "Cornmeal");
    }

    #[test]
    fn test_default_row_only_when_empty() {
        let conn = conn();
        let created = ConversionRow::ensure_default(&conn).unwrap().unwrap();
        assert_eq!(created.ingredient, "All-Purpose Flour");
        assert_eq!(created.amount, "100");
        assert!(ConversionRow::ensure_default(&conn).unwrap().is_none());
        assert_eq!(ConversionRow::list(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_rows_are_dropped() {
        let conn = conn();
        ConversionRow::ensure_default(&conn).unwrap();
        conn.execute(
            "INSERT INTO conversion_rows (ingredient, amount, unit) VALUES ('Cornmeal', '2', 'oz')",
            [],
        )
        .unwrap();
        let rows = ConversionRow::list(&conn).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ingredient, "All-Purpose Flour");
    }

    #[test]
    fn test_update_and_clear_ingredient() {
        let conn = conn();
        let created = ConversionRow::ensure_default(&conn).unwrap().unwrap();
        let updated = ConversionRow::update(
            &conn,
            created.id,
            &ConversionRowUpdate {
                amount: Some(" 250 ".into()),
                unit: Some(MetricUnit::Ml),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.amount, "250");
        assert_eq!(updated.unit, MetricUnit::Ml);

        assert_eq!(ConversionRow::clear_ingredient(&conn, "All-Purpose Flour").unwrap(), 1);
        let cleared = ConversionRow::get_by_id(&conn, created.id).unwrap().unwrap();
        assert_eq!(cleared.resolve(&flour()).text(), PICK_INGREDIENT);
    }
}
