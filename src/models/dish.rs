//! Dish model
//!
//! A dish on the menu. Ingredient lines point at dishes by name.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A dish on the menu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new dish
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Data for updating a dish
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Dish {
    /// Create a Dish from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new dish into the database
    pub fn create(conn: &Connection, data: &DishCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO dishes (name, description) VALUES (?1, ?2)",
            params![data.name, data.description],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a dish by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM dishes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(dish) => Ok(Some(dish)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all dishes in menu order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM dishes ORDER BY id")?;
        let dishes = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dishes)
    }

    /// Update a dish
    ///
    /// Renaming carries the dish's ingredient lines along to the new name.
    pub fn update(conn: &Connection, id: i64, data: &DishUpdate) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        if let Some(ref name) = data.name {
            conn.execute(
                "UPDATE dishes SET name = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![name, id],
            )?;
            if *name != existing.name {
                let moved = conn.execute(
                    "UPDATE ingredient_lines SET dish = ?1, updated_at = datetime('now') WHERE dish = ?2",
                    params![name, existing.name],
                )?;
                tracing::debug!(from = %existing.name, to = %name, moved, "renamed dish");
            }
        }
        if let Some(ref description) = data.description {
            conn.execute(
                "UPDATE dishes SET description = ?1, updated_at = datetime('now') WHERE id = ?2",
                params![description, id],
            )?;
        }

        Self::get_by_id(conn, id)
    }

    /// Delete a dish and every ingredient line that belongs to it
    ///
    /// Returns the number of ingredient lines removed, or `None` if the dish
    /// did not exist.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<Option<usize>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        conn.execute("DELETE FROM dishes WHERE id = ?1", [id])?;
        let removed = conn.execute(
            "DELETE FROM ingredient_lines WHERE dish = ?1",
            [&existing.name],
        )?;
        Ok(Some(removed))
    }

    /// Name of the first dish, used as the default for new ingredient lines
    pub fn first_name(conn: &Connection) -> DbResult<Option<String>> {
        let mut stmt = conn.prepare("SELECT name FROM dishes ORDER BY id LIMIT 1")?;
        let result = stmt.query_row([], |row| row.get(0));
        match result {
            Ok(name) => Ok(Some(name)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
