//! Ingredient line model
//!
//! One ingredient of a dish with an amount and a unit, as entered.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::measure::Unit;
use crate::planner::IngredientLine;

/// A stored ingredient line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLineRecord {
    pub id: i64,
    pub dish: String,
    pub ingredient: String,
    pub amount: Option<f64>,
    pub unit: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for adding an ingredient line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLineCreate {
    pub dish: String,
    pub ingredient: String,
    pub amount: Option<f64>,
    pub unit: Unit,
}

/// Data for updating an ingredient line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientLineUpdate {
    pub dish: Option<String>,
    pub ingredient: Option<String>,
    /// `Some(None)` clears the amount
    pub amount: Option<Option<f64>>,
    pub unit: Option<Unit>,
}

impl IngredientLineRecord {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            dish: row.get("dish")?,
            ingredient: row.get("ingredient")?,
            amount: row.get("amount")?,
            unit: row.get("unit")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Convert into an engine line, rejecting unknown units
    pub fn to_line(&self) -> DbResult<IngredientLine> {
        let unit = Unit::from_str(&self.unit).ok_or_else(|| {
            DbError::Malformed(format!(
                "ingredient line {} has unknown unit '{}'",
                self.id, self.unit
            ))
        })?;
        Ok(IngredientLine {
            dish: self.dish.clone(),
            ingredient: self.ingredient.clone(),
            amount: self.amount,
            unit,
        })
    }

    /// Add an ingredient line
    pub fn create(conn: &Connection, data: &IngredientLineCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO ingredient_lines (dish, ingredient, amount, unit)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![data.dish, data.ingredient, data.amount, data.unit.as_str()],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a line by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_lines WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all lines in entry order
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredient_lines ORDER BY id")?;
        let lines = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// List the lines of one dish
    pub fn list_for_dish(conn: &Connection, dish: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM ingredient_lines WHERE dish = ?1 ORDER BY id"
        )?;
        let lines = stmt
            .query_map([dish], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    /// Update a line
    pub fn update(conn: &Connection, id: i64, data: &IngredientLineUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref dish) = data.dish {
            updates.push(format!("dish = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(dish.clone()));
        }
        if let Some(ref ingredient) = data.ingredient {
            updates.push(format!("ingredient = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(ingredient.clone()));
        }
        if let Some(amount) = data.amount {
            updates.push(format!("amount = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(amount));
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
            "UPDATE ingredient_lines SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a line
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM ingredient_lines WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// Load every line as engine input
pub fn load_lines(conn: &Connection) -> DbResult<Vec<IngredientLine>> {
    IngredientLineRecord::list(conn)?
        .iter()
        .map(IngredientLineRecord::to_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Dish, DishCreate, DishUpdate};

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn add_line(conn: &Connection, dish: &str, ingredient: &str, amount: f64, unit: Unit) -> i64 {
        IngredientLineRecord::create(
            conn,
            &IngredientLineCreate {
                dish: dish.to_string(),
                ingredient: ingredient.to_string(),
                amount: Some(amount),
                unit,
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_create_and_load() {
        let conn = conn();
        add_line(&conn, "Salad", "Lettuce", 0.5, Unit::Pounds);
        let lines = load_lines(&conn).unwrap();
        assert_eq!(lines, vec![IngredientLine::new("Salad", "Lettuce", 0.5, Unit::Pounds)]);
    }

    #[test]
    fn test_update_can_clear_amount() {
        let conn = conn();
        let id = add_line(&conn, "Salad", "Tomato", 0.3, Unit::Pounds);
        let updated = IngredientLineRecord::update(
            &conn,
            id,
            &IngredientLineUpdate {
                amount: Some(None),
                unit: Some(Unit::Kilograms),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.amount, None);
        assert_eq!(updated.unit, "Kilograms");
    }

    #[test]
    fn test_unknown_unit_is_malformed() {
        let conn = conn();
        conn.execute(
            "INSERT INTO ingredient_lines (dish, ingredient, amount, unit) VALUES ('Soup', 'Leek', 1.0, 'Bushels')",
            [],
        )
        .unwrap();
        let err = load_lines(&conn).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_dish_rename_and_delete_cascade_to_lines() {
        let conn = conn();
        let salad = Dish::create(&conn, &DishCreate { name: "Salad".into(), description: String::new() }).unwrap();
        add_line(&conn, "Salad", "Lettuce", 0.5, Unit::Pounds);
        add_line(&conn, "Soup", "Leek", 2.0, Unit::Bag);

        Dish::update(&conn, salad.id, &DishUpdate { name: Some("Green Salad".into()), description: None })
            .unwrap()
            .unwrap();
        assert_eq!(IngredientLineRecord::list_for_dish(&conn, "Green Salad").unwrap().len(), 1);
        assert!(IngredientLineRecord::list_for_dish(&conn, "Salad").unwrap().is_empty());

        let removed = Dish::delete(&conn, salad.id).unwrap();
        assert_eq!(removed, Some(1));
        let remaining = IngredientLineRecord::list(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].dish, "Soup");
    }
}
