//! Shopping list storage
//!
//! The generated list is saved whole, one row per position.

use rusqlite::{params, Connection, Row};

use crate::db::{DbError, DbResult};
use crate::measure::Unit;
use crate::planner::{PriceState, ShoppingList, ShoppingRow};

/// Raw stored row before unit validation
struct StoredRow {
    position: i64,
    ingredient: String,
    display_name: String,
    total_amount: f64,
    unit: String,
    unit_count: Option<i64>,
    type_of_unit: Option<String>,
    price: Option<f64>,
    price_state: String,
}

impl StoredRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            position: row.get("position")?,
            ingredient: row.get("ingredient")?,
            display_name: row.get("display_name")?,
            total_amount: row.get("total_amount")?,
            unit: row.get("unit")?,
            unit_count: row.get("unit_count")?,
            type_of_unit: row.get("type_of_unit")?,
            price: row.get("price")?,
            price_state: row.get("price_state")?,
        })
    }

    fn into_row(self) -> DbResult<ShoppingRow> {
        let malformed = |what: &str, value: &str| {
            DbError::Malformed(format!(
                "shopping row {} has unknown {} '{}'",
                self.position, what, value
            ))
        };

        let unit = Unit::from_str(&self.unit).ok_or_else(|| malformed("unit", &self.unit))?;
        let type_of_unit = match self.type_of_unit.as_deref() {
            Some(raw) => Some(Unit::from_str(raw).ok_or_else(|| malformed("unit type", raw))?),
            None => None,
        };
        let price_state = PriceState::from_str(&self.price_state)
            .ok_or_else(|| malformed("price state", &self.price_state))?;
        let unit_count = match self.unit_count {
            Some(n) => Some(u32::try_from(n).map_err(|_| malformed("unit count", &n.to_string()))?),
            None => None,
        };

        Ok(ShoppingRow {
            ingredient: self.ingredient,
            display_name: self.display_name,
            total_amount: self.total_amount,
            unit,
            unit_count,
            type_of_unit,
            price: self.price,
            price_state,
        })
    }
}

/// Load the saved shopping list
pub fn load_shopping_list(conn: &Connection) -> DbResult<ShoppingList> {
    let mut stmt = conn.prepare("SELECT * FROM shopping_rows ORDER BY position")?;
    let stored = stmt
        .query_map([], StoredRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let rows = stored
        .into_iter()
        .map(StoredRow::into_row)
        .collect::<DbResult<Vec<_>>>()?;
    Ok(ShoppingList { rows })
}

/// Replace the saved shopping list
pub fn save_shopping_list(conn: &Connection, list: &ShoppingList) -> DbResult<()> {
    conn.execute("DELETE FROM shopping_rows", [])?;
    let mut stmt = conn.prepare(
        r#"
        INSERT INTO shopping_rows
            (position, ingredient, display_name, total_amount, unit,
             unit_count, type_of_unit, price, price_state)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )?;
    for (position, row) in list.rows.iter().enumerate() {
        stmt.execute(params![
            position as i64,
            row.ingredient,
            row.display_name,
            row.total_amount,
            row.unit.as_str(),
            row.unit_count,
            row.type_of_unit.map(|u| u.as_str()),
            row.price,
            row.price_state.as_str(),
        ])?;
    }
    Ok(())
}
