//! Price catalog storage
//!
//! Persists the planner's price catalog as one row per ingredient and unit.

use rusqlite::{params, Connection};

use crate::db::{DbError, DbResult};
use crate::measure::Unit;
use crate::planner::{PriceCatalog, UnitPrices};

/// Load the whole catalog
pub fn load_catalog(conn: &Connection) -> DbResult<PriceCatalog> {
    let mut stmt = conn.prepare(
        "SELECT ingredient, unit, price_per_unit FROM price_catalog ORDER BY ingredient, unit",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut catalog = PriceCatalog::new();
    for (ingredient, unit, price) in rows {
        let unit = Unit::from_str(&unit).ok_or_else(|| {
            DbError::Malformed(format!("catalog entry for '{}' has unknown unit '{}'", ingredient, unit))
        })?;
        catalog.insert(&ingredient, unit, price);
    }
    Ok(catalog)
}

/// Replace the stored prices of one ingredient
pub fn save_ingredient_prices(conn: &Connection, ingredient: &str, prices: &UnitPrices) -> DbResult<()> {
    conn.execute("DELETE FROM price_catalog WHERE ingredient = ?1", [ingredient])?;
    let mut stmt = conn.prepare(
        "INSERT INTO price_catalog (ingredient, unit, price_per_unit) VALUES (?1, ?2, ?3)",
    )?;
    for (unit, price) in prices {
        stmt.execute(params![ingredient, unit.as_str(), price])?;
    }
    Ok(())
}

/// Replace the whole stored catalog
pub fn save_catalog(conn: &Connection, catalog: &PriceCatalog) -> DbResult<()> {
    conn.execute("DELETE FROM price_catalog", [])?;
    for (ingredient, prices) in catalog.iter() {
        save_ingredient_prices(conn, ingredient, prices)?;
    }
    Ok(())
}

/// Record a price observation against a loaded catalog and store the result
///
/// Applies the observation with family propagation, then writes the
/// ingredient's prices back. Callers load the catalog and run this inside one
/// transaction so concurrent observations for an ingredient serialize.
pub fn record_observation(
    conn: &Connection,
    catalog: &mut PriceCatalog,
    ingredient: &str,
    unit: Unit,
    price_per_unit: f64,
) -> DbResult<UnitPrices> {
    catalog.record_observation(ingredient, unit, price_per_unit);
    let prices = catalog.prices(ingredient).cloned().unwrap_or_default();
    save_ingredient_prices(conn, ingredient, &prices)?;
    Ok(prices)
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

    #[test]
    fn test_catalog_round_trip() {
        let conn = conn();
        let catalog = PriceCatalog::sample();
        save_catalog(&conn, &catalog).unwrap();
        assert_eq!(load_catalog(&conn).unwrap(), catalog);
    }

    #[test]
    fn test_record_observation_persists_family() {
        let conn = conn();
        let mut catalog = PriceCatalog::sample();
        save_catalog(&conn, &catalog).unwrap();
        let prices =
            record_observation(&conn, &mut catalog, "Spaghetti Pasta", Unit::Kilograms, 4.0).unwrap();
        assert_eq!(prices.len(), 4);

        let stored = load_catalog(&conn).unwrap();
        let per_gram = stored.price_per_unit("Spaghetti Pasta", Unit::Grams).unwrap();
        assert!((per_gram - 0.004).abs() < 1e-12);
        assert_eq!(stored.price_per_unit("Lettuce", Unit::Pounds), Some(2.0));
    }

    #[test]
    fn test_unknown_unit_is_malformed() {
        let conn = conn();
        conn.execute(
            "INSERT INTO price_catalog (ingredient, unit, price_per_unit) VALUES ('Salt', 'Pinch', 0.1)",
            [],
        )
        .unwrap();
        assert!(load_catalog(&conn).unwrap_err().is_malformed());
    }
}
