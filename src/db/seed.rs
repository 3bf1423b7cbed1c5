//! Startup data
//!
//! Fills a fresh database with the sample menu, the sample price catalog and
//! the built-in densities, and restores them on request.

use rusqlite::Connection;

use super::connection::DbResult;
use crate::measure::Unit;
use crate::models::{
    price_catalog, settings, shopping_row, ConversionRow, Density, Dish, DishCreate,
    IngredientLineCreate, IngredientLineRecord, PlannerSettings,
};
use crate::planner::{PriceCatalog, ShoppingList};

/// Set once the density table has been given its defaults
const DENSITIES_SEEDED_KEY: &str = "densities_seeded";

/// Seats in the sample menu
const SAMPLE_SEATS: i64 = 4;

const SAMPLE_DISHES: &[(&str, &str)] = &[
    ("Salad", "Fresh garden salad"),
    ("Spaghetti", "Classic pasta with tomato sauce"),
];

const SAMPLE_LINES: &[(&str, &str, f64, Unit)] = &[
    ("Salad", "Lettuce", 0.5, Unit::Pounds),
    ("Salad", "Tomato", 0.3, Unit::Pounds),
    ("Salad", "Olive Oil", 0.05, Unit::Liters),
    ("Spaghetti", "Spaghetti Pasta", 100.0, Unit::Grams),
    ("Spaghetti", "Tomato Sauce", 0.5, Unit::Liters),
];

/// What startup seeding did
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub planner_sample: bool,
    pub densities: bool,
    pub conversion_row: bool,
}

/// Seed whatever a fresh database is missing
pub fn ensure_seeded(conn: &Connection) -> DbResult<SeedReport> {
    let mut report = SeedReport::default();

    if PlannerSettings::get(conn)?.is_none() {
        reset_planner_to_sample(conn)?;
        report.planner_sample = true;
    }

    if settings::get_value(conn, DENSITIES_SEEDED_KEY)?.is_none() {
        reset_densities(conn)?;
        report.densities = true;
    }

    report.conversion_row = ConversionRow::ensure_default(conn)?.is_some();

    if report != SeedReport::default() {
        tracing::info!(
            planner_sample = report.planner_sample,
            densities = report.densities,
            conversion_row = report.conversion_row,
            "seeded startup data"
        );
    }
    Ok(report)
}

/// Replace all planner data with the sample menu and catalog
pub fn reset_planner_to_sample(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        "DELETE FROM ingredient_lines;
         DELETE FROM dishes;
         DELETE FROM shopping_rows;",
    )?;

    for (name, description) in SAMPLE_DISHES {
        Dish::create(
            conn,
            &DishCreate {
                name: name.to_string(),
                description: description.to_string(),
            },
        )?;
    }
    for (dish, ingredient, amount, unit) in SAMPLE_LINES {
        IngredientLineRecord::create(
            conn,
            &IngredientLineCreate {
                dish: dish.to_string(),
                ingredient: ingredient.to_string(),
                amount: Some(*amount),
                unit: *unit,
            },
        )?;
    }

    price_catalog::save_catalog(conn, &PriceCatalog::sample())?;
    shopping_row::save_shopping_list(conn, &ShoppingList::default())?;
    PlannerSettings::set_expected_seats(conn, SAMPLE_SEATS)?;
    Ok(())
}

/// Restore the built-in density table
pub fn reset_densities(conn: &Connection) -> DbResult<usize> {
    let count = Density::reset_to_defaults(conn)?;
    settings::set_value(conn, DENSITIES_SEEDED_KEY, "1")?;
    Ok(count)
}

/// Wipe converter densities and rows, then restore the defaults
pub fn clear_converter(conn: &Connection) -> DbResult<()> {
    ConversionRow::delete_all(conn)?;
    reset_densities(conn)?;
    ConversionRow::ensure_default(conn)?;
    Ok(())
}
