//! Menu Planner MCP Tools
//!
//! Tools for the menu, ingredient lines, the shopping list and the price
//! catalog.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::seed::reset_planner_to_sample;
use crate::db::{Database, DbResult};
use crate::measure::{format_price, format_quantity, Unit};
use crate::models::{
    load_catalog, load_lines, load_shopping_list, price_catalog, save_shopping_list, Dish,
    DishCreate, DishUpdate, IngredientLineCreate, IngredientLineRecord, IngredientLineUpdate,
    PlannerSettings,
};
use crate::planner::{aggregate, CatalogLine, PriceCatalog, PriceState, ShoppingList, ShoppingRow};

use super::export::{csv_line, dated_file_name, finish_export, join_lines, today, ExportResponse};

// ============================================================================
// Response Types
// ============================================================================

/// Dish with its line count
#[derive(Debug, Serialize)]
pub struct DishSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub line_count: usize,
}

/// Response for list_dishes
#[derive(Debug, Serialize)]
pub struct ListDishesResponse {
    pub dishes: Vec<DishSummary>,
    pub total: usize,
    pub expected_seats: i64,
}

/// Response for remove_dish
#[derive(Debug, Serialize)]
pub struct RemoveDishResponse {
    pub id: i64,
    pub name: String,
    pub lines_removed: usize,
}

/// Response for list_ingredient_lines
#[derive(Debug, Serialize)]
pub struct ListLinesResponse {
    pub lines: Vec<IngredientLineRecord>,
    pub total: usize,
}

/// A shopping row as shown to the user
#[derive(Debug, Serialize)]
pub struct ShoppingRowView {
    pub index: usize,
    pub ingredient: String,
    pub display_name: String,
    pub total_amount: f64,
    pub total_amount_display: String,
    pub unit: Unit,
    pub unit_count: Option<u32>,
    pub type_of_unit: Option<Unit>,
    pub price: Option<f64>,
    pub price_display: Option<String>,
    pub price_state: PriceState,
}

impl ShoppingRowView {
    fn new(index: usize, row: &ShoppingRow) -> Self {
        Self {
            index,
            ingredient: row.ingredient.clone(),
            display_name: row.display_name.clone(),
            total_amount: row.total_amount,
            total_amount_display: format_quantity(row.total_amount),
            unit: row.unit,
            unit_count: row.unit_count,
            type_of_unit: row.type_of_unit,
            price: row.price,
            price_display: row.price.map(format_price),
            price_state: row.price_state,
        }
    }
}

/// The shopping list as shown to the user
#[derive(Debug, Serialize)]
pub struct ShoppingListView {
    pub rows: Vec<ShoppingRowView>,
    pub row_count: usize,
    pub priced_rows: usize,
    pub total_price: f64,
}

impl ShoppingListView {
    fn new(list: &ShoppingList) -> Self {
        Self {
            rows: list
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| ShoppingRowView::new(i, row))
                .collect(),
            row_count: list.rows.len(),
            priced_rows: list.rows.iter().filter(|r| r.price.is_some()).count(),
            total_price: list.total_price(),
        }
    }
}

/// Response for generate_shopping_list
#[derive(Debug, Serialize)]
pub struct GenerateShoppingListResponse {
    pub expected_seats: i64,
    pub lines_used: usize,
    pub list: ShoppingListView,
}

/// Response for row edits
#[derive(Debug, Serialize)]
pub struct RowEditResponse {
    pub row: ShoppingRowView,
    /// Whether the edit taught the catalog a new price
    pub catalog_updated: bool,
    pub total_price: f64,
}

/// Response for list_price_catalog
#[derive(Debug, Serialize)]
pub struct ListCatalogResponse {
    pub lines: Vec<CatalogLine>,
    pub ingredient_count: usize,
}

/// Response for record_price_observation
#[derive(Debug, Serialize)]
pub struct RecordObservationResponse {
    pub ingredient: String,
    pub unit: Unit,
    pub price_per_unit: f64,
    pub prices: Vec<CatalogLine>,
    pub rows_repriced: usize,
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse a unit name, listing the valid ones on failure
pub fn parse_unit(name: &str) -> Result<Unit, String> {
    Unit::from_str(name).ok_or_else(|| {
        let valid = Unit::ALL.iter().map(|u| u.as_str()).collect::<Vec<_>>().join(", ");
        format!("Unknown unit '{}'. Valid units: {}", name, valid)
    })
}

fn check_amount(amount: Option<f64>) -> Result<(), String> {
    match amount {
        Some(a) if !a.is_finite() || a < 0.0 => {
            Err(format!("Amount must be a non-negative number, got {}", a))
        }
        _ => Ok(()),
    }
}

/// Load planner data, resetting the planner to the sample menu if it is malformed
fn load_or_reset<T>(conn: &Connection, load: impl Fn(&Connection) -> DbResult<T>) -> DbResult<T> {
    match load(conn) {
        Err(e) if e.is_malformed() => {
            tracing::warn!(error = %e, "stored planner data is malformed, restoring the sample menu");
            reset_planner_to_sample(conn)?;
            load(conn)
        }
        other => other,
    }
}

/// Load the catalog and shopping list together, so a reset never leaves one stale
fn load_planner_state(conn: &Connection) -> DbResult<(PriceCatalog, ShoppingList)> {
    load_or_reset(conn, |conn| Ok((load_catalog(conn)?, load_shopping_list(conn)?)))
}

/// Apply an edit to the stored shopping list inside one transaction
fn edit_shopping_list<T>(
    db: &Database,
    edit: impl FnOnce(&Connection, &mut ShoppingList, &mut PriceCatalog) -> Result<T, String>,
) -> Result<T, String> {
    let mut outcome = None;
    db.with_transaction(|tx| {
        let conn: &Connection = tx;
        let (mut catalog, mut list) = load_planner_state(conn)?;
        match edit(conn, &mut list, &mut catalog) {
            Ok(value) => {
                save_shopping_list(conn, &list)?;
                outcome = Some(Ok(value));
            }
            Err(message) => outcome = Some(Err(message)),
        }
        Ok(())
    })
    .map_err(|e| format!("Database error: {}", e))?;

    outcome.unwrap_or_else(|| Err("Shopping list edit did not run".to_string()))
}

// ============================================================================
// Menu Tools
// ============================================================================

/// Add a dish to the menu
pub fn add_dish(db: &Database, name: &str, description: Option<&str>) -> Result<Dish, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = DishCreate {
        name: name.trim().to_string(),
        description: description.unwrap_or_default().trim().to_string(),
    };
    Dish::create(&conn, &data).map_err(|e| format!("Failed to create dish: {}", e))
}

/// List the menu with line counts
pub fn list_dishes(db: &Database) -> Result<ListDishesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dishes = Dish::list(&conn).map_err(|e| format!("Failed to list dishes: {}", e))?;
    let settings = PlannerSettings::get_or_default(&conn)
        .map_err(|e| format!("Failed to read settings: {}", e))?;

    let mut summaries = Vec::with_capacity(dishes.len());
    for dish in dishes {
        let line_count = IngredientLineRecord::list_for_dish(&conn, &dish.name)
            .map_err(|e| format!("Failed to list ingredient lines: {}", e))?
            .len();
        summaries.push(DishSummary {
            id: dish.id,
            name: dish.name,
            description: dish.description,
            line_count,
        });
    }

    Ok(ListDishesResponse {
        total: summaries.len(),
        dishes: summaries,
        expected_seats: settings.expected_seats,
    })
}

/// Rename or re-describe a dish
pub fn update_dish(
    db: &Database,
    id: i64,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Dish>, String> {
    let data = DishUpdate {
        name: name.map(|s| s.trim().to_string()),
        description: description.map(|s| s.trim().to_string()),
    };
    db.with_transaction(|tx| Dish::update(tx, id, &data))
        .map_err(|e| format!("Failed to update dish: {}", e))
}

/// Remove a dish and its ingredient lines
pub fn remove_dish(db: &Database, id: i64) -> Result<Option<RemoveDishResponse>, String> {
    db.with_transaction(|tx| {
        let Some(dish) = Dish::get_by_id(tx, id)? else {
            return Ok(None);
        };
        let lines_removed = Dish::delete(tx, id)?.unwrap_or(0);
        Ok(Some(RemoveDishResponse {
            id,
            name: dish.name,
            lines_removed,
        }))
    })
    .map_err(|e| format!("Failed to remove dish: {}", e))
}

// ============================================================================
// Ingredient Line Tools
// ============================================================================

/// Add an ingredient line; the dish defaults to the first dish on the menu
pub fn add_ingredient_line(
    db: &Database,
    dish: Option<&str>,
    ingredient: &str,
    amount: Option<f64>,
    unit: &str,
) -> Result<IngredientLineRecord, String> {
    let unit = parse_unit(unit)?;
    check_amount(amount)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let dish = match dish.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d.to_string(),
        None => Dish::first_name(&conn)
            .map_err(|e| format!("Failed to read dishes: {}", e))?
            .unwrap_or_default(),
    };

    let data = IngredientLineCreate {
        dish,
        ingredient: ingredient.trim().to_string(),
        amount,
        unit,
    };
    IngredientLineRecord::create(&conn, &data)
        .map_err(|e| format!("Failed to add ingredient line: {}", e))
}

/// List ingredient lines, optionally for one dish
pub fn list_ingredient_lines(db: &Database, dish: Option<&str>) -> Result<ListLinesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let lines = match dish {
        Some(d) => IngredientLineRecord::list_for_dish(&conn, d.trim()),
        None => IngredientLineRecord::list(&conn),
    }
    .map_err(|e| format!("Failed to list ingredient lines: {}", e))?;

    Ok(ListLinesResponse {
        total: lines.len(),
        lines,
    })
}

/// Update an ingredient line
pub fn update_ingredient_line(
    db: &Database,
    id: i64,
    dish: Option<&str>,
    ingredient: Option<&str>,
    amount: Option<f64>,
    clear_amount: bool,
    unit: Option<&str>,
) -> Result<Option<IngredientLineRecord>, String> {
    let unit = unit.map(parse_unit).transpose()?;
    check_amount(amount)?;

    let amount = if clear_amount { Some(None) } else { amount.map(Some) };
    let data = IngredientLineUpdate {
        dish: dish.map(|s| s.trim().to_string()),
        ingredient: ingredient.map(|s| s.trim().to_string()),
        amount,
        unit,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    IngredientLineRecord::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update ingredient line: {}", e))
}

/// Remove an ingredient line
pub fn remove_ingredient_line(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    IngredientLineRecord::delete(&conn, id)
        .map_err(|e| format!("Failed to remove ingredient line: {}", e))
}

/// Set the number of expected seats (anything below 1 becomes 1)
pub fn set_expected_seats(db: &Database, seats: Option<i64>) -> Result<PlannerSettings, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    PlannerSettings::set_expected_seats(&conn, seats.unwrap_or(1))
        .map_err(|e| format!("Failed to save expected seats: {}", e))
}

// ============================================================================
// Shopping List Tools
// ============================================================================

/// Aggregate every ingredient line into a fresh shopping list
pub fn generate_shopping_list(db: &Database) -> Result<GenerateShoppingListResponse, String> {
    db.with_transaction(|tx| {
        let lines = load_or_reset(tx, load_lines)?;
        let seats = PlannerSettings::get_or_default(tx)?.expected_seats;

        let entries = aggregate(&lines, seats);
        let list = ShoppingList::generate(&entries);
        save_shopping_list(tx, &list)?;

        tracing::info!(lines = lines.len(), rows = list.rows.len(), seats, "generated shopping list");
        Ok(GenerateShoppingListResponse {
            expected_seats: seats,
            lines_used: lines.len(),
            list: ShoppingListView::new(&list),
        })
    })
    .map_err(|e| format!("Failed to generate shopping list: {}", e))
}

/// Get the current shopping list
pub fn get_shopping_list(db: &Database) -> Result<ShoppingListView, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let list = load_or_reset(&conn, load_shopping_list)
        .map_err(|e| format!("Failed to load shopping list: {}", e))?;
    Ok(ShoppingListView::new(&list))
}

/// Remove every shopping row
pub fn clear_shopping_list(db: &Database) -> Result<usize, String> {
    edit_shopping_list(db, |_, list, _| {
        let removed = list.rows.len();
        list.clear();
        Ok(removed)
    })
}

/// Remove one shopping row by index
pub fn remove_shopping_row(db: &Database, index: usize) -> Result<ShoppingRowView, String> {
    edit_shopping_list(db, |_, list, _| {
        list.remove(index)
            .map(|row| ShoppingRowView::new(index, &row))
            .map_err(|e| e.to_string())
    })
}

/// Set how many units of a row were bought
pub fn set_row_unit_count(
    db: &Database,
    index: usize,
    count: Option<u32>,
) -> Result<RowEditResponse, String> {
    edit_shopping_list(db, |_, list, catalog| {
        let row = list
            .set_unit_count(index, count, catalog)
            .map_err(|e| e.to_string())?;
        let row = ShoppingRowView::new(index, row);
        Ok(RowEditResponse {
            row,
            catalog_updated: false,
            total_price: list.total_price(),
        })
    })
}

/// Set the unit a row's purchase is priced in
pub fn set_row_unit_type(db: &Database, index: usize, unit: &str) -> Result<RowEditResponse, String> {
    let unit = parse_unit(unit)?;
    edit_shopping_list(db, |_, list, catalog| {
        let row = list
            .set_unit_type(index, unit, catalog)
            .map_err(|e| e.to_string())?;
        let row = ShoppingRowView::new(index, row);
        Ok(RowEditResponse {
            row,
            catalog_updated: false,
            total_price: list.total_price(),
        })
    })
}

/// Set or clear a row's price
///
/// With a unit count and unit type on the row, the price is recorded in the
/// catalog as `price / count` and the other derived rows are re-priced.
pub fn set_row_price(
    db: &Database,
    index: usize,
    price: Option<f64>,
) -> Result<RowEditResponse, String> {
    edit_shopping_list(db, |conn, list, catalog| {
        let catalog_updated = list
            .set_price(index, price, catalog)
            .map_err(|e| e.to_string())?;

        let row = list.row(index).map_err(|e| e.to_string())?;
        if catalog_updated {
            let prices = catalog.prices(&row.ingredient).cloned().unwrap_or_default();
            price_catalog::save_ingredient_prices(conn, &row.ingredient, &prices)
                .map_err(|e| format!("Failed to save prices: {}", e))?;
        }

        Ok(RowEditResponse {
            row: ShoppingRowView::new(index, row),
            catalog_updated,
            total_price: list.total_price(),
        })
    })
}

/// Export the shopping list as CSV
pub fn export_shopping_csv(db: &Database, output_dir: Option<&str>) -> Result<ExportResponse, String> {
    let view = get_shopping_list(db)?;

    let header = csv_line(&["Ingredient", "Total Amount", "Unit", "Unit Count", "Type of Unit", "Price"]);
    let rows = view.rows.iter().map(|row| {
        csv_line(&[
            row.display_name.clone(),
            row.total_amount_display.clone(),
            row.unit.to_string(),
            row.unit_count.map(|c| c.to_string()).unwrap_or_default(),
            row.type_of_unit.map(|u| u.to_string()).unwrap_or_default(),
            row.price_display.clone().unwrap_or_default(),
        ])
    });
    let content = join_lines(header, rows);

    finish_export(output_dir, dated_file_name("shopping_list", today()), view.row_count, content)
}

// ============================================================================
// Price Catalog Tools
// ============================================================================

/// List the price catalog, optionally for one ingredient
pub fn list_price_catalog(db: &Database, ingredient: Option<&str>) -> Result<ListCatalogResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let catalog = load_or_reset(&conn, load_catalog)
        .map_err(|e| format!("Failed to load price catalog: {}", e))?;

    let mut lines = catalog.lines();
    if let Some(name) = ingredient.map(str::trim) {
        lines.retain(|l| l.ingredient == name);
    }
    let ingredient_count = {
        let mut names: Vec<&str> = lines.iter().map(|l| l.ingredient.as_str()).collect();
        names.dedup();
        names.len()
    };

    Ok(ListCatalogResponse {
        lines,
        ingredient_count,
    })
}

/// Record an observed price and re-price the derived shopping rows
///
/// `price` paid for `quantity` of `unit` (quantity defaults to 1).
pub fn record_price_observation(
    db: &Database,
    ingredient: &str,
    unit: &str,
    price: f64,
    quantity: Option<f64>,
) -> Result<RecordObservationResponse, String> {
    let unit = parse_unit(unit)?;
    let ingredient = ingredient.trim().to_string();
    if ingredient.is_empty() {
        return Err("Ingredient name is required".to_string());
    }
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Price must be a non-negative number, got {}", price));
    }
    let quantity = quantity.unwrap_or(1.0);
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(format!("Quantity must be a positive number, got {}", quantity));
    }
    let price_per_unit = price / quantity;

    edit_shopping_list(db, |conn, list, catalog| {
        price_catalog::record_observation(conn, catalog, &ingredient, unit, price_per_unit)
            .map_err(|e| format!("Failed to record price: {}", e))?;

        let before: Vec<Option<f64>> = list.rows.iter().map(|r| r.price).collect();
        list.refresh_prices(catalog);
        let rows_repriced = list
            .rows
            .iter()
            .zip(before)
            .filter(|(row, old)| row.price != *old)
            .count();

        let prices = catalog
            .lines()
            .into_iter()
            .filter(|l| l.ingredient == ingredient)
            .collect();

        Ok(RecordObservationResponse {
            ingredient: ingredient.clone(),
            unit,
            price_per_unit,
            prices,
            rows_repriced,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::seed::ensure_seeded;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            ensure_seeded(conn)?;
            Ok(())
        })
        .unwrap();
        db
    }

    fn row_index(view: &ShoppingListView, name: &str) -> usize {
        view.rows.iter().find(|r| r.display_name == name).unwrap().index
    }

    #[test]
    fn test_generate_from_sample_menu() {
        let db = db();
        let generated = generate_shopping_list(&db).unwrap();
        assert_eq!(generated.expected_seats, 4);
        assert_eq!(generated.list.row_count, 5);

        let tomato = &generated.list.rows[row_index(&generated.list, "Tomato")];
        assert_eq!(tomato.total_amount_display, "1.2");
        assert_eq!(tomato.unit, Unit::Pounds);
        assert_eq!(tomato.price, None);
    }

    #[test]
    fn test_unit_count_prices_from_catalog() {
        let db = db();
        let list = generate_shopping_list(&db).unwrap().list;
        let lettuce = row_index(&list, "Lettuce");

        set_row_unit_type(&db, lettuce, "Ounces").unwrap();
        let edited = set_row_unit_count(&db, lettuce, Some(3)).unwrap();
        assert_eq!(edited.row.price, Some(0.38));
        assert_eq!(edited.row.price_state, PriceState::Derived);
        assert_eq!(get_shopping_list(&db).unwrap().rows[lettuce].price, Some(0.38));
    }

    #[test]
    fn test_row_price_teaches_catalog() {
        let db = db();
        let list = generate_shopping_list(&db).unwrap().list;
        let pasta = row_index(&list, "Spaghetti Pasta");

        set_row_unit_type(&db, pasta, "Kilograms").unwrap();
        set_row_unit_count(&db, pasta, Some(2)).unwrap();
        let edited = set_row_price(&db, pasta, Some(8.0)).unwrap();
        assert!(edited.catalog_updated);
        assert_eq!(edited.row.price_state, PriceState::UserSet);

        let catalog = list_price_catalog(&db, Some("Spaghetti Pasta")).unwrap();
        let per_gram = catalog.lines.iter().find(|l| l.unit == Unit::Grams).unwrap();
        assert!((per_gram.price_per_unit - 0.004).abs() < 1e-12);
    }

    #[test]
    fn test_observation_reprices_rows() {
        let db = db();
        let list = generate_shopping_list(&db).unwrap().list;
        let tomato = row_index(&list, "Tomato");
        set_row_unit_count(&db, tomato, Some(2)).unwrap();

        let recorded = record_price_observation(&db, "Tomato", "Pounds", 5.0, Some(2.0)).unwrap();
        assert_eq!(recorded.price_per_unit, 2.5);
        assert_eq!(recorded.rows_repriced, 1);
        assert_eq!(get_shopping_list(&db).unwrap().rows[tomato].price, Some(5.0));
    }

    #[test]
    fn test_remove_dish_cascades() {
        let db = db();
        let dishes = list_dishes(&db).unwrap();
        let salad = dishes.dishes.iter().find(|d| d.name == "Salad").unwrap();
        assert_eq!(salad.line_count, 3);

        let removed = remove_dish(&db, salad.id).unwrap().unwrap();
        assert_eq!(removed.lines_removed, 3);
        assert_eq!(list_ingredient_lines(&db, None).unwrap().total, 2);
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let db = db();
        let err = add_ingredient_line(&db, None, "Salt", Some(1.0), "Pinch").unwrap_err();
        assert!(err.contains("Unknown unit 'Pinch'"));
    }

    #[test]
    fn test_new_line_defaults_to_first_dish() {
        let db = db();
        let line = add_ingredient_line(&db, None, "Cucumber", None, "pounds").unwrap();
        assert_eq!(line.dish, "Salad");
        assert_eq!(line.unit, "Pounds");
        assert_eq!(line.amount, None);
    }

    #[test]
    fn test_malformed_lines_reset_to_sample() {
        let db = db();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ingredient_lines (dish, ingredient, amount, unit) VALUES ('Soup', 'Leek', 1.0, 'Bushels')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let generated = generate_shopping_list(&db).unwrap();
        assert_eq!(generated.lines_used, 5);
        assert_eq!(list_dishes(&db).unwrap().total, 2);
    }

    #[test]
    fn test_malformed_catalog_reset_before_observation() {
        let db = db();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO price_catalog (ingredient, unit, price_per_unit) VALUES ('Salt', 'Pinch', 0.1)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let recorded = record_price_observation(&db, "Tomato", "Pounds", 3.0, None).unwrap();
        assert_eq!(recorded.price_per_unit, 3.0);
        record_price_observation(&db, "Tomato", "Pounds", 4.0, None).unwrap();

        let catalog = list_price_catalog(&db, None).unwrap();
        assert!(catalog.lines.iter().all(|l| l.ingredient != "Salt"));
        let tomato = catalog
            .lines
            .iter()
            .find(|l| l.ingredient == "Tomato" && l.unit == Unit::Pounds)
            .unwrap();
        assert_eq!(tomato.price_per_unit, 4.0);
    }

    #[test]
    fn test_row_edit_after_catalog_reset_keeps_reset_list() {
        let db = db();
        generate_shopping_list(&db).unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO price_catalog (ingredient, unit, price_per_unit) VALUES ('Salt', 'Pinch', 0.1)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        assert!(set_row_unit_count(&db, 0, Some(2)).is_err());
        assert_eq!(get_shopping_list(&db).unwrap().row_count, 0);
        assert_eq!(list_price_catalog(&db, None).unwrap().ingredient_count, 5);
    }

    #[test]
    fn test_concurrent_observations_all_recorded() {
        let path = std::env::temp_dir().join(format!("chef_tools_observations_{}.db", std::process::id()));
        let remove_files = |path: &std::path::Path| {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
            }
        };
        remove_files(&path);

        let db = Database::new(&path).unwrap();
        db.with_conn(|conn| {
            run_migrations(conn)?;
            ensure_seeded(conn)?;
            Ok(())
        })
        .unwrap();
        generate_shopping_list(&db).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let db = db.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|i| {
                            let price = 1.0 + (worker * 25 + i) as f64 / 100.0;
                            record_price_observation(&db, "Tomato", "Pounds", price, None).is_err()
                        })
                        .count()
                })
            })
            .collect();
        let failed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(failed, 0);

        let catalog = list_price_catalog(&db, Some("Tomato")).unwrap();
        assert_eq!(catalog.lines.len(), 4);

        drop(db);
        remove_files(&path);
    }

    #[test]
    fn test_shopping_csv() {
        let db = db();
        generate_shopping_list(&db).unwrap();
        let export = export_shopping_csv(&db, None).unwrap();
        assert!(export.file_name.starts_with("shopping_list_"));
        assert_eq!(export.row_count, 5);
        let first = export.content.lines().next().unwrap();
        assert_eq!(first, "\"Ingredient\",\"Total Amount\",\"Unit\",\"Unit Count\",\"Type of Unit\",\"Price\"");
        assert!(export.content.contains("\"Tomato\",\"1.2\",\"Pounds\",\"\",\"Pounds\",\"\""));
    }
}
