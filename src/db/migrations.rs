//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("applied schema migration v1");
    }

    tracing::debug!(version = SCHEMA_VERSION, "database schema is current");
    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- MENU
        -- Dishes and their ingredient lines. Lines reference
        -- a dish by name, the way the planner edits them.
        -- ============================================
        CREATE TABLE dishes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE ingredient_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            dish TEXT NOT NULL DEFAULT '',
            ingredient TEXT NOT NULL DEFAULT '',
            amount REAL,                         -- NULL until entered
            unit TEXT NOT NULL,                  -- "Pounds", "Cups", "Bag", ...
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_ingredient_lines_dish ON ingredient_lines(dish);

        -- ============================================
        -- PRICE CATALOG
        -- Price per one unit, per ingredient and unit
        -- ============================================
        CREATE TABLE price_catalog (
            ingredient TEXT NOT NULL,
            unit TEXT NOT NULL,
            price_per_unit REAL NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (ingredient, unit)
        );

        -- ============================================
        -- SHOPPING LIST
        -- Generated rows, kept in list order
        -- ============================================
        CREATE TABLE shopping_rows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            position INTEGER NOT NULL,
            ingredient TEXT NOT NULL,
            display_name TEXT NOT NULL,
            total_amount REAL NOT NULL,
            unit TEXT NOT NULL,
            unit_count INTEGER,
            type_of_unit TEXT,
            price REAL,
            price_state TEXT NOT NULL DEFAULT 'derived' CHECK(price_state IN ('derived', 'user_set'))
        );

        CREATE UNIQUE INDEX idx_shopping_rows_position ON shopping_rows(position);

        -- ============================================
        -- CONVERTER
        -- Densities in grams per US cup, and saved rows
        -- ============================================
        CREATE TABLE densities (
            name TEXT PRIMARY KEY,
            grams_per_cup REAL NOT NULL CHECK(grams_per_cup > 0),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE conversion_rows (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ingredient TEXT NOT NULL DEFAULT '',
            override_name TEXT NOT NULL DEFAULT '',
            amount TEXT NOT NULL DEFAULT '',     -- as entered
            unit TEXT NOT NULL DEFAULT 'g',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- SETTINGS
        -- Key/value pairs (expected seats, seed markers)
        -- ============================================
        CREATE TABLE app_settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}
