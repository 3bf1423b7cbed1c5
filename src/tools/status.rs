//! Chef Tools Status Tool
//!
//! Provides runtime status information and usage instructions.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::Database;

/// Planner and converter instructions for AI assistants
pub const PLANNER_INSTRUCTIONS: &str = r#"
# Chef Tools Instructions

Chef Tools has two calculators: a **menu planner** that turns dishes into a
priced shopping list, and an **ingredient converter** that turns metric
amounts of dry ingredients into cups, tablespoons and teaspoons.

---

## Units

| Family | Units | Converts? |
|--------|-------|-----------|
| Mass | Pounds, Ounces, Grams, Kilograms | yes, through grams |
| Volume | Liters, Milliliters, Cups | yes, through milliliters (1 cup = 240 ml) |
| Count | Bag, Case | never |

Unit names are case-insensitive (`"pounds"` works).

---

## Menu Planner Workflow

1. `list_dishes` - see the menu and the expected seats
2. `add_dish` / `update_dish` / `remove_dish` - edit the menu
   - Renaming a dish moves its ingredient lines along
   - Removing a dish removes its ingredient lines
3. `add_ingredient_line` - amount **per seat**, e.g. 0.3 Pounds of Tomato
   - `dish` defaults to the first dish on the menu
   - An ingredient line without an amount is skipped when aggregating
4. `set_expected_seats` - anything below 1 becomes 1
5. `generate_shopping_list` - replaces the shopping list

### How aggregation works

Every line's amount is multiplied by the seats. Lines for the same
ingredient are added together after converting into the unit of the first
line seen. When a unit cannot convert (Pounds vs Liters, or any Bag/Case),
it gets its own row named `"<ingredient> (<unit>)"`.

---

## Pricing Shopping Rows

Each row has a **unit count** (how many you buy), a **type of unit** (what you
buy it in) and a **price** (total for the row).

- `set_row_unit_type` and `set_row_unit_count` re-derive the price from the
  catalog: price per unit x count, converting within the family if needed.
- `set_row_price` sets the price yourself. With a count and unit type on the
  row, the catalog learns `price / count` per unit, every unit of the same
  family is back-filled, and other derived rows are re-priced.
- A price you set is never overwritten until you change the row's count or
  unit type again. Pass no price to go back to the derived one.
- Rows are addressed by `index` (0-based) as returned by `get_shopping_list`.

### Example

Lettuce is in the catalog at 2.00 per Pound. Set the row's unit type to
Ounces and count to 3: 2.00 / 453.592 x 28.3495 x 3 = **0.38**.

### Price catalog

- `list_price_catalog` - all known prices per unit
- `record_price_observation` - "I paid 5.00 for 2 Pounds of Tomato"

---

## Ingredient Converter

- `convert_ingredient` - one-off conversion; units g, kg, ml, l
- Densities are **grams per US cup** (236.588 ml). 100 g of All-Purpose
  Flour at 120 g/cup = 0.833 cup(s) | 13.33 tbsp | 40.00 tsp
- `list_densities`, `set_density` (must be positive), `delete_density`,
  `reset_densities`
- Saved rows: `add_conversion_row`, `update_conversion_row`,
  `remove_conversion_row`, `list_conversion_rows`. A row that cannot convert
  says why: "Pick ingredient", "Unknown density - add it below" or
  "Enter amount".
- `export_conversions_csv` and `export_shopping_csv` return CSV text and
  write a dated file when `output_dir` is given
- `copy_conversion_table` returns tab-separated text for pasting
- `clear_converter_data` wipes densities and rows, then restores defaults
"#;

/// Row counts of the main tables
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableCounts {
    pub dishes: i64,
    pub ingredient_lines: i64,
    pub shopping_rows: i64,
    pub catalog_prices: i64,
    pub densities: i64,
    pub conversion_rows: i64,
}

impl TableCounts {
    fn load(db: &Database) -> Option<Self> {
        db.with_conn(|conn| {
            let count = |table: &str| -> rusqlite::Result<i64> {
                conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            };
            Ok(Self {
                dishes: count("dishes")?,
                ingredient_lines: count("ingredient_lines")?,
                shopping_rows: count("shopping_rows")?,
                catalog_prices: count("price_catalog")?,
                densities: count("densities")?,
                conversion_rows: count("conversion_rows")?,
            })
        })
        .map_err(|e| tracing::warn!(error = %e, "failed to count tables for status"))
        .ok()
    }
}

/// Runtime status of the Chef Tools service
#[derive(Debug, Clone, Serialize)]
pub struct ChefStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub tables: Option<TableCounts>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> ChefStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ChefStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            tables: TableCounts::load(db),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
