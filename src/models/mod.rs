//! Data models
//!
//! Rust structs and storage helpers for the planner and converter tables.

mod conversion_row;
mod density;
mod dish;
mod ingredient_line;
pub mod price_catalog;
pub mod settings;
pub mod shopping_row;

pub use conversion_row::{
    ConversionRow, ConversionRowCreate, ConversionRowUpdate, RowConversion,
    ENTER_AMOUNT, PICK_INGREDIENT, UNKNOWN_DENSITY,
};
pub use density::Density;
pub use dish::{Dish, DishCreate, DishUpdate};
pub use ingredient_line::{
    load_lines, IngredientLineCreate, IngredientLineRecord, IngredientLineUpdate,
};
pub use price_catalog::{load_catalog, save_catalog};
pub use settings::{normalize_seats, PlannerSettings};
pub use shopping_row::{load_shopping_list, save_shopping_list};
