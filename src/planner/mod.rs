//! Menu planner engine
//!
//! Quantity aggregation, the price catalog, and shopping list pricing.

pub mod aggregate;
pub mod catalog;
pub mod shopping;

pub use aggregate::{aggregate, base_ingredient, AggregatedEntry, IngredientLine};
pub use catalog::{CatalogLine, PriceCatalog, UnitPrices};
pub use shopping::{resolve_price, PlannerError, PriceState, ShoppingList, ShoppingRow, Unresolved};
