//! Shopping list and price resolution
//!
//! Rows are generated from aggregated entries. Each row carries a price state
//! that decides whether a recomputation may overwrite its price.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::aggregate::AggregatedEntry;
use super::catalog::PriceCatalog;
use crate::measure::{round_money, Unit};

/// No price could be derived for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no price could be derived")]
pub struct Unresolved;

/// Shopping list edit errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("shopping row {0} does not exist")]
    RowNotFound(usize),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Who owns a row's price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PriceState {
    /// Computed from the catalog; recomputation may replace it
    #[default]
    Derived,
    /// Entered by the user; frozen until the row's quantity or unit changes
    UserSet,
}

impl PriceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceState::Derived => "derived",
            PriceState::UserSet => "user_set",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "derived" => Some(PriceState::Derived),
            "user_set" => Some(PriceState::UserSet),
            _ => None,
        }
    }
}

/// One row of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingRow {
    /// Ingredient name used for catalog lookups
    pub ingredient: String,
    /// Aggregation key, possibly with a unit suffix
    pub display_name: String,
    pub total_amount: f64,
    pub unit: Unit,
    /// How many of `type_of_unit` were bought
    pub unit_count: Option<u32>,
    pub type_of_unit: Option<Unit>,
    /// Total price, rounded to cents
    pub price: Option<f64>,
    pub price_state: PriceState,
}

impl ShoppingRow {
    pub fn from_entry(entry: &AggregatedEntry) -> Self {
        Self {
            ingredient: entry.ingredient().to_string(),
            display_name: entry.key.clone(),
            total_amount: entry.amount,
            unit: entry.unit,
            unit_count: None,
            type_of_unit: Some(entry.unit),
            price: None,
            price_state: PriceState::Derived,
        }
    }

    /// Count and unit type, when both are usable for pricing
    fn purchase(&self) -> Option<(u32, Unit)> {
        match (self.unit_count, self.type_of_unit) {
            (Some(count), Some(unit)) if count > 0 => Some((count, unit)),
            _ => None,
        }
    }

    /// Recompute a derived price; user-set prices are left alone
    fn rederive(&mut self, catalog: &PriceCatalog) {
        if self.price_state == PriceState::UserSet {
            return;
        }
        self.price = resolve_price(self, catalog).ok();
    }
}

/// Derive a row's total price from the catalog
///
/// Needs a non-zero unit count and a unit type. The catalog is asked for a
/// price per `type_of_unit`, directly or converted from a same-family unit.
pub fn resolve_price(row: &ShoppingRow, catalog: &PriceCatalog) -> Result<f64, Unresolved> {
    let (count, unit) = row.purchase().ok_or(Unresolved)?;
    let per_unit = catalog
        .price_per_unit(&row.ingredient, unit)
        .ok_or(Unresolved)?;
    Ok(round_money(per_unit * count as f64))
}

/// The generated shopping list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub rows: Vec<ShoppingRow>,
}

impl ShoppingList {
    /// Build a fresh list from aggregated entries
    pub fn generate(entries: &[AggregatedEntry]) -> Self {
        Self {
            rows: entries.iter().map(ShoppingRow::from_entry).collect(),
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn row(&self, index: usize) -> Result<&ShoppingRow, PlannerError> {
        self.rows.get(index).ok_or(PlannerError::RowNotFound(index))
    }

    fn row_mut(&mut self, index: usize) -> Result<&mut ShoppingRow, PlannerError> {
        self.rows
            .get_mut(index)
            .ok_or(PlannerError::RowNotFound(index))
    }

    pub fn remove(&mut self, index: usize) -> Result<ShoppingRow, PlannerError> {
        if index >= self.rows.len() {
            return Err(PlannerError::RowNotFound(index));
        }
        Ok(self.rows.remove(index))
    }

    /// Change how many units were bought
    ///
    /// This is the user's own quantity edit, so the row's price becomes
    /// derived again and is recomputed.
    pub fn set_unit_count(
        &mut self,
        index: usize,
        count: Option<u32>,
        catalog: &PriceCatalog,
    ) -> Result<&ShoppingRow, PlannerError> {
        let row = self.row_mut(index)?;
        row.unit_count = count;
        row.price_state = PriceState::Derived;
        row.rederive(catalog);
        Ok(&*row)
    }

    /// Change the unit the purchase is priced in
    pub fn set_unit_type(
        &mut self,
        index: usize,
        unit: Unit,
        catalog: &PriceCatalog,
    ) -> Result<&ShoppingRow, PlannerError> {
        let row = self.row_mut(index)?;
        row.type_of_unit = Some(unit);
        row.price_state = PriceState::Derived;
        row.rederive(catalog);
        Ok(&*row)
    }

    /// Set or clear the user's price for a row
    ///
    /// A price on a row with a count and unit type is an observation: the
    /// catalog learns `price / count` for that unit, and every other derived
    /// row is re-priced. Returns whether the catalog changed.
    pub fn set_price(
        &mut self,
        index: usize,
        price: Option<f64>,
        catalog: &mut PriceCatalog,
    ) -> Result<bool, PlannerError> {
        if let Some(p) = price {
            if !p.is_finite() || p < 0.0 {
                return Err(PlannerError::InvalidInput(format!(
                    "price must be a non-negative number, got {}",
                    p
                )));
            }
        }

        let row = self.row_mut(index)?;
        let Some(price) = price else {
            row.price = None;
            row.price_state = PriceState::Derived;
            row.rederive(catalog);
            return Ok(false);
        };

        row.price = Some(round_money(price));
        row.price_state = PriceState::UserSet;

        let Some((count, unit)) = row.purchase() else {
            return Ok(false);
        };
        let ingredient = row.ingredient.clone();
        catalog.record_observation(&ingredient, unit, price / count as f64);

        self.refresh_prices(catalog);
        Ok(true)
    }

    /// Re-derive every derived row against the catalog
    pub fn refresh_prices(&mut self, catalog: &PriceCatalog) {
        for row in &mut self.rows {
            if row.purchase().is_some() {
                row.rederive(catalog);
            }
        }
    }

    /// Sum of all known row prices
    pub fn total_price(&self) -> f64 {
        round_money(self.rows.iter().filter_map(|r| r.price).sum())
    }
}
