//! Ingredient price catalog
//!
//! A sparse map of ingredient -> unit -> price per unit. One observed price
//! fills in every other unit of the same family.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::measure::{convert_rate, Unit, UnitFamily};

/// Prices for one ingredient, keyed by unit
pub type UnitPrices = BTreeMap<Unit, f64>;

/// Price catalog
///
/// Serializes as `{ "Lettuce": { "Pounds": 2.0 } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceCatalog {
    entries: BTreeMap<String, UnitPrices>,
}

/// A flattened catalog line for listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogLine {
    pub ingredient: String,
    pub unit: Unit,
    pub price_per_unit: f64,
}

impl PriceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the sample menu
    pub fn sample() -> Self {
        let mut catalog = Self::new();
        catalog.insert("Lettuce", Unit::Pounds, 2.0);
        catalog.insert("Tomato", Unit::Pounds, 1.5);
        catalog.insert("Olive Oil", Unit::Liters, 10.0);
        catalog.insert("Spaghetti Pasta", Unit::Grams, 0.01);
        catalog.insert("Tomato Sauce", Unit::Liters, 3.0);
        catalog
    }

    /// Set a single price without propagation
    pub fn insert(&mut self, ingredient: &str, unit: Unit, price_per_unit: f64) {
        self.entries
            .entry(ingredient.to_string())
            .or_default()
            .insert(unit, price_per_unit);
    }

    /// Prices recorded for an ingredient
    pub fn prices(&self, ingredient: &str) -> Option<&UnitPrices> {
        self.entries.get(ingredient)
    }

    /// Price per unit for an ingredient in the requested unit
    ///
    /// A direct entry wins. Otherwise the first stored unit (in unit order)
    /// whose rate converts into `unit` is used.
    pub fn price_per_unit(&self, ingredient: &str, unit: Unit) -> Option<f64> {
        let prices = self.entries.get(ingredient)?;

        if let Some(&direct) = prices.get(&unit) {
            return Some(direct);
        }

        prices
            .iter()
            .find_map(|(&stored, &price)| convert_rate(price, stored, unit).ok())
    }

    /// Record an observed price per unit and back-fill the unit's family
    ///
    /// Mass and volume observations overwrite every unit of the family with
    /// the equivalent rate. Count units only store their own price.
    pub fn record_observation(&mut self, ingredient: &str, unit: Unit, price_per_unit: f64) {
        let prices = self.entries.entry(ingredient.to_string()).or_default();
        prices.insert(unit, price_per_unit);

        if unit.family() == UnitFamily::Count {
            return;
        }

        for member in unit.family_members() {
            if let Ok(rate) = convert_rate(price_per_unit, unit, member) {
                prices.insert(member, rate);
            }
        }

        tracing::debug!(
            ingredient,
            unit = %unit,
            price_per_unit,
            "recorded price observation"
        );
    }

    /// All prices, flattened in ingredient then unit order
    pub fn lines(&self) -> Vec<CatalogLine> {
        self.entries
            .iter()
            .flat_map(|(ingredient, prices)| {
                prices.iter().map(move |(&unit, &price_per_unit)| CatalogLine {
                    ingredient: ingredient.clone(),
                    unit,
                    price_per_unit,
                })
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UnitPrices)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::units::G_PER_LB;

    #[test]
    fn test_direct_lookup() {
        let catalog = PriceCatalog::sample();
        assert_eq!(catalog.price_per_unit("Lettuce", Unit::Pounds), Some(2.0));
    }

    #[test]
    fn test_cross_unit_lookup() {
        let catalog = PriceCatalog::sample();
        let per_oz = catalog.price_per_unit("Lettuce", Unit::Ounces).unwrap();
        assert!((per_oz - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_fails_across_families() {
        let catalog = PriceCatalog::sample();
        assert_eq!(catalog.price_per_unit("Lettuce", Unit::Cups), None);
        assert_eq!(catalog.price_per_unit("Lettuce", Unit::Bag), None);
        assert_eq!(catalog.price_per_unit("Quinoa", Unit::Grams), None);
    }

    #[test]
    fn test_mass_observation_propagates_to_mass_only() {
        let mut catalog = PriceCatalog::new();
        catalog.insert("Flour", Unit::Cups, 0.5);
        catalog.insert("Flour", Unit::Bag, 4.0);
        catalog.record_observation("Flour", Unit::Grams, 0.01);

        let prices = catalog.prices("Flour").unwrap();
        assert_eq!(prices.get(&Unit::Grams), Some(&0.01));
        assert!((prices[&Unit::Pounds] - 0.01 * G_PER_LB).abs() < 1e-9);
        assert!((prices[&Unit::Ounces] - 0.283495).abs() < 1e-9);
        assert!((prices[&Unit::Kilograms] - 10.0).abs() < 1e-9);

        // Other families untouched
        assert_eq!(prices.get(&Unit::Cups), Some(&0.5));
        assert_eq!(prices.get(&Unit::Bag), Some(&4.0));
        assert_eq!(prices.get(&Unit::Liters), None);
        assert_eq!(prices.get(&Unit::Case), None);
    }

    #[test]
    fn test_observation_overwrites_family() {
        let mut catalog = PriceCatalog::sample();
        catalog.record_observation("Olive Oil", Unit::Milliliters, 0.02);
        let prices = catalog.prices("Olive Oil").unwrap();
        assert!((prices[&Unit::Liters] - 20.0).abs() < 1e-9);
        assert!((prices[&Unit::Cups] - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_count_observation_does_not_propagate() {
        let mut catalog = PriceCatalog::new();
        catalog.record_observation("Eggs", Unit::Case, 30.0);
        let prices = catalog.prices("Eggs").unwrap();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get(&Unit::Case), Some(&30.0));
    }

    #[test]
    fn test_catalog_json_shape_round_trips() {
        let catalog = PriceCatalog::sample();
        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["Lettuce"]["Pounds"], 2.0);

        let back: PriceCatalog = serde_json::from_value(json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_lines_flatten_in_order() {
        let mut catalog = PriceCatalog::new();
        catalog.insert("B", Unit::Grams, 1.0);
        catalog.insert("A", Unit::Liters, 2.0);
        catalog.insert("A", Unit::Pounds, 3.0);
        let lines = catalog.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!((lines[0].ingredient.as_str(), lines[0].unit), ("A", Unit::Pounds));
        assert_eq!((lines[1].ingredient.as_str(), lines[1].unit), ("A", Unit::Liters));
        assert_eq!((lines[2].ingredient.as_str(), lines[2].unit), ("B", Unit::Grams));
    }
}
