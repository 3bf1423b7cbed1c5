//! Quantity aggregation
//!
//! Folds recipe ingredient lines into one shopping entry per ingredient and
//! unit family, scaled by the expected number of seats.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::measure::{convert, Unit};

/// One ingredient line of a dish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub dish: String,
    pub ingredient: String,
    /// Unset while the user has not entered an amount
    pub amount: Option<f64>,
    pub unit: Unit,
}

impl IngredientLine {
    pub fn new(dish: &str, ingredient: &str, amount: f64, unit: Unit) -> Self {
        Self {
            dish: dish.to_string(),
            ingredient: ingredient.to_string(),
            amount: Some(amount),
            unit,
        }
    }
}

/// A consolidated shopping quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedEntry {
    /// Ingredient name, suffixed with " (<unit>)" when split off
    pub key: String,
    pub amount: f64,
    pub unit: Unit,
}

impl AggregatedEntry {
    /// Ingredient name without the split suffix
    pub fn ingredient(&self) -> &str {
        base_ingredient(&self.key)
    }
}

/// Key for quantities that could not merge into the ingredient's main entry
pub fn split_key(ingredient: &str, unit: Unit) -> String {
    format!("{} ({})", ingredient, unit)
}

/// Strip a trailing " (<unit>)" split suffix from an entry key
///
/// Only a known unit name counts as a suffix, so ingredient names such as
/// "Brown Sugar (packed)" keep their parenthetical.
pub fn base_ingredient(key: &str) -> &str {
    if let Some(stripped) = key.strip_suffix(')') {
        if let Some(start) = stripped.rfind(" (") {
            if Unit::from_str(&stripped[start + 2..]).is_some() {
                return &key[..start];
            }
        }
    }
    key
}

/// Aggregate ingredient lines into shopping entries
///
/// Entries come out in first-seen order. Lines with a blank ingredient or no
/// amount are skipped. A line whose unit cannot convert into the ingredient's
/// existing entry goes to a separate "<ingredient> (<unit>)" entry that only
/// collects that exact unit.
pub fn aggregate(lines: &[IngredientLine], seat_multiplier: i64) -> Vec<AggregatedEntry> {
    let seats = seat_multiplier as f64;
    let mut entries: Vec<AggregatedEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in lines {
        let ingredient = line.ingredient.as_str();
        if ingredient.trim().is_empty() {
            continue;
        }
        let Some(amount) = line.amount else {
            continue;
        };

        let scaled = amount * seats;

        let Some(&pos) = index.get(ingredient) else {
            index.insert(ingredient.to_string(), entries.len());
            entries.push(AggregatedEntry {
                key: ingredient.to_string(),
                amount: scaled,
                unit: line.unit,
            });
            continue;
        };

        let existing = &mut entries[pos];
        match convert(scaled, line.unit, existing.unit) {
            Ok(converted) => existing.amount += converted,
            Err(incompatible) => {
                tracing::debug!(ingredient, %incompatible, "splitting ingredient by unit");
                let key = split_key(ingredient, line.unit);
                match index.get(&key) {
                    Some(&split_pos) => entries[split_pos].amount += scaled,
                    None => {
                        index.insert(key.clone(), entries.len());
                        entries.push(AggregatedEntry {
                            key,
                            amount: scaled,
                            unit: line.unit,
                        });
                    }
                }
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(ingredient: &str, amount: f64, unit: Unit) -> IngredientLine {
        IngredientLine::new("Salad", ingredient, amount, unit)
    }

    #[test]
    fn test_seat_multiplier_scales_amount() {
        let entries = aggregate(&[line("Tomato", 0.3, Unit::Pounds)], 4);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "Tomato");
        assert!((entries[0].amount - 1.2).abs() < 1e-9);
        assert_eq!(entries[0].unit, Unit::Pounds);
    }

    #[test]
    fn test_same_unit_is_additive() {
        let entries = aggregate(
            &[line("Flour", 2.5, Unit::Cups), line("Flour", 1.5, Unit::Cups)],
            3,
        );
        assert_eq!(entries.len(), 1);
        assert!((entries[0].amount - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_compatible_units_convert_into_first_unit() {
        let entries = aggregate(
            &[line("Pasta", 1.0, Unit::Pounds), line("Pasta", 16.0, Unit::Ounces)],
            1,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].unit, Unit::Pounds);
        assert!((entries[0].amount - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_unit_splits() {
        let entries = aggregate(
            &[line("Onion", 2.0, Unit::Pounds), line("Onion", 1.0, Unit::Bag)],
            2,
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "Onion");
        assert_eq!(entries[1].key, "Onion (Bag)");
        assert_eq!(entries[1].ingredient(), "Onion");
        assert!((entries[1].amount - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_entry_accumulates_same_unit_only() {
        let entries = aggregate(
            &[
                line("Flour", 500.0, Unit::Grams),
                line("Flour", 1.0, Unit::Cups),
                line("Flour", 2.0, Unit::Cups),
                line("Flour", 1.0, Unit::Liters),
            ],
            1,
        );
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Flour", "Flour (Cups)", "Flour (Liters)"]);
        assert!((entries[1].amount - 3.0).abs() < 1e-9);
        assert!((entries[2].amount - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_skips_blank_and_unset_lines() {
        let mut unset = line("Salt", 0.0, Unit::Grams);
        unset.amount = None;
        let entries = aggregate(
            &[line("  ", 1.0, Unit::Grams), unset, line("Pepper", 0.0, Unit::Grams)],
            2,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "Pepper");
        assert_eq!(entries[0].amount, 0.0);
    }

    #[test]
    fn test_first_seen_order() {
        let entries = aggregate(
            &[
                line("Lettuce", 0.5, Unit::Pounds),
                line("Olive Oil", 0.05, Unit::Liters),
                line("Lettuce", 0.5, Unit::Pounds),
            ],
            1,
        );
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["Lettuce", "Olive Oil"]);
    }

    #[test]
    fn test_base_ingredient_keeps_non_unit_parenthetical() {
        assert_eq!(base_ingredient("Onion (Bag)"), "Onion");
        assert_eq!(base_ingredient("Brown Sugar (packed)"), "Brown Sugar (packed)");
        assert_eq!(base_ingredient("Brown Sugar (packed) (Cups)"), "Brown Sugar (packed)");
        assert_eq!(base_ingredient("Tomato"), "Tomato");
    }
}
