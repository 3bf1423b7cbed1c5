//! Unit types and conversion constants
//!
//! The planner works with a closed set of kitchen units. Each unit belongs to
//! exactly one family, and only mass and volume units carry a canonical factor.

use serde::{Deserialize, Serialize};

/// Family a unit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitFamily {
    /// Converted through grams
    Mass,
    /// Converted through milliliters
    Volume,
    /// Bags, cases and the like - never converted
    Count,
}

/// A planner unit
///
/// Variant order is also the catalog iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Unit {
    Pounds,
    Ounces,
    Grams,
    Kilograms,
    Liters,
    Milliliters,
    Cups,
    Bag,
    Case,
}

// ============================================================================
// Mass Conversion Constants (to grams)
// ============================================================================

/// Grams per pound
pub const G_PER_LB: f64 = 453.592;
/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;

// ============================================================================
// Volume Conversion Constants (to milliliters)
// ============================================================================

/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;
/// Milliliters per planner cup (rounded kitchen cup used for shopping)
pub const ML_PER_CUP: f64 = 240.0;
/// Milliliters per US cup, used by the density converter
pub const ML_PER_US_CUP: f64 = 236.588;

impl Unit {
    /// Every unit, in display order
    pub const ALL: [Unit; 9] = [
        Unit::Pounds,
        Unit::Ounces,
        Unit::Grams,
        Unit::Kilograms,
        Unit::Liters,
        Unit::Milliliters,
        Unit::Cups,
        Unit::Bag,
        Unit::Case,
    ];

    pub fn family(&self) -> UnitFamily {
        match self {
            Unit::Pounds | Unit::Ounces | Unit::Grams | Unit::Kilograms => UnitFamily::Mass,
            Unit::Liters | Unit::Milliliters | Unit::Cups => UnitFamily::Volume,
            Unit::Bag | Unit::Case => UnitFamily::Count,
        }
    }

    /// Factor to the family's canonical unit (grams or milliliters)
    ///
    /// Count units have no factor.
    pub fn canonical_factor(&self) -> Option<f64> {
        match self {
            Unit::Pounds => Some(G_PER_LB),
            Unit::Ounces => Some(G_PER_OZ),
            Unit::Grams => Some(1.0),
            Unit::Kilograms => Some(G_PER_KG),
            Unit::Liters => Some(ML_PER_LITER),
            Unit::Milliliters => Some(1.0),
            Unit::Cups => Some(ML_PER_CUP),
            Unit::Bag | Unit::Case => None,
        }
    }

    /// Display name, also the persisted form
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Pounds => "Pounds",
            Unit::Ounces => "Ounces",
            Unit::Grams => "Grams",
            Unit::Kilograms => "Kilograms",
            Unit::Liters => "Liters",
            Unit::Milliliters => "Milliliters",
            Unit::Cups => "Cups",
            Unit::Bag => "Bag",
            Unit::Case => "Case",
        }
    }

    /// Parse from a display name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Unit::ALL
            .iter()
            .copied()
            .find(|unit| unit.as_str().to_lowercase() == lower)
    }

    /// Units sharing this unit's family, including itself
    pub fn family_members(&self) -> impl Iterator<Item = Unit> {
        let family = self.family();
        Unit::ALL.into_iter().filter(move |u| u.family() == family)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric unit accepted by the density converter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    #[default]
    G,
    Kg,
    Ml,
    L,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::G => "g",
            MetricUnit::Kg => "kg",
            MetricUnit::Ml => "ml",
            MetricUnit::L => "l",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" => Some(MetricUnit::G),
            "kg" => Some(MetricUnit::Kg),
            "ml" => Some(MetricUnit::Ml),
            "l" => Some(MetricUnit::L),
            _ => None,
        }
    }
}
