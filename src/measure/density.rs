//! Density-based conversion
//!
//! Turns a metric amount of a dry ingredient into grams, cups, tablespoons
//! and teaspoons using the ingredient's weight per US cup.

use serde::Serialize;
use thiserror::Error;

use super::converter::round_to;
use super::units::{MetricUnit, G_PER_KG, ML_PER_LITER, ML_PER_US_CUP};

/// Tablespoons per cup
pub const TBSP_PER_CUP: f64 = 16.0;
/// Teaspoons per tablespoon
pub const TSP_PER_TBSP: f64 = 3.0;

/// Built-in densities in grams per cup
pub const DEFAULT_DENSITIES: &[(&str, f64)] = &[
    ("All-Purpose Flour", 120.0),
    ("Bread Flour", 125.0),
    ("Cake Flour", 110.0),
    ("Granulated Sugar", 200.0),
    ("Brown Sugar (packed)", 220.0),
    ("Powdered Sugar", 120.0),
    ("Kosher Salt", 145.0),
    ("Table Salt", 292.0),
    ("Baking Soda", 230.0),
    ("Baking Powder", 192.0),
    ("Instant Yeast", 150.0),
    ("Rice (uncooked)", 185.0),
    ("Quinoa (uncooked)", 170.0),
    ("Rolled Oats", 90.0),
    ("Cornmeal", 160.0),
];

/// Why a density conversion could not be made
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DensityError {
    #[error("density must be a positive number of grams per cup")]
    InvalidDensity,

    #[error("amount must be a positive number")]
    InvalidAmount,
}

/// Result of a density conversion (unrounded)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityConversion {
    pub grams: f64,
    pub cups: f64,
    pub tbsp: f64,
    pub tsp: f64,
}

impl DensityConversion {
    /// Cups rounded for display (3 decimals)
    pub fn cups_display(&self) -> String {
        format!("{:.3} cup(s)", round_to(self.cups, 3))
    }

    /// Tablespoons rounded for display (2 decimals)
    pub fn tbsp_display(&self) -> String {
        format!("{:.2} tbsp", round_to(self.tbsp, 2))
    }

    /// Teaspoons rounded for display (2 decimals)
    pub fn tsp_display(&self) -> String {
        format!("{:.2} tsp", round_to(self.tsp, 2))
    }

    /// Grams to one decimal
    pub fn grams_display(&self) -> String {
        format!("{:.1} g", self.grams)
    }

    /// One-line summary, e.g. "0.833 cup(s) | 13.33 tbsp | 40.00 tsp (100.0 g)"
    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {} ({})",
            self.cups_display(),
            self.tbsp_display(),
            self.tsp_display(),
            self.grams_display()
        )
    }
}

/// Convert a metric amount to grams and cup measures
///
/// Mass amounts go straight to grams. Volume amounts become grams through the
/// ingredient density, which is expressed per US cup.
pub fn convert_by_density(
    amount: f64,
    unit: MetricUnit,
    density_grams_per_cup: f64,
) -> Result<DensityConversion, DensityError> {
    if !density_grams_per_cup.is_finite() || density_grams_per_cup <= 0.0 {
        return Err(DensityError::InvalidDensity);
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(DensityError::InvalidAmount);
    }

    let grams_per_ml = density_grams_per_cup / ML_PER_US_CUP;
    let grams = match unit {
        MetricUnit::G => amount,
        MetricUnit::Kg => amount * G_PER_KG,
        MetricUnit::Ml => amount * grams_per_ml,
        MetricUnit::L => amount * ML_PER_LITER * grams_per_ml,
    };

    let cups = grams / density_grams_per_cup;
    let tbsp = cups * TBSP_PER_CUP;
    let tsp = tbsp * TSP_PER_TBSP;

    Ok(DensityConversion { grams, cups, tbsp, tsp })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flour_grams_to_cups() {
        let conv = convert_by_density(100.0, MetricUnit::G, 120.0).unwrap();
        assert_eq!(conv.grams, 100.0);
        assert_eq!(round_to(conv.cups, 3), 0.833);
        assert_eq!(round_to(conv.tbsp, 2), 13.33);
        assert_eq!(round_to(conv.tsp, 2), 40.0);
        assert_eq!(conv.summary(), "0.833 cup(s) | 13.33 tbsp | 40.00 tsp (100.0 g)");
    }

    #[test]
    fn test_kilograms_scale_to_grams() {
        let conv = convert_by_density(0.5, MetricUnit::Kg, 200.0).unwrap();
        assert!((conv.grams - 500.0).abs() < 1e-9);
        assert!((conv.cups - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_volume_uses_density() {
        // One US cup of sugar by volume weighs one cup's density
        let conv = convert_by_density(ML_PER_US_CUP, MetricUnit::Ml, 200.0).unwrap();
        assert!((conv.grams - 200.0).abs() < 1e-9);
        assert!((conv.cups - 1.0).abs() < 1e-9);
        assert!((conv.tbsp - 16.0).abs() < 1e-9);
        assert!((conv.tsp - 48.0).abs() < 1e-9);

        let liters = convert_by_density(1.0, MetricUnit::L, 90.0).unwrap();
        let ml = convert_by_density(1000.0, MetricUnit::Ml, 90.0).unwrap();
        assert!((liters.grams - ml.grams).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert_eq!(
            convert_by_density(100.0, MetricUnit::G, 0.0),
            Err(DensityError::InvalidDensity)
        );
        assert_eq!(
            convert_by_density(100.0, MetricUnit::G, -5.0),
            Err(DensityError::InvalidDensity)
        );
        assert_eq!(
            convert_by_density(0.0, MetricUnit::G, 120.0),
            Err(DensityError::InvalidAmount)
        );
        assert_eq!(
            convert_by_density(f64::NAN, MetricUnit::Ml, 120.0),
            Err(DensityError::InvalidAmount)
        );
    }

    #[test]
    fn test_default_densities() {
        assert_eq!(DEFAULT_DENSITIES.len(), 15);
        assert!(DEFAULT_DENSITIES.contains(&("Table Salt", 292.0)));
        assert!(DEFAULT_DENSITIES.iter().all(|(_, d)| *d > 0.0));
    }
}
