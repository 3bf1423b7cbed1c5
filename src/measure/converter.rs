//! Unit conversion functions
//!
//! Quantity and rate conversion within a unit family, plus the rounding helpers
//! used when presenting amounts and money.

use thiserror::Error;

use super::units::{Unit, UnitFamily};

/// Two units that cannot be converted into each other
///
/// This is a routine outcome: the aggregator uses it to decide whether to merge
/// a line into an existing entry or to split it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot convert {from} to {to}")]
pub struct Incompatible {
    pub from: Unit,
    pub to: Unit,
}

/// Canonical factors for a convertible pair, or `Incompatible`
fn factors(from: Unit, to: Unit) -> Result<(f64, f64), Incompatible> {
    if from.family() != to.family() || from.family() == UnitFamily::Count {
        return Err(Incompatible { from, to });
    }

    match (from.canonical_factor(), to.canonical_factor()) {
        (Some(f), Some(t)) => Ok((f, t)),
        _ => Err(Incompatible { from, to }),
    }
}

/// Convert a quantity between two units
///
/// Identical units return the amount untouched (Count units included).
/// Mass converts through grams, volume through milliliters.
pub fn convert(amount: f64, from: Unit, to: Unit) -> Result<f64, Incompatible> {
    if from == to {
        return Ok(amount);
    }

    let (from_factor, to_factor) = factors(from, to)?;
    let canonical = amount * from_factor;
    Ok(canonical / to_factor)
}

/// Convert a price-per-unit between two units
///
/// A rate scales inversely to a quantity: a price per pound becomes a price
/// per gram by dividing, then a price per ounce by multiplying.
pub fn convert_rate(price_per_unit: f64, from: Unit, to: Unit) -> Result<f64, Incompatible> {
    if from == to {
        return Ok(price_per_unit);
    }

    let (from_factor, to_factor) = factors(from, to)?;
    let per_canonical = price_per_unit / from_factor;
    Ok(per_canonical * to_factor)
}

// ============================================================================
// Presentation Rounding
// ============================================================================

/// Round half-up to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    ((value + f64::EPSILON) * factor).round() / factor
}

/// Round a money amount to cents
pub fn round_money(value: f64) -> f64 {
    round_to(value, 2)
}

/// Format a quantity to at most 3 decimals, dropping trailing zeros
///
/// Examples: 1.2 -> "1.2", 0.8333 -> "0.833", 400.0 -> "400"
pub fn format_quantity(amount: f64) -> String {
    let fixed = format!("{:.3}", round_to(amount, 3));
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a price, keeping sub-cent prices readable
///
/// Prices strictly between 0 and 0.01 get 4 decimals, everything else 2.
pub fn format_price(price: f64) -> String {
    if price > 0.0 && price < 0.01 {
        format!("{:.4}", round_to(price, 4))
    } else {
        format!("{:.2}", round_to(price, 2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_for_every_unit() {
        for unit in Unit::ALL {
            assert_eq!(convert(3.75, unit, unit), Ok(3.75));
            assert_eq!(convert_rate(0.42, unit, unit), Ok(0.42));
        }
    }

    #[test]
    fn test_mass_conversion() {
        let oz = convert(1.0, Unit::Pounds, Unit::Ounces).unwrap();
        assert!((oz - 16.0).abs() < 1e-9);

        let g = convert(2.0, Unit::Kilograms, Unit::Grams).unwrap();
        assert!((g - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_conversion_uses_planner_cup() {
        let ml = convert(2.0, Unit::Cups, Unit::Milliliters).unwrap();
        assert!((ml - 480.0).abs() < 1e-9);

        let cups = convert(0.5, Unit::Liters, Unit::Cups).unwrap();
        assert!((cups - 500.0 / 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_family_closure() {
        for from in Unit::ALL {
            for to in Unit::ALL {
                let result = convert(1.0, from, to);
                if from == to {
                    assert!(result.is_ok());
                } else if from.family() == to.family() && from.family() != UnitFamily::Count {
                    assert!(result.is_ok(), "{from} -> {to} should convert");
                } else {
                    assert_eq!(result, Err(Incompatible { from, to }));
                }
            }
        }
    }

    #[test]
    fn test_round_trip_within_family() {
        let pairs = [
            (Unit::Pounds, Unit::Grams),
            (Unit::Ounces, Unit::Kilograms),
            (Unit::Cups, Unit::Liters),
            (Unit::Milliliters, Unit::Cups),
        ];
        for (a, b) in pairs {
            let there = convert(7.3, a, b).unwrap();
            let back = convert(there, b, a).unwrap();
            assert!((back - 7.3).abs() < 1e-9, "{a} <-> {b}");
        }
    }

    #[test]
    fn test_rate_scales_inversely() {
        // $2.00 per pound is $0.125 per ounce
        let per_oz = convert_rate(2.0, Unit::Pounds, Unit::Ounces).unwrap();
        assert!((per_oz - 0.125).abs() < 1e-12);

        // $10 per liter is $0.01 per milliliter
        let per_ml = convert_rate(10.0, Unit::Liters, Unit::Milliliters).unwrap();
        assert!((per_ml - 0.01).abs() < 1e-12);

        assert!(convert_rate(1.0, Unit::Bag, Unit::Case).is_err());
        assert!(convert_rate(1.0, Unit::Grams, Unit::Cups).is_err());
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(0.8333333, 3), 0.833);
        assert_eq!(round_to(13.333333, 2), 13.33);
        assert_eq!(round_money(1.005), 1.01);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(1.2000000000000002), "1.2");
        assert_eq!(format_quantity(0.83333), "0.833");
        assert_eq!(format_quantity(400.0), "400");
        assert_eq!(format_quantity(0.0), "0");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(2.0), "2.00");
        assert_eq!(format_price(0.375), "0.38");
        assert_eq!(format_price(0.0022046), "0.0022");
        assert_eq!(format_price(0.0), "0.00");
    }
}
