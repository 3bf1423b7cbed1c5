//! Measurement module
//!
//! Kitchen units, conversions between them, and density-based conversion.

pub mod converter;
pub mod density;
pub mod units;

pub use converter::{
    convert, convert_rate, format_price, format_quantity, round_money, round_to, Incompatible,
};
pub use density::{convert_by_density, DensityConversion, DensityError, DEFAULT_DENSITIES};
pub use units::{MetricUnit, Unit, UnitFamily};
