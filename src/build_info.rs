//! Build metadata and the startup banner
//!
//! `build.rs` stamps each compile with a build number and a UTC timestamp.
//! The banner also reports the measurement tables compiled into this build,
//! since conversions depend on them.

use serde::Serialize;

use crate::measure::units::{ML_PER_CUP, ML_PER_US_CUP};
use crate::measure::{Unit, DEFAULT_DENSITIES};

/// Build number, incremented on each recompilation
pub const BUILD_NUMBER: u64 = match option_env!("CHEF_BUILD_NUMBER") {
    Some(s) => digits(s),
    None => 0,
};

/// Build timestamp in ISO 8601 format
pub const BUILD_TIMESTAMP: &str = match option_env!("CHEF_BUILD_TIMESTAMP") {
    Some(s) => s,
    None => "unknown",
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decimal digits as a number; anything else counts as build 0
const fn digits(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut n: u64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            return 0;
        }
        n = n * 10 + (bytes[i] - b'0') as u64;
        i += 1;
    }
    n
}

/// Version, build stamp and the measurement tables of this build
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub planner_units: usize,
    pub default_densities: usize,
    pub planner_cup_ml: f64,
    pub density_cup_ml: f64,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            build_number: BUILD_NUMBER,
            build_timestamp: BUILD_TIMESTAMP,
            planner_units: Unit::ALL.len(),
            default_densities: DEFAULT_DENSITIES.len(),
            planner_cup_ml: ML_PER_CUP,
            density_cup_ml: ML_PER_US_CUP,
        }
    }
}

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    let info = BuildInfo::current();
    eprintln!("-----------------------------------------------");
    eprintln!("  Chef Tools {} (build {})", info.version, info.build_number);
    eprintln!("  Compiled: {}", info.build_timestamp);
    eprintln!(
        "  {} planner units | {} default densities",
        info.planner_units, info.default_densities
    );
    eprintln!(
        "  Cup: {} ml planner, {} ml converter",
        info.planner_cup_ml, info.density_cup_ml
    );
    eprintln!("-----------------------------------------------");
}
