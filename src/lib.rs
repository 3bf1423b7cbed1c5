//! Chef Tools Library
//!
//! Menu planning, shopping list pricing and ingredient conversion.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod measure;
pub mod models;
pub mod planner;
pub mod tools;
