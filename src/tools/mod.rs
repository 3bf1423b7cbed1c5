//! Chef Tools module
//!
//! MCP tool implementations for the menu planner and ingredient converter.

pub mod converter;
pub mod export;
pub mod planner;
pub mod status;
