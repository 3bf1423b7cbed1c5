//! Runtime configuration
//!
//! The database location comes from `CHEF_DATABASE_PATH`, falling back to
//! `data/chef.db` under the project root.

use std::path::PathBuf;

/// Environment variable naming the database file
pub const DATABASE_PATH_ENV: &str = "CHEF_DATABASE_PATH";

/// Get the database path from environment or use default
pub fn database_path() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path())
}

fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("chef.db");
    path
}
