//! Utility to restore the sample menu and default densities

use chef_tools::config;
use chef_tools::db::{migrations, seed, Database};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = config::database_path();
    println!("Database path: {}", db_path.display());

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&db_path)?;

    // Run migrations
    database.with_conn(|conn| {
        migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let densities = database.with_transaction(|tx| {
        seed::reset_planner_to_sample(tx)?;
        seed::clear_converter(tx)?;
        let count: i64 = tx.query_row("SELECT COUNT(*) FROM densities", [], |row| row.get(0))?;
        Ok(count)
    })?;

    println!("Restored sample menu (2 dishes, 5 ingredient lines, 4 seats)");
    println!("Restored {} default densities and the starter converter row", densities);

    Ok(())
}
