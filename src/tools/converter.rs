//! Ingredient Converter MCP Tools
//!
//! Tools for density-based conversion, the density table and saved
//! converter rows.

use serde::Serialize;

use crate::db::seed;
use crate::db::Database;
use crate::measure::{convert_by_density, DensityConversion, DensityError, MetricUnit};
use crate::models::{
    ConversionRow, ConversionRowCreate, ConversionRowUpdate, Density, RowConversion,
    PICK_INGREDIENT,
};

use super::export::{csv_line, dated_file_name, finish_export, join_lines, today, ExportResponse};

/// Response for convert_ingredient
#[derive(Debug, Serialize)]
pub struct ConvertIngredientResponse {
    pub ingredient: String,
    pub amount: f64,
    pub unit: MetricUnit,
    pub grams_per_cup: f64,
    pub conversion: DensityConversion,
    pub cups: String,
    pub tbsp: String,
    pub tsp: String,
    pub grams: String,
    pub summary: String,
}

/// Response for list_densities
#[derive(Debug, Serialize)]
pub struct ListDensitiesResponse {
    pub densities: Vec<Density>,
    pub total: usize,
}

/// Response for set_density
#[derive(Debug, Serialize)]
pub struct SetDensityResponse {
    pub density: Density,
    /// False when an existing density was overwritten
    pub created: bool,
}

/// Response for delete_density
#[derive(Debug, Serialize)]
pub struct DeleteDensityResponse {
    pub name: String,
    pub deleted: bool,
    /// Converter rows that had this ingredient picked
    pub rows_cleared: usize,
}

/// A converter row with its conversion
#[derive(Debug, Serialize)]
pub struct ConversionRowView {
    #[serde(flatten)]
    pub row: ConversionRow,
    pub display_name: String,
    pub result: RowConversion,
}

/// Response for list_conversion_rows
#[derive(Debug, Serialize)]
pub struct ListConversionRowsResponse {
    pub rows: Vec<ConversionRowView>,
    pub total: usize,
}

/// Response for clear_converter_data
#[derive(Debug, Serialize)]
pub struct ClearConverterResponse {
    pub densities: usize,
    pub rows: usize,
    pub message: String,
}

fn parse_metric_unit(unit: &str) -> Result<MetricUnit, String> {
    MetricUnit::from_str(unit)
        .ok_or_else(|| format!("Unknown unit '{}'. Valid units: g, kg, ml, l", unit))
}

fn load_views(db: &Database) -> Result<Vec<ConversionRowView>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let densities = Density::as_map(&conn).map_err(|e| format!("Failed to load densities: {}", e))?;
    let rows = ConversionRow::list(&conn).map_err(|e| format!("Failed to list rows: {}", e))?;

    Ok(rows
        .into_iter()
        .map(|row| ConversionRowView {
            display_name: row.display_name(),
            result: row.resolve(&densities),
            row,
        })
        .collect())
}

fn view_row(db: &Database, id: i64) -> Result<Option<ConversionRowView>, String> {
    Ok(load_views(db)?.into_iter().find(|v| v.row.id == id))
}

// ============================================================================
// Conversion
// ============================================================================

/// Convert an amount of an ingredient into cups, tablespoons and teaspoons
///
/// Uses the stored density unless `grams_per_cup` is given.
pub fn convert_ingredient(
    db: &Database,
    ingredient: &str,
    amount: f64,
    unit: &str,
    grams_per_cup: Option<f64>,
) -> Result<ConvertIngredientResponse, String> {
    let unit = parse_metric_unit(unit)?;
    let ingredient = ingredient.trim();
    if ingredient.is_empty() {
        return Err(PICK_INGREDIENT.to_string());
    }

    let density = match grams_per_cup {
        Some(d) => d,
        None => {
            let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
            Density::get(&conn, ingredient)
                .map_err(|e| format!("Failed to read density: {}", e))?
                .ok_or_else(|| {
                    format!(
                        "Unknown density for '{}'. Add it with set_density (grams per cup).",
                        ingredient
                    )
                })?
        }
    };

    let conversion = convert_by_density(amount, unit, density).map_err(|e| match e {
        DensityError::InvalidDensity => format!("Invalid density for '{}': {}", ingredient, e),
        DensityError::InvalidAmount => e.to_string(),
    })?;

    Ok(ConvertIngredientResponse {
        ingredient: ingredient.to_string(),
        amount,
        unit,
        grams_per_cup: density,
        cups: conversion.cups_display(),
        tbsp: conversion.tbsp_display(),
        tsp: conversion.tsp_display(),
        grams: conversion.grams_display(),
        summary: conversion.summary(),
        conversion,
    })
}

// ============================================================================
// Density Table
// ============================================================================

/// List densities sorted by name
pub fn list_densities(db: &Database) -> Result<ListDensitiesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let densities = Density::list(&conn).map_err(|e| format!("Failed to list densities: {}", e))?;
    Ok(ListDensitiesResponse {
        total: densities.len(),
        densities,
    })
}

/// Add or overwrite a density
pub fn set_density(db: &Database, name: &str, grams_per_cup: f64) -> Result<SetDensityResponse, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Enter an ingredient name".to_string());
    }
    if !grams_per_cup.is_finite() || grams_per_cup <= 0.0 {
        return Err("Density must be positive (grams per cup)".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let existed = Density::get(&conn, name)
        .map_err(|e| format!("Failed to read density: {}", e))?
        .is_some();
    let density = Density::upsert(&conn, name, grams_per_cup)
        .map_err(|e| format!("Failed to save density: {}", e))?;

    Ok(SetDensityResponse {
        density,
        created: !existed,
    })
}

/// Delete a density and unpick it from any converter rows
pub fn delete_density(db: &Database, name: &str) -> Result<DeleteDensityResponse, String> {
    let name = name.trim().to_string();
    db.with_transaction(|tx| {
        let deleted = Density::delete(tx, &name)?;
        let rows_cleared = if deleted {
            ConversionRow::clear_ingredient(tx, &name)?
        } else {
            0
        };
        Ok(DeleteDensityResponse {
            name: name.clone(),
            deleted,
            rows_cleared,
        })
    })
    .map_err(|e| format!("Failed to delete density: {}", e))
}

/// Restore the built-in density table
pub fn reset_densities(db: &Database) -> Result<ListDensitiesResponse, String> {
    db.with_transaction(|tx| seed::reset_densities(tx))
        .map_err(|e| format!("Failed to reset densities: {}", e))?;
    list_densities(db)
}

// ============================================================================
// Converter Rows
// ============================================================================

/// Add a converter row
pub fn add_conversion_row(
    db: &Database,
    ingredient: Option<&str>,
    override_name: Option<&str>,
    amount: Option<&str>,
    unit: Option<&str>,
) -> Result<ConversionRowView, String> {
    let unit = unit.map(parse_metric_unit).transpose()?.unwrap_or_default();
    let data = ConversionRowCreate {
        ingredient: ingredient.unwrap_or_default().to_string(),
        override_name: override_name.unwrap_or_default().to_string(),
        amount: amount.unwrap_or_default().to_string(),
        unit,
    };

    let created = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        ConversionRow::create(&conn, &data).map_err(|e| format!("Failed to add row: {}", e))?
    };
    view_row(db, created.id)?.ok_or_else(|| format!("Row {} disappeared", created.id))
}

/// Update a converter row
pub fn update_conversion_row(
    db: &Database,
    id: i64,
    ingredient: Option<&str>,
    override_name: Option<&str>,
    amount: Option<&str>,
    unit: Option<&str>,
) -> Result<Option<ConversionRowView>, String> {
    let unit = unit.map(parse_metric_unit).transpose()?;
    let data = ConversionRowUpdate {
        ingredient: ingredient.map(String::from),
        override_name: override_name.map(String::from),
        amount: amount.map(String::from),
        unit,
    };

    let updated = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        ConversionRow::update(&conn, id, &data).map_err(|e| format!("Failed to update row: {}", e))?
    };
    match updated {
        Some(_) => view_row(db, id),
        None => Ok(None),
    }
}

/// Remove a converter row
pub fn remove_conversion_row(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    ConversionRow::delete(&conn, id).map_err(|e| format!("Failed to remove row: {}", e))
}

/// List converter rows with their conversions
pub fn list_conversion_rows(db: &Database) -> Result<ListConversionRowsResponse, String> {
    let rows = load_views(db)?;
    Ok(ListConversionRowsResponse {
        total: rows.len(),
        rows,
    })
}

/// Export converter rows as CSV
pub fn export_conversions_csv(db: &Database, output_dir: Option<&str>) -> Result<ExportResponse, String> {
    let views = load_views(db)?;

    let header = csv_line(&["Ingredient", "Amount", "Unit", "Conversions"]);
    let rows = views.iter().map(|v| {
        csv_line(&[
            v.display_name.as_str(),
            v.row.amount.as_str(),
            v.row.unit.as_str(),
            v.result.text().as_str(),
        ])
    });
    let content = join_lines(header, rows);

    finish_export(
        output_dir,
        dated_file_name("ingredient_conversions", today()),
        views.len(),
        content,
    )
}

/// Render converter rows as tab-separated text for pasting
pub fn copy_conversion_table(db: &Database) -> Result<String, String> {
    let views = load_views(db)?;
    let rows = views.iter().map(|v| {
        let display = if v.display_name.is_empty() {
            "(untitled)"
        } else {
            v.display_name.as_str()
        };
        format!("{}\t{} {}\t{}", display, v.row.amount, v.row.unit.as_str(), v.result.text())
    });
    Ok(join_lines("Ingredient\tAmount\tConversions".to_string(), rows))
}

/// Wipe densities and rows, then restore the defaults
pub fn clear_converter_data(db: &Database) -> Result<ClearConverterResponse, String> {
    db.with_transaction(|tx| seed::clear_converter(tx))
        .map_err(|e| format!("Failed to clear converter data: {}", e))?;

    let densities = list_densities(db)?.total;
    let rows = list_conversion_rows(db)?.total;
    tracing::info!(densities, rows, "cleared converter data");
    Ok(ClearConverterResponse {
        densities,
        rows,
        message: "Converter data cleared; default densities restored".to_string(),
    })
}
