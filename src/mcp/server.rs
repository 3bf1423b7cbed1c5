//! Chef Tools MCP Server Implementation
//!
//! Implements the MCP server with the planner and converter tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::tools::converter;
use crate::tools::planner;
use crate::tools::status::{StatusTracker, PLANNER_INSTRUCTIONS};

/// Chef Tools MCP Service
#[derive(Clone)]
pub struct ChefService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<ChefService>,
}

impl ChefService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a tool result as pretty JSON
fn respond<T: Serialize>(result: Result<T, String>) -> Result<CallToolResult, McpError> {
    let value = result.map_err(|e| McpError::internal_error(e, None))?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Serialize an optional tool result, reporting a missing record
fn respond_found<T: Serialize>(
    result: Result<Option<T>, String>,
    what: &str,
    id: i64,
) -> Result<CallToolResult, McpError> {
    let value = result.map_err(|e| McpError::internal_error(e, None))?;
    let json = match value {
        Some(v) => serde_json::to_string_pretty(&v),
        None => Ok(format!(r#"{{"error": "{} not found", "id": {}}}"#, what, id)),
    }
    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    id: i64,
    deleted: bool,
}

#[derive(Debug, Serialize)]
struct ClearedResponse {
    rows_removed: usize,
}

#[derive(Debug, Serialize)]
struct SeatsResponse {
    expected_seats: i64,
}

// ============================================================================
// Menu Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddDishParams {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateDishParams {
    pub id: i64,
    /// New name; the dish's ingredient lines follow the rename
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

// ============================================================================
// Ingredient Line Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientLineParams {
    /// Dish name; defaults to the first dish on the menu
    pub dish: Option<String>,
    pub ingredient: String,
    /// Amount per seat; leave out to fill in later
    pub amount: Option<f64>,
    /// Pounds, Ounces, Grams, Kilograms, Liters, Milliliters, Cups, Bag or Case
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIngredientLinesParams {
    pub dish: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIngredientLineParams {
    pub id: i64,
    pub dish: Option<String>,
    pub ingredient: Option<String>,
    pub amount: Option<f64>,
    /// Set to true to remove the amount
    #[serde(default)]
    pub clear_amount: bool,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetExpectedSeatsParams {
    /// Number of seats; values below 1 become 1
    pub seats: Option<i64>,
}

// ============================================================================
// Shopping List Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RowIndexParams {
    /// 0-based row index from get_shopping_list
    pub index: usize,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetRowUnitCountParams {
    pub index: usize,
    /// How many units are bought; leave out to clear
    pub unit_count: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetRowUnitTypeParams {
    pub index: usize,
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetRowPriceParams {
    pub index: usize,
    /// Total price for the row; leave out to go back to the derived price
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportParams {
    /// Directory to write the CSV file into; leave out to only return the text
    pub output_dir: Option<String>,
}

// ============================================================================
// Price Catalog Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPriceCatalogParams {
    pub ingredient: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecordPriceObservationParams {
    pub ingredient: String,
    pub unit: String,
    /// Price paid
    pub price: f64,
    /// How many units the price bought (default 1)
    pub quantity: Option<f64>,
}

// ============================================================================
// Converter Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertIngredientParams {
    pub ingredient: String,
    pub amount: f64,
    /// g, kg, ml or l
    #[serde(default = "default_metric_unit")]
    pub unit: String,
    /// Grams per cup; defaults to the stored density
    pub grams_per_cup: Option<f64>,
}

fn default_metric_unit() -> String { "g".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetDensityParams {
    pub name: String,
    pub grams_per_cup: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteDensityParams {
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddConversionRowParams {
    /// Density table name
    pub ingredient: Option<String>,
    /// Name to show instead of the ingredient
    pub override_name: Option<String>,
    /// Amount as entered
    pub amount: Option<String>,
    /// g, kg, ml or l (default g)
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateConversionRowParams {
    pub id: i64,
    pub ingredient: Option<String>,
    pub override_name: Option<String>,
    pub amount: Option<String>,
    pub unit: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl ChefService {
    // --- Status ---

    #[tool(description = "Get the current status of the Chef Tools service including build info, database status, table counts, and process information")]
    async fn chef_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for the menu planner and ingredient converter. Call this when starting a planning session or when unsure how pricing and units work.")]
    fn planner_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(PLANNER_INSTRUCTIONS)]))
    }

    // --- Menu ---

    #[tool(description = "Add a dish to the menu")]
    fn add_dish(&self, Parameters(p): Parameters<AddDishParams>) -> Result<CallToolResult, McpError> {
        respond(planner::add_dish(&self.database, &p.name, p.description.as_deref()))
    }

    #[tool(description = "List the dishes on the menu with their ingredient line counts and the expected seats")]
    fn list_dishes(&self) -> Result<CallToolResult, McpError> {
        respond(planner::list_dishes(&self.database))
    }

    #[tool(description = "Rename or re-describe a dish. Renaming moves the dish's ingredient lines to the new name.")]
    fn update_dish(&self, Parameters(p): Parameters<UpdateDishParams>) -> Result<CallToolResult, McpError> {
        let result = planner::update_dish(&self.database, p.id, p.name.as_deref(), p.description.as_deref());
        respond_found(result, "Dish", p.id)
    }

    #[tool(description = "Remove a dish and all of its ingredient lines")]
    fn remove_dish(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        respond_found(planner::remove_dish(&self.database, p.id), "Dish", p.id)
    }

    // --- Ingredient Lines ---

    #[tool(description = "Add an ingredient line to a dish. The amount is per seat.")]
    fn add_ingredient_line(&self, Parameters(p): Parameters<AddIngredientLineParams>) -> Result<CallToolResult, McpError> {
        respond(planner::add_ingredient_line(&self.database, p.dish.as_deref(), &p.ingredient, p.amount, &p.unit))
    }

    #[tool(description = "List ingredient lines, optionally for one dish")]
    fn list_ingredient_lines(&self, Parameters(p): Parameters<ListIngredientLinesParams>) -> Result<CallToolResult, McpError> {
        respond(planner::list_ingredient_lines(&self.database, p.dish.as_deref()))
    }

    #[tool(description = "Update an ingredient line's dish, ingredient, amount or unit")]
    fn update_ingredient_line(&self, Parameters(p): Parameters<UpdateIngredientLineParams>) -> Result<CallToolResult, McpError> {
        let result = planner::update_ingredient_line(
            &self.database,
            p.id,
            p.dish.as_deref(),
            p.ingredient.as_deref(),
            p.amount,
            p.clear_amount,
            p.unit.as_deref(),
        );
        respond_found(result, "Ingredient line", p.id)
    }

    #[tool(description = "Remove an ingredient line")]
    fn remove_ingredient_line(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = planner::remove_ingredient_line(&self.database, p.id)
            .map(|deleted| DeletedResponse { id: p.id, deleted });
        respond(result)
    }

    #[tool(description = "Set the number of expected seats used to scale ingredient amounts")]
    fn set_expected_seats(&self, Parameters(p): Parameters<SetExpectedSeatsParams>) -> Result<CallToolResult, McpError> {
        let result = planner::set_expected_seats(&self.database, p.seats)
            .map(|s| SeatsResponse { expected_seats: s.expected_seats });
        respond(result)
    }

    // --- Shopping List ---

    #[tool(description = "Aggregate all ingredient lines times the expected seats into a new shopping list, replacing the current one")]
    fn generate_shopping_list(&self) -> Result<CallToolResult, McpError> {
        respond(planner::generate_shopping_list(&self.database))
    }

    #[tool(description = "Get the current shopping list with prices and the total")]
    fn get_shopping_list(&self) -> Result<CallToolResult, McpError> {
        respond(planner::get_shopping_list(&self.database))
    }

    #[tool(description = "Remove every row from the shopping list")]
    fn clear_shopping_list(&self) -> Result<CallToolResult, McpError> {
        let result = planner::clear_shopping_list(&self.database)
            .map(|rows_removed| ClearedResponse { rows_removed });
        respond(result)
    }

    #[tool(description = "Remove one row from the shopping list by index")]
    fn remove_shopping_row(&self, Parameters(p): Parameters<RowIndexParams>) -> Result<CallToolResult, McpError> {
        respond(planner::remove_shopping_row(&self.database, p.index))
    }

    #[tool(description = "Set how many units of a shopping row are bought. The price is re-derived from the catalog.")]
    fn set_row_unit_count(&self, Parameters(p): Parameters<SetRowUnitCountParams>) -> Result<CallToolResult, McpError> {
        respond(planner::set_row_unit_count(&self.database, p.index, p.unit_count))
    }

    #[tool(description = "Set the unit a shopping row is bought in. The price is re-derived from the catalog.")]
    fn set_row_unit_type(&self, Parameters(p): Parameters<SetRowUnitTypeParams>) -> Result<CallToolResult, McpError> {
        respond(planner::set_row_unit_type(&self.database, p.index, &p.unit))
    }

    #[tool(description = "Set or clear a shopping row's total price. With a unit count and unit type, the price per unit is recorded in the catalog and other derived rows are re-priced.")]
    fn set_row_price(&self, Parameters(p): Parameters<SetRowPriceParams>) -> Result<CallToolResult, McpError> {
        respond(planner::set_row_price(&self.database, p.index, p.price))
    }

    #[tool(description = "Export the shopping list as CSV")]
    fn export_shopping_csv(&self, Parameters(p): Parameters<ExportParams>) -> Result<CallToolResult, McpError> {
        respond(planner::export_shopping_csv(&self.database, p.output_dir.as_deref()))
    }

    // --- Price Catalog ---

    #[tool(description = "List known prices per unit, optionally for one ingredient")]
    fn list_price_catalog(&self, Parameters(p): Parameters<ListPriceCatalogParams>) -> Result<CallToolResult, McpError> {
        respond(planner::list_price_catalog(&self.database, p.ingredient.as_deref()))
    }

    #[tool(description = "Record a price paid for a quantity of an ingredient. Fills in every unit of the same family and re-prices derived shopping rows.")]
    fn record_price_observation(&self, Parameters(p): Parameters<RecordPriceObservationParams>) -> Result<CallToolResult, McpError> {
        respond(planner::record_price_observation(&self.database, &p.ingredient, &p.unit, p.price, p.quantity))
    }

    // --- Converter ---

    #[tool(description = "Convert a metric amount (g, kg, ml, l) of an ingredient into cups, tablespoons and teaspoons using its density")]
    fn convert_ingredient(&self, Parameters(p): Parameters<ConvertIngredientParams>) -> Result<CallToolResult, McpError> {
        respond(converter::convert_ingredient(&self.database, &p.ingredient, p.amount, &p.unit, p.grams_per_cup))
    }

    #[tool(description = "List ingredient densities in grams per cup")]
    fn list_densities(&self) -> Result<CallToolResult, McpError> {
        respond(converter::list_densities(&self.database))
    }

    #[tool(description = "Add or overwrite an ingredient density in grams per cup (must be positive)")]
    fn set_density(&self, Parameters(p): Parameters<SetDensityParams>) -> Result<CallToolResult, McpError> {
        respond(converter::set_density(&self.database, &p.name, p.grams_per_cup))
    }

    #[tool(description = "Delete an ingredient density. Converter rows using it are left without an ingredient.")]
    fn delete_density(&self, Parameters(p): Parameters<DeleteDensityParams>) -> Result<CallToolResult, McpError> {
        respond(converter::delete_density(&self.database, &p.name))
    }

    #[tool(description = "Restore the built-in density table")]
    fn reset_densities(&self) -> Result<CallToolResult, McpError> {
        respond(converter::reset_densities(&self.database))
    }

    #[tool(description = "Add a converter row")]
    fn add_conversion_row(&self, Parameters(p): Parameters<AddConversionRowParams>) -> Result<CallToolResult, McpError> {
        let result = converter::add_conversion_row(
            &self.database,
            p.ingredient.as_deref(),
            p.override_name.as_deref(),
            p.amount.as_deref(),
            p.unit.as_deref(),
        );
        respond(result)
    }

    #[tool(description = "Update a converter row's ingredient, display name, amount or unit")]
    fn update_conversion_row(&self, Parameters(p): Parameters<UpdateConversionRowParams>) -> Result<CallToolResult, McpError> {
        let result = converter::update_conversion_row(
            &self.database,
            p.id,
            p.ingredient.as_deref(),
            p.override_name.as_deref(),
            p.amount.as_deref(),
            p.unit.as_deref(),
        );
        respond_found(result, "Conversion row", p.id)
    }

    #[tool(description = "Remove a converter row")]
    fn remove_conversion_row(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = converter::remove_conversion_row(&self.database, p.id)
            .map(|deleted| DeletedResponse { id: p.id, deleted });
        respond(result)
    }

    #[tool(description = "List converter rows with their conversions or the reason they cannot convert")]
    fn list_conversion_rows(&self) -> Result<CallToolResult, McpError> {
        respond(converter::list_conversion_rows(&self.database))
    }

    #[tool(description = "Export converter rows as CSV (Ingredient, Amount, Unit, Conversions)")]
    fn export_conversions_csv(&self, Parameters(p): Parameters<ExportParams>) -> Result<CallToolResult, McpError> {
        respond(converter::export_conversions_csv(&self.database, p.output_dir.as_deref()))
    }

    #[tool(description = "Get the converter rows as tab-separated text ready to paste")]
    fn copy_conversion_table(&self) -> Result<CallToolResult, McpError> {
        let text = converter::copy_conversion_table(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Delete all densities and converter rows, then restore the default densities and starter row")]
    fn clear_converter_data(&self) -> Result<CallToolResult, McpError> {
        respond(converter::clear_converter_data(&self.database))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for ChefService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "chef-tools".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Chef Tools".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Chef Tools - menu planning, shopping list pricing and ingredient conversion. \
                 IMPORTANT: Call planner_instructions before a planning session. \
                 Menu: add/list/update/remove_dish. \
                 Lines: add/list/update/remove_ingredient_line, set_expected_seats. \
                 Shopping: generate/get/clear_shopping_list, remove_shopping_row, \
                 set_row_unit_count, set_row_unit_type, set_row_price, export_shopping_csv. \
                 Catalog: list_price_catalog, record_price_observation. \
                 Converter: convert_ingredient, list/set/delete_density, reset_densities, \
                 add/update/remove/list_conversion_row(s), export_conversions_csv, \
                 copy_conversion_table, clear_converter_data."
                    .into(),
            ),
        }
    }
}
