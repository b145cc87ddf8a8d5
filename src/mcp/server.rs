//! FitLedger MCP Server Implementation
//!
//! Exposes the daily activity ledger as MCP tools.

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

use crate::ledger::{Counter, LedgerStore};
use crate::models::FoodItemCreate;
use crate::tools::entries::{self, CounterMode};
use crate::tools::status::StatusTracker;

/// FitLedger MCP Service
#[derive(Clone)]
pub struct FitLedgerService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    ledger: LedgerStore,
    tool_router: ToolRouter<FitLedgerService>,
}

impl FitLedgerService {
    pub fn new(database_path: PathBuf, ledger: LedgerStore) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            ledger,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_result<T: Serialize>(result: Result<T, String>) -> Result<CallToolResult, McpError> {
    let value = result.map_err(|e| McpError::invalid_params(e, None))?;
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Food Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodParams {
    pub name: String,
    pub calories: f64,
    /// Grams
    #[serde(default)]
    pub protein: f64,
    /// Grams
    #[serde(default)]
    pub carbs: f64,
    /// Grams
    #[serde(default)]
    pub fats: f64,
    /// Reference to a photo of the meal
    pub image_uri: Option<String>,
    /// True when the values were estimated from a photo
    pub ai_analyzed: Option<bool>,
    /// Date in ISO format: YYYY-MM-DD (default today)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveEntryParams {
    /// Entry ID returned when it was logged
    pub id: String,
    /// Date in ISO format: YYYY-MM-DD (default today)
    pub date: Option<String>,
}

// ============================================================================
// Exercise Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddExerciseParams {
    pub name: String,
    /// Calories burned
    pub calories: f64,
    /// Minutes
    pub duration: f64,
    /// Exercise type: cardio, strength or sports
    #[serde(rename = "type")]
    pub exercise_type: String,
    /// Date in ISO format: YYYY-MM-DD (default today)
    pub date: Option<String>,
}

// ============================================================================
// Counter and Day Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AmountParams {
    /// Milliliters for water, count for steps, minutes for active minutes
    pub amount: i64,
    /// Date in ISO format: YYYY-MM-DD (default today)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDayParams {
    /// Date in ISO format: YYYY-MM-DD (default today)
    pub date: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

impl FitLedgerService {
    fn counter(&self, counter: Counter, mode: CounterMode, p: AmountParams) -> Result<CallToolResult, McpError> {
        to_result(entries::adjust_counter(&self.ledger, counter, mode, p.amount, p.date.as_deref()))
    }
}

#[tool_router]
impl FitLedgerService {
    // --- Status ---

    #[tool(description = "Get the current status of the FitLedger service including build info, ledger hydration, durable write progress, and process information")]
    async fn fitledger_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.ledger);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get instructions for logging food, exercise, water, steps and active minutes. Call this when starting a logging session.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LOGGING_INSTRUCTIONS)]))
    }

    // --- Food ---

    #[tool(description = "Log a food entry with calories and macros (grams). Returns the entry with its generated id and the day's totals.")]
    fn add_food(&self, Parameters(p): Parameters<AddFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodItemCreate {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fats: p.fats,
            image_uri: p.image_uri,
            ai_analyzed: p.ai_analyzed,
        };
        to_result(entries::log_food(&self.ledger, data, p.date.as_deref()))
    }

    #[tool(description = "Remove a food entry by id. Removing an id that is not present does nothing.")]
    fn remove_food(&self, Parameters(p): Parameters<RemoveEntryParams>) -> Result<CallToolResult, McpError> {
        to_result(entries::remove_food(&self.ledger, &p.id, p.date.as_deref()))
    }

    // --- Exercise ---

    #[tool(description = "Log an exercise entry (type: cardio, strength or sports) with calories burned and duration in minutes")]
    fn add_exercise(&self, Parameters(p): Parameters<AddExerciseParams>) -> Result<CallToolResult, McpError> {
        to_result(entries::log_exercise(
            &self.ledger,
            p.name,
            p.calories,
            p.duration,
            &p.exercise_type,
            p.date.as_deref(),
        ))
    }

    #[tool(description = "Remove an exercise entry by id. Removing an id that is not present does nothing.")]
    fn remove_exercise(&self, Parameters(p): Parameters<RemoveEntryParams>) -> Result<CallToolResult, McpError> {
        to_result(entries::remove_exercise(&self.ledger, &p.id, p.date.as_deref()))
    }

    // --- Counters ---

    #[tool(description = "Add milliliters to the day's water intake")]
    fn add_water(&self, Parameters(p): Parameters<AmountParams>) -> Result<CallToolResult, McpError> {
        self.counter(Counter::Water, CounterMode::Add, p)
    }

    #[tool(description = "Overwrite the day's water intake in milliliters (for corrections)")]
    fn set_water(&self, Parameters(p): Parameters<AmountParams>) -> Result<CallToolResult, McpError> {
        self.counter(Counter::Water, CounterMode::Set, p)
    }

    #[tool(description = "Add to the day's step count")]
    fn add_steps(&self, Parameters(p): Parameters<AmountParams>) -> Result<CallToolResult, McpError> {
        self.counter(Counter::Steps, CounterMode::Add, p)
    }

    #[tool(description = "Overwrite the day's step count (for syncing from a device)")]
    fn set_steps(&self, Parameters(p): Parameters<AmountParams>) -> Result<CallToolResult, McpError> {
        self.counter(Counter::Steps, CounterMode::Set, p)
    }

    #[tool(description = "Add to the day's active minutes")]
    fn add_active_minutes(&self, Parameters(p): Parameters<AmountParams>) -> Result<CallToolResult, McpError> {
        self.counter(Counter::ActiveMinutes, CounterMode::Add, p)
    }

    #[tool(description = "Overwrite the day's active minutes (for corrections)")]
    fn set_active_minutes(&self, Parameters(p): Parameters<AmountParams>) -> Result<CallToolResult, McpError> {
        self.counter(Counter::ActiveMinutes, CounterMode::Set, p)
    }

    // --- Day ---

    #[tool(description = "Get all food, exercise, water, steps, active minutes and totals for a day (default today). Check `hydrated` before trusting the values.")]
    fn get_day(&self, Parameters(p): Parameters<GetDayParams>) -> Result<CallToolResult, McpError> {
        to_result(entries::get_day(&self.ledger, p.date.as_deref()))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FitLedgerService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "fitledger".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("FitLedger".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "FitLedger - daily food, exercise, water, steps and active minutes. \
                 Call logging_instructions first. \
                 Food: add_food/remove_food. Exercise: add_exercise/remove_exercise. \
                 Counters: add_water/set_water, add_steps/set_steps, add_active_minutes/set_active_minutes. \
                 Reading: get_day. Status: fitledger_status. \
                 All tools take an optional date (YYYY-MM-DD); the default is today."
                    .into(),
            ),
        }
    }
}
