/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin
/// 2. Processes tool calls using the habit tracker
/// 3. Sends JSON-RPC responses to stdout

use std::collections::HashMap;

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::mcp::protocol::*;
use crate::tools;
use crate::{HabitCadenceServer, ServerError};

/// MCP server that handles communication with an MCP client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitCadenceServer,
    /// Whether the client has completed initialization
    initialized: bool,
}

/// Deserialize a tool's argument map into its typed params struct
fn parse_args<T: DeserializeOwned>(args: HashMap<String, Value>) -> Result<T, String> {
    let object = Value::Object(args.into_iter().collect());
    serde_json::from_value(object).map_err(|e| format!("Invalid parameters: {}", e))
}

/// Build a tool definition whose input schema is derived from the params type
fn tool_definition<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| json!({"type": "object"}));
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: schema,
    }
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_tracker: HabitCadenceServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        Some(self.handle_request(request).await)
    }

    /// Handle a JSON-RPC request
    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request).await,
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(request.id, json!(null))
            }
            "tools/list" => self.handle_tools_list(request).await,
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        }
    }

    /// Handle MCP initialization request
    async fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Habit Cadence MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::success(request.id, serde_json::to_value(result).unwrap())
    }

    /// Handle tools/list request
    async fn handle_tools_list(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tools = vec![
            tool_definition::<tools::CreateHabitParams>(
                "habit_create",
                "Create a new habit with a recurrence rule (daily, weekly, monthly or a custom day interval)",
            ),
            tool_definition::<tools::LogCompletionParams>(
                "habit_log",
                "Log completion of a habit for today or a specific date; repeated logs on one day add up",
            ),
            tool_definition::<tools::UnlogCompletionParams>(
                "habit_unlog",
                "Remove the most recently logged completion for a date",
            ),
            tool_definition::<tools::ListHabitsParams>(
                "habit_list",
                "List habits with their schedule, current streak and 30-day completion rate",
            ),
            tool_definition::<tools::StatusParams>(
                "habit_status",
                "Check whether habits are scheduled on a date, today's progress and the next scheduled date",
            ),
            tool_definition::<tools::UpdateHabitParams>(
                "habit_update",
                "Update a habit's name, metadata, target or recurrence; archive or restore it",
            ),
            tool_definition::<tools::StatsParams>(
                "habit_stats",
                "Full statistics for a habit over a week/month/quarter/year window, with insights",
            ),
        ];

        JsonRpcResponse::success(request.id, json!({"tools": tools}))
    }

    /// Handle tools/call request
    async fn handle_tools_call(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match request.params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let result = match tool_params.name.as_str() {
            "habit_create" => self.call_habit_create(tool_params.arguments).await,
            "habit_log" => self.call_habit_log(tool_params.arguments).await,
            "habit_unlog" => self.call_habit_unlog(tool_params.arguments).await,
            "habit_list" => self.call_habit_list(tool_params.arguments).await,
            "habit_status" => self.call_habit_status(tool_params.arguments).await,
            "habit_update" => self.call_habit_update(tool_params.arguments).await,
            "habit_stats" => self.call_habit_stats(tool_params.arguments).await,
            _ => ToolCallResult::error(format!("Unknown tool: {}", tool_params.name)),
        };

        JsonRpcResponse::success(request.id, serde_json::to_value(result).unwrap())
    }

    /// Call the habit_create tool
    async fn call_habit_create(&self, args: HashMap<String, Value>) -> ToolCallResult {
        let params: tools::CreateHabitParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolCallResult::error(e),
        };

        match tools::create_habit(self.habit_tracker.storage(), params) {
            Ok(response) => {
                let message = if let Some(habit_id) = &response.habit_id {
                    format!("{}\nHabit ID: {}", response.message, habit_id)
                } else {
                    response.message
                };
                ToolCallResult::success(message)
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }

    /// Call the habit_log tool
    async fn call_habit_log(&self, args: HashMap<String, Value>) -> ToolCallResult {
        let params: tools::LogCompletionParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolCallResult::error(e),
        };

        match tools::log_completion(self.habit_tracker.storage(), params) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }

    /// Call the habit_unlog tool
    async fn call_habit_unlog(&self, args: HashMap<String, Value>) -> ToolCallResult {
        let params: tools::UnlogCompletionParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolCallResult::error(e),
        };

        match tools::unlog_completion(self.habit_tracker.storage(), params) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }

    /// Call the habit_list tool
    async fn call_habit_list(&self, args: HashMap<String, Value>) -> ToolCallResult {
        let params: tools::ListHabitsParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolCallResult::error(e),
        };

        match tools::list_habits(self.habit_tracker.storage(), params) {
            Ok(response) => {
                if response.habits.is_empty() {
                    ToolCallResult::success(
                        "No habits found. Create your first habit to get started!".to_string(),
                    )
                } else {
                    let header =
                        format!("📋 **Habits** ({} total)\n\n", response.summary.total_habits);

                    let detailed_list = response
                        .habits
                        .iter()
                        .map(|h| {
                            format!(
                                "🎯 **{}**{}\n   📅 {} | 🔥 Streak: {} day{} | 📊 30-day rate: {:.1}% | ✅ Logged: {}{}",
                                h.name,
                                h.category
                                    .as_ref()
                                    .map(|c| format!(" ({})", c))
                                    .unwrap_or_default(),
                                h.schedule,
                                h.current_streak,
                                if h.current_streak == 1 { "" } else { "s" },
                                h.completion_rate * 100.0,
                                h.total_completions,
                                if h.status == "archived" { " 🗄️ (archived)" } else { "" }
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n\n");

                    let overall = format!(
                        "\n\n📊 **Overall**\n- Active habits: {}\n- Average 30-day completion rate: {:.1}%",
                        response.summary.active_habits,
                        response.summary.avg_completion_rate * 100.0
                    );

                    ToolCallResult::success(format!("{}{}{}", header, detailed_list, overall))
                }
            }
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }

    /// Call the habit_status tool
    async fn call_habit_status(&self, args: HashMap<String, Value>) -> ToolCallResult {
        let params: tools::StatusParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolCallResult::error(e),
        };

        match tools::habit_status(self.habit_tracker.storage(), params) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }

    /// Call the habit_update tool
    async fn call_habit_update(&self, args: HashMap<String, Value>) -> ToolCallResult {
        let params: tools::UpdateHabitParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolCallResult::error(e),
        };

        match tools::update_habit(self.habit_tracker.storage(), params) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }

    /// Call the habit_stats tool
    async fn call_habit_stats(&self, args: HashMap<String, Value>) -> ToolCallResult {
        let params: tools::StatsParams = match parse_args(args) {
            Ok(p) => p,
            Err(e) => return ToolCallResult::error(e),
        };

        match tools::habit_stats(
            self.habit_tracker.storage(),
            self.habit_tracker.analytics(),
            params,
        ) {
            Ok(response) => ToolCallResult::success(response.message),
            Err(e) => ToolCallResult::error(e.to_string()),
        }
    }
}
