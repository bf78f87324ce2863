/// MCP server that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin
/// 2. Routes tool calls to the vehicle tracker
/// 3. Sends JSON-RPC responses to stdout

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::mcp::protocol::*;
use crate::tools::{self, ToolError};
use crate::{MotoTracker, ServerError};

/// MCP server wrapping a tracker
pub struct McpServer {
    tracker: MotoTracker,
}

fn tool<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(T);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"})),
    }
}

/// Deserialize tool arguments into the tool's params struct
fn parse_args<T: DeserializeOwned>(args: Map<String, Value>) -> Result<T, ToolCallResult> {
    serde_json::from_value(Value::Object(args))
        .map_err(|e| ToolCallResult::error(format!("Invalid arguments: {}", e)))
}

fn respond<T: Serialize>(result: Result<T, ToolError>, message: impl Fn(&T) -> String) -> ToolCallResult {
    match result {
        Ok(response) => ToolCallResult::success(message(&response), &response),
        Err(e) => ToolCallResult::error(e.to_string()),
    }
}

impl McpServer {
    pub fn new(tracker: MotoTracker) -> Self {
        Self { tracker }
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
    pub async fn process_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
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
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            debug!("Notification {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Moto Tracker MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null))
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = vec![
            tool::<tools::NoParams>("moto_profile_get", "Show the vehicle profile (fuel economy, fuel price, last oil change)"),
            tool::<tools::UpdateProfileParams>("moto_profile_update", "Update one or more vehicle profile fields"),
            tool::<tools::AddLogParams>("moto_log_add", "Record a day of vehicle use: odometer, tank level and refuels"),
            tool::<tools::ListLogsParams>("moto_log_list", "List recent daily logs with distance and consumption"),
            tool::<tools::RemoveLogParams>("moto_log_remove", "Delete a daily log by ID"),
            tool::<tools::SummaryParams>("moto_summary", "Distance, expected vs real fuel use and cost over recent days"),
            tool::<tools::NoParams>("moto_oil_status", "Check how urgent the next oil change is"),
            tool::<tools::RegisterOilChangeParams>("moto_oil_change_register", "Register an oil change at the current odometer"),
            tool::<tools::NoParams>("moto_sync_flush", "Send logs recorded offline to the backend"),
        ];

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        debug!("Calling tool {}", tool_params.name);
        let result = self.call_tool(&tool_params.name, tool_params.arguments).await;

        JsonRpcResponse::success(id, serde_json::to_value(result).unwrap_or(Value::Null))
    }

    async fn call_tool(&self, name: &str, args: Map<String, Value>) -> ToolCallResult {
        let sync = self.tracker.sync();

        match name {
            "moto_profile_get" => {
                let response = tools::get_profile(sync).await;
                ToolCallResult::success(response.message.clone(), &response)
            }
            "moto_profile_update" => match parse_args(args) {
                Ok(params) => respond(tools::update_profile(sync, params).await, |r| r.message.clone()),
                Err(e) => e,
            },
            "moto_log_add" => match parse_args(args) {
                Ok(params) => respond(tools::add_log(sync, params).await, |r| r.message.clone()),
                Err(e) => e,
            },
            "moto_log_list" => match parse_args(args) {
                Ok(params) => {
                    let response = tools::list_logs(sync, params).await;
                    ToolCallResult::success(response.message.clone(), &response)
                }
                Err(e) => e,
            },
            "moto_log_remove" => match parse_args(args) {
                Ok(params) => respond(tools::remove_log(sync, params).await, |r| r.message.clone()),
                Err(e) => e,
            },
            "moto_summary" => match parse_args(args) {
                Ok(params) => {
                    let response = tools::usage_summary(sync, params).await;
                    ToolCallResult::success(response.message.clone(), &response)
                }
                Err(e) => e,
            },
            "moto_oil_status" => {
                let response = tools::oil_status(sync).await;
                ToolCallResult::success(response.message.clone(), &response)
            }
            "moto_oil_change_register" => match parse_args(args) {
                Ok(params) => respond(tools::register_oil_change_now(sync, params).await, |r| r.message.clone()),
                Err(e) => e,
            },
            "moto_sync_flush" => {
                let response = tools::flush_pending(sync).await;
                ToolCallResult::success(response.message.clone(), &response)
            }
            _ => ToolCallResult::error(format!("Unknown tool: {}", name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use tempfile::NamedTempFile;

    async fn server() -> (McpServer, NamedTempFile) {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let tracker = MotoTracker::new(EngineConfig::new(temp_file.path().to_path_buf()))
            .await
            .expect("Failed to create tracker");
        (McpServer::new(tracker), temp_file)
    }

    async fn call(server: &mut McpServer, line: Value) -> Value {
        let response = server.process_line(&line.to_string()).await.expect("expected a response");
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_tools_list_has_schemas() {
        let (mut server, _file) = server().await;
        let response = call(&mut server, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})).await;

        let tools = response["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 9);
        let add = tools.iter().find(|t| t["name"] == "moto_log_add").unwrap();
        assert!(add["inputSchema"]["properties"]["odometer_start"].is_object());
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let (mut server, _file) = server().await;
        let line = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
        assert!(server.process_line(&line).await.is_none());
    }

    #[tokio::test]
    async fn test_add_log_then_summary_offline() {
        let (mut server, _file) = server().await;

        let added = call(&mut server, json!({
            "jsonrpc": "2.0", "id": 2, "method": "tools/call",
            "params": {"name": "moto_log_add", "arguments": {
                "date": "2024-05-01", "odometer_start": 100, "odometer_end": 150,
                "fuel_start_liters": 3, "fuel_end_liters": 1, "refuels": [{"liters": 2}]
            }}
        }))
        .await;
        assert_eq!(added["result"]["isError"], json!(false));
        assert_eq!(added["result"]["structuredContent"]["pendingSync"], json!(1));

        let summary = call(&mut server, json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "moto_summary", "arguments": {}}
        }))
        .await;
        assert_eq!(summary["result"]["structuredContent"]["summary"]["totalKm"], json!(50.0));
        assert_eq!(summary["result"]["structuredContent"]["summary"]["realKmPerLiter"], json!(12.5));

        let listed = call(&mut server, json!({
            "jsonrpc": "2.0", "id": 6, "method": "tools/call",
            "params": {"name": "moto_log_list", "arguments": {}}
        }))
        .await;
        let content = &listed["result"]["structuredContent"];
        assert_eq!(content["totalLogs"], json!(1));
        assert!(content["logs"][0]["logId"].is_string());
        assert!(content.get("total_logs").is_none());
    }

    #[tokio::test]
    async fn test_bad_arguments_are_tool_errors() {
        let (mut server, _file) = server().await;
        let response = call(&mut server, json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "moto_log_add", "arguments": {"odometer_start": "far"}}
        }))
        .await;
        assert_eq!(response["result"]["isError"], json!(true));

        let unknown = call(&mut server, json!({"jsonrpc": "2.0", "id": 5, "method": "nope"})).await;
        assert_eq!(unknown["error"]["code"], json!(error_codes::METHOD_NOT_FOUND));
    }
}
