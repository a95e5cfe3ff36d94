//! Agent server implementation.
//!
//! The server handles the protocol lifecycle:
//! 1. Initialize - exchange identities
//! 2. Handle repo requests - run actions through the dispatcher
//! 3. Stop at end of input

use repobot_core::{ActionKind, RepoRequest};
use serde_json::{json, Value};

use crate::dispatcher::Dispatcher;
use crate::protocol::{
    methods, ActionDefinition, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ManifestResult, RequestId, ServerInfo, JSONRPC_VERSION, PROTOCOL_NAME,
};
use crate::transport::{IncomingMessage, StdioTransport};

/// Agent server answering repository requests.
pub struct AgentServer {
    dispatcher: Dispatcher,
    initialized: bool,
}

impl AgentServer {
    /// Create a new agent server.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            initialized: false,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the server over stdin/stdout.
    pub async fn run(&mut self) -> repobot_core::Result<()> {
        self.run_with(StdioTransport::stdio()).await
    }

    /// Run the server main loop over the given transport until end of input.
    pub async fn run_with(&mut self, mut transport: StdioTransport) -> repobot_core::Result<()> {
        tracing::info!(
            "Starting agent server (format: {})",
            self.dispatcher.format().as_str()
        );

        loop {
            match transport.read_message() {
                Ok(Some(msg)) => {
                    if let Some(resp) = self.handle_message(msg).await {
                        if let Err(e) = transport.write_response(&resp) {
                            tracing::error!("Failed to write response: {}", e);
                            break;
                        }
                    }
                }
                Ok(None) => {
                    tracing::info!("EOF received, shutting down");
                    break;
                }
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    let error_resp = JsonRpcResponse::error(
                        RequestId::Null,
                        JsonRpcError::parse_error(&e.to_string()),
                    );
                    if let Err(e) = transport.write_response(&error_resp) {
                        tracing::error!("Failed to write response: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("Transport error: {}", e);
                    break;
                }
            }
        }

        tracing::info!("Agent server stopped");
        Ok(())
    }

    /// Handle an incoming message.
    async fn handle_message(&mut self, msg: IncomingMessage) -> Option<JsonRpcResponse> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(notif) => {
                self.handle_notification(&notif.method);
                None
            }
        }
    }

    /// Handle a JSON-RPC request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {} (id: {:?})", req.method, req.id);

        if req.jsonrpc != JSONRPC_VERSION {
            return JsonRpcResponse::error(
                req.id,
                JsonRpcError::invalid_request(&format!("unsupported jsonrpc version {}", req.jsonrpc)),
            );
        }

        match req.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(req.id, req.params),
            methods::PING => JsonRpcResponse::success(req.id, json!({})),
            methods::MANIFEST => JsonRpcResponse::from_result(req.id, &manifest()),
            methods::REPO_REQUEST => self.handle_repo_request(req.id, req.params).await,
            method => {
                tracing::warn!("Unknown method: {}", method);
                JsonRpcResponse::error(req.id, JsonRpcError::method_not_found(method))
            }
        }
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" => tracing::info!("Client initialized"),
            _ => tracing::debug!("Ignoring notification: {}", method),
        }
    }

    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        if self.initialized {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request("Server already initialized"),
            );
        }

        if let Some(params) = params {
            match serde_json::from_value::<InitializeParams>(params) {
                Ok(InitializeParams {
                    client_info: Some(client),
                }) => {
                    tracing::info!("Client: {} v{}", client.name, client.version);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to parse initialize params: {}", e),
            }
        }

        self.initialized = true;

        let result = InitializeResult {
            protocol: PROTOCOL_NAME.to_string(),
            server_info: ServerInfo {
                name: "repobot".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        JsonRpcResponse::from_result(id, &result)
    }

    async fn handle_repo_request(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let request: RepoRequest = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(request) => request,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(&e.to_string()),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(id, JsonRpcError::invalid_params("Missing params"));
            }
        };

        let response = self.dispatcher.dispatch(&request).await;
        JsonRpcResponse::from_result(id, &response)
    }
}

/// Describe the supported actions and the request shape.
pub fn manifest() -> ManifestResult {
    let actions = ActionKind::ALL
        .iter()
        .map(|kind| ActionDefinition {
            name: kind.as_str().to_string(),
            description: kind.description().to_string(),
            required: kind.required_fields().iter().map(|f| f.to_string()).collect(),
        })
        .collect();

    let action_names: Vec<&str> = ActionKind::ALL.iter().map(|k| k.as_str()).collect();

    ManifestResult {
        protocol: PROTOCOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        actions,
        request_schema: json!({
            "type": "object",
            "properties": {
                "repo_url": { "type": "string", "description": "Repository URL, e.g. https://github.com/owner/name" },
                "action": { "type": "string", "enum": action_names },
                "issue_title": { "type": "string" },
                "issue_body": { "type": "string" },
                "collaborator_username": { "type": "string" },
                "compare_repo_url": { "type": "string" },
                "user_info": { "type": "string", "description": "GitHub username or profile URL" }
            },
            "required": ["action"]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::tests::{happy_host, MockHost};
    use crate::transport::SharedWriter;
    use repobot_core::INVALID_REQUEST_MESSAGE;
    use std::io::Cursor;
    use std::sync::Arc;

    fn server_with(host: MockHost) -> AgentServer {
        AgentServer::new(Dispatcher::new(Arc::new(host)))
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RequestId::Number(id),
            method: method.to_string(),
            params,
        }
    }

    async fn run_lines(server: &mut AgentServer, input: &str) -> Vec<Value> {
        let output = SharedWriter::default();
        let transport = StdioTransport::new(
            Box::new(Cursor::new(input.to_string())),
            Box::new(output.clone()),
        );
        server.run_with(transport).await.unwrap();

        output
            .contents()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_once() {
        let mut server = server_with(MockHost::new());

        let first = server.handle_request(request(1, "initialize", None)).await;
        let result = first.result.unwrap();
        assert_eq!(result["protocol"], "GitHubRepoProtocol");
        assert_eq!(result["serverInfo"]["name"], "repobot");
        assert!(server.initialized);

        let second = server.handle_request(request(2, "initialize", None)).await;
        assert_eq!(second.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_initialize_with_client_info() {
        let mut server = server_with(MockHost::new());

        let resp = server
            .handle_request(request(
                1,
                "initialize",
                Some(json!({"clientInfo": {"name": "chat-ui", "version": "2.0"}})),
            ))
            .await;

        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = server_with(MockHost::new());

        let resp = server.handle_request(request(7, "ping", None)).await;

        assert_eq!(resp.id, RequestId::Number(7));
        assert_eq!(resp.result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_manifest_lists_every_action() {
        let mut server = server_with(MockHost::new());

        let resp = server.handle_request(request(1, "manifest", None)).await;
        let result = resp.result.unwrap();

        assert_eq!(result["protocol"], PROTOCOL_NAME);
        let actions = result["actions"].as_array().unwrap();
        assert_eq!(actions.len(), ActionKind::ALL.len());
        assert_eq!(actions[0]["name"], "get_details");
        assert_eq!(actions[0]["required"], json!(["repo_url"]));
        assert_eq!(
            result["requestSchema"]["properties"]["action"]["enum"]
                .as_array()
                .unwrap()
                .len(),
            ActionKind::ALL.len()
        );
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let mut server = server_with(MockHost::new());

        let resp = server.handle_request(request(1, "tools/list", None)).await;

        assert_eq!(resp.error.unwrap().code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let mut server = server_with(MockHost::new());
        let mut req = request(1, "ping", None);
        req.jsonrpc = "1.0".to_string();

        let resp = server.handle_request(req).await;

        assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_repo_request_without_params() {
        let mut server = server_with(MockHost::new());

        let resp = server.handle_request(request(1, "repo/request", None)).await;

        assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_repo_request_without_action() {
        // No expectations: any host call panics
        let server = server_with(MockHost::new());

        let resp = server
            .handle_repo_request(
                RequestId::Number(1),
                Some(json!({"repo_url": "https://github.com/octo/hello"})),
            )
            .await;

        assert!(resp.error.is_none());
        assert_eq!(
            resp.result,
            Some(json!({"message": INVALID_REQUEST_MESSAGE, "type": "final"}))
        );
    }

    #[tokio::test]
    async fn test_repo_request_bad_params() {
        let mut server = server_with(MockHost::new());

        let resp = server
            .handle_request(request(1, "repo/request", Some(json!({"repo_url": 5}))))
            .await;

        assert_eq!(resp.error.unwrap().code, JsonRpcError::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_repo_request_invalid_action() {
        let mut server = server_with(MockHost::new());

        let resp = server
            .handle_request(request(
                1,
                "repo/request",
                Some(json!({"repo_url": "https://github.com/octo/hello", "action": "fork"})),
            ))
            .await;

        let result = resp.result.unwrap();
        assert_eq!(result["message"], INVALID_REQUEST_MESSAGE);
        assert_eq!(result["type"], "final");
    }

    #[tokio::test]
    async fn test_run_one_reply_per_request() {
        let mut server = server_with(happy_host());
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"repo/request\",",
            "\"params\":{\"repo_url\":\"https://github.com/octo/hello\",\"action\":\"get_branches\"}}\n",
        );

        let replies = run_lines(&mut server, input).await;

        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 1);
        assert_eq!(
            replies[0]["result"]["message"],
            "Branches in octo/hello:\n- main"
        );
    }

    #[tokio::test]
    async fn test_run_recovers_from_parse_error() {
        let mut server = server_with(MockHost::new());
        let input = concat!(
            "garbage\n",
            "{\"jsonrpc\":\"2.0\",\"method\":\"initialized\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":\"p\",\"method\":\"ping\"}\n",
        );

        let replies = run_lines(&mut server, input).await;

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["id"], Value::Null);
        assert_eq!(replies[0]["error"]["code"], JsonRpcError::PARSE_ERROR);
        assert_eq!(replies[1]["id"], "p");
    }
}
