// file: src/mcp/server.rs
// description: MCP server exposing pull, push, status and history of the documentation repository
// reference: https://docs.rs/rmcp

use crate::config::Config;
use crate::tools;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::Parameters;
use rmcp::model::*;
use rmcp::schemars::JsonSchema;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct PushRequest {
    /// Commit message for the staged changes (default: "Agent auto-update")
    pub commit_message: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct HistoryRequest {
    /// Maximum number of commits to return (default: 10)
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct DocsSyncMcp {
    config: Arc<Config>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DocsSyncMcp {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            tool_router: Self::tool_router(),
        }
    }

    pub fn get_tool_router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    /// Runs a blocking synchronizer call off the async executor.
    async fn run_blocking<F>(&self, task: F) -> Result<CallToolResult, McpError>
    where
        F: FnOnce(&Config) -> String + Send + 'static,
    {
        let config = Arc::clone(&self.config);
        let text = tokio::task::spawn_blocking(move || task(&config))
            .await
            .map_err(|e| McpError::internal_error(format!("Tool task failed: {}", e), None))?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    #[tool(description = "Pull the latest changes of the documentation repository from its remote")]
    async fn pull_repo(&self) -> Result<CallToolResult, McpError> {
        info!("MCP: pull_repo");
        self.run_blocking(tools::pull_repo).await
    }

    #[tool(description = "Stage all changes in the documentation repository, commit them and push to the remote")]
    async fn push_repo(
        &self,
        Parameters(request): Parameters<PushRequest>,
    ) -> Result<CallToolResult, McpError> {
        info!("MCP: push_repo ({:?})", request.commit_message);
        self.run_blocking(move |config| tools::push_repo(config, request.commit_message.as_deref()))
            .await
    }

    #[tool(description = "Report branch, uncommitted changes, untracked files and last commit of the documentation repository")]
    async fn get_repo_status(&self) -> Result<CallToolResult, McpError> {
        info!("MCP: get_repo_status");
        self.run_blocking(|config| tools::get_repo_status(config).to_json())
            .await
    }

    #[tool(description = "List the most recent commits of the documentation repository")]
    async fn repo_history(
        &self,
        Parameters(request): Parameters<HistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        let limit = request.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        info!("MCP: repo_history (limit {})", limit);
        self.run_blocking(move |config| tools::repo_history(config, limit))
            .await
    }
}

#[tool_handler]
impl ServerHandler for DocsSyncMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(format!(
                "Keeps the documentation repository {} in sync. Use pull_repo before \
                 editing, push_repo after, get_repo_status to inspect the working copy.",
                self.config.repository.remote_url
            )),
            ..Default::default()
        }
    }
}
