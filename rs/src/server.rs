//! MCP server exposing the predictor as tools over stdio

use crate::labels::SleepPattern;
use crate::models::{FeatureVector, PredictPatternParams};
use crate::pipeline::PatternPredictor;
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{
        CallToolResult, Content, ErrorData as McpError, Implementation, ServerCapabilities,
        ServerInfo,
    },
    tool, tool_handler, tool_router,
    transport::stdio,
    ServerHandler, ServiceExt,
};
use serde::Serialize;
use std::future::Future;

/// One row of the label table as returned by `sleep_list_patterns`
#[derive(Debug, Serialize)]
struct PatternEntry {
    cluster_id: usize,
    pattern: SleepPattern,
    label: &'static str,
    insights: &'static [&'static str],
}

#[derive(Clone)]
pub struct SleepPatternServer {
    predictor: PatternPredictor,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SleepPatternServer {
    pub fn new(predictor: PatternPredictor) -> Self {
        Self {
            predictor,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Predict the sleep health pattern for a user's daily social media minutes (0-1440), weekly gaming hours (0-168) and introversion-extraversion score (1-5). Returns the pattern, a match confidence percentage and advice."
    )]
    async fn sleep_predict_pattern(
        &self,
        Parameters(params): Parameters<PredictPatternParams>,
    ) -> Result<CallToolResult, McpError> {
        let features = FeatureVector::try_from(params)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let report = self.predictor.classify(&features).map_err(|e| {
            tracing::error!("Prediction failed for {:?}: {}", features, e);
            McpError::internal_error(format!("Prediction failed: {e}"), None)
        })?;

        tracing::info!(
            "Predicted {} ({}) for {:?}",
            report.label,
            report.confidence_display(),
            features
        );

        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| McpError::internal_error(format!("Failed to encode report: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "List the known sleep health patterns and the advice attached to each.")]
    async fn sleep_list_patterns(&self) -> Result<CallToolResult, McpError> {
        let entries: Vec<PatternEntry> = SleepPattern::ALL
            .iter()
            .map(|&pattern| PatternEntry {
                cluster_id: pattern.cluster_id(),
                pattern,
                label: pattern.display_name(),
                insights: pattern.insights(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| McpError::internal_error(format!("Failed to encode patterns: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for SleepPatternServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Sleep health pattern predictor. Call sleep_predict_pattern with a user's digital habits to get their pattern group and advice."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

/// Serve the predictor over stdio until the client disconnects
pub async fn serve_stdio(predictor: PatternPredictor) -> crate::Result<()> {
    tracing::info!("Starting MCP server on stdio");

    let service = SleepPatternServer::new(predictor)
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("Failed to start MCP server: {:?}", e))?;

    let reason = service.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", reason);
    Ok(())
}
