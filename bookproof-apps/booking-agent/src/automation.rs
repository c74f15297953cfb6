//!  Bookproof Booking Agent
//!
//!  Copyright (C) 2026  The Bookproof Authors
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Automation Channel
//!
//! The typed capability seam between the checkout flow and the remote
//! browser. The flow only ever sees the four capabilities below, so tests
//! drive it with a mock; production wires them to a Playwright MCP server
//! running as a child process.

use anyhow::Result;
use serde_json::Value;
use std::path::Path;

/// Opaque result of one remote action: the raw tool result as JSON. The
/// automation server guarantees no structure beyond "content with text
/// parts", so helpers dig, they do not deserialize.
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    raw: Value,
}

impl ActionOutcome {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// First text part of the tool result, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.raw
            .get("content")
            .and_then(Value::as_array)
            .and_then(|parts| parts.first())
            .and_then(|part| part.get("text"))
            .and_then(Value::as_str)
    }
}

/// The remote-automation capabilities the checkout flow depends on.
///
/// Every call is an effectful RPC with uniform failure semantics: `Err` for
/// transport or tool errors, `Ok` otherwise, including heuristic misses,
/// which are data, not errors.
pub trait AutomationChannel {
    /// Open the booking page at the given viewport, headed or headless.
    async fn navigate(
        &self,
        url: &str,
        width: u32,
        height: u32,
        headed: bool,
    ) -> Result<ActionOutcome>;

    /// Evaluate a script in the top-level page, optionally with an argument
    /// object.
    async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<ActionOutcome>;

    /// Fill one field inside an iframe addressed by a frame selector.
    async fn fill_in_frame(
        &self,
        iframe_selector: &str,
        css_selector: &str,
        value: &str,
    ) -> Result<ActionOutcome>;

    /// Export the current page as the PDF proof.
    async fn export_pdf(&self, output_dir: &Path, filename: &str) -> Result<ActionOutcome>;
}

impl<C: AutomationChannel> AutomationChannel for &C {
    async fn navigate(
        &self,
        url: &str,
        width: u32,
        height: u32,
        headed: bool,
    ) -> Result<ActionOutcome> {
        (**self).navigate(url, width, height, headed).await
    }

    async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<ActionOutcome> {
        (**self).evaluate(script, arg).await
    }

    async fn fill_in_frame(
        &self,
        iframe_selector: &str,
        css_selector: &str,
        value: &str,
    ) -> Result<ActionOutcome> {
        (**self).fill_in_frame(iframe_selector, css_selector, value).await
    }

    async fn export_pdf(&self, output_dir: &Path, filename: &str) -> Result<ActionOutcome> {
        (**self).export_pdf(output_dir, filename).await
    }
}

#[cfg(feature = "mcp")]
pub use mcp_channel::McpPlaywrightChannel;

#[cfg(feature = "mcp")]
mod mcp_channel {
    use super::{ActionOutcome, AutomationChannel};
    use crate::config::RunnerConfig;
    use anyhow::{Context, Result, bail};
    use rmcp::model::CallToolRequestParam;
    use rmcp::service::{RoleClient, RunningService};
    use rmcp::transport::TokioChildProcess;
    use rmcp::ServiceExt;
    use serde_json::{Value, json};
    use std::path::Path;
    use tokio::process::Command;

    /// MCP client session against a Playwright MCP server child process
    /// (the ExecuteAutomation server by default; see
    /// [`crate::config::BookingConfig`]).
    ///
    /// The session is the run's single long-lived resource. Call
    /// [`shutdown`](Self::shutdown) on every exit path so the child browser
    /// does not outlive the run.
    pub struct McpPlaywrightChannel {
        service: RunningService<RoleClient, ()>,
    }

    impl McpPlaywrightChannel {
        pub async fn spawn(runner: &RunnerConfig) -> Result<Self> {
            tracing::info!(
                "Launching automation server: {} {}",
                runner.command,
                runner.args.join(" ")
            );
            let mut cmd = Command::new(&runner.command);
            cmd.args(&runner.args);
            let transport = TokioChildProcess::new(cmd)
                .context("Failed to spawn Playwright MCP server process")?;
            let service = ()
                .serve(transport)
                .await
                .context("MCP handshake with automation server failed")?;
            Ok(Self { service })
        }

        pub async fn shutdown(self) {
            if let Err(e) = self.service.cancel().await {
                tracing::warn!("Automation server did not shut down cleanly: {e}");
            }
        }

        async fn call(&self, tool: &'static str, args: Value) -> Result<ActionOutcome> {
            tracing::debug!("MCP tool call: {tool}");
            let result = self
                .service
                .call_tool(CallToolRequestParam {
                    name: tool.into(),
                    arguments: args.as_object().cloned(),
                    task: None,
                })
                .await
                .with_context(|| format!("Tool call failed: {tool}"))?;
            let raw = serde_json::to_value(&result)
                .with_context(|| format!("Unserializable result from: {tool}"))?;
            let outcome = ActionOutcome::new(raw);
            if result.is_error.unwrap_or(false) {
                bail!(
                    "Tool {tool} reported an error: {}",
                    outcome.first_text().unwrap_or("<no detail>")
                );
            }
            Ok(outcome)
        }
    }

    impl AutomationChannel for McpPlaywrightChannel {
        async fn navigate(
            &self,
            url: &str,
            width: u32,
            height: u32,
            headed: bool,
        ) -> Result<ActionOutcome> {
            self.call(
                "Playwright_navigate",
                json!({
                    "url": url,
                    "headless": !headed,
                    "width": width,
                    "height": height,
                }),
            )
            .await
        }

        async fn evaluate(&self, script: &str, arg: Option<Value>) -> Result<ActionOutcome> {
            let mut args = json!({ "script": script });
            if let Some(arg) = arg {
                args["arg"] = arg;
            }
            self.call("Playwright_evaluate", args).await
        }

        async fn fill_in_frame(
            &self,
            iframe_selector: &str,
            css_selector: &str,
            value: &str,
        ) -> Result<ActionOutcome> {
            self.call(
                "Playwright_iframe_fill",
                json!({
                    "iframeSelector": iframe_selector,
                    "selector": css_selector,
                    "value": value,
                }),
            )
            .await
        }

        async fn export_pdf(&self, output_dir: &Path, filename: &str) -> Result<ActionOutcome> {
            self.call(
                "playwright_save_as_pdf",
                json!({
                    "outputPath": output_dir.display().to_string(),
                    "filename": filename,
                }),
            )
            .await
        }
    }
}
