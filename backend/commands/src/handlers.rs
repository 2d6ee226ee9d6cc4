/// Built-in command handlers, all backed by one shared `ExecGateway`.
use anyhow::Result;
use async_trait::async_trait;
use clawgate_core::{ApprovalRequest, ApprovalState, ExecResult};
use clawgate_sandbox::{ExecGateway, Submission};
use std::sync::Arc;
use tracing::info;

use crate::dispatch::{CommandContext, CommandHandler, CommandResponse};
use crate::registry::CommandRegistry;
use crate::types::CommandInvocation;

/// Render an execution result as a chat reply.
pub fn format_result(result: &ExecResult) -> String {
    let mut lines = Vec::new();
    if result.timed_out {
        lines.push("⏱️ Timed out".to_string());
    } else if result.success() {
        lines.push("✅ Exit code 0".to_string());
    } else {
        lines.push(format!("❌ Exit code {}", result.exit_code));
    }
    if !result.stdout.is_empty() {
        lines.push(format!("```\n{}\n```", result.stdout));
    }
    if !result.stderr.is_empty() {
        lines.push(format!("stderr:\n```\n{}\n```", result.stderr));
    }
    if result.stdout.is_empty() && result.stderr.is_empty() {
        lines.push("(no output)".to_string());
    }
    lines.join("\n")
}

/// Explain why approve/reject returned nothing.
fn not_applicable(id: &str, existing: Option<ApprovalRequest>, sender_id: &str) -> CommandResponse {
    match existing {
        Some(req) if req.state == ApprovalState::Approved => {
            CommandResponse::ephemeral(format!("ℹ️ Request `{id}` was already approved"))
        }
        Some(req) if req.requester_id != sender_id => CommandResponse::ephemeral(format!(
            "🔒 Only {} can approve request `{id}`",
            req.requester_name
        )),
        _ => CommandResponse::ephemeral(format!("❓ No pending request `{id}`")),
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub struct RunHandler {
    pub gateway: Arc<ExecGateway>,
    pub prefix: String,
}

#[async_trait]
impl CommandHandler for RunHandler {
    async fn handle(
        &self,
        ctx: &CommandContext,
        inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        let command = inv.raw_args.trim();
        if command.is_empty() {
            return Ok(CommandResponse::ephemeral(format!("❌ Usage: {}run <command>", self.prefix)));
        }

        let outcome = self
            .gateway
            .submit(command, &ctx.sender_id, &ctx.sender_name, ctx.notifier.clone())
            .await;

        let reply = match outcome {
            Submission::Blocked => format!("🚫 Blocked by policy: `{command}`"),
            Submission::Executed(result) => format_result(&result),
            Submission::PendingApproval(req) => format!(
                "⏳ Approval required for `{cmd}`\nRequest id: `{id}` (expires in {timeout})\n\
                 Reply `{p}approve {id}` to run it or `{p}reject {id}` to cancel.",
                cmd = req.command,
                id = req.id,
                timeout = self.gateway.format_timeout(),
                p = self.prefix,
            ),
        };
        Ok(CommandResponse::ok(reply))
    }
}

// ---------------------------------------------------------------------------
// approve
// ---------------------------------------------------------------------------

pub struct ApproveHandler {
    pub gateway: Arc<ExecGateway>,
    pub prefix: String,
}

#[async_trait]
impl CommandHandler for ApproveHandler {
    async fn handle(
        &self,
        ctx: &CommandContext,
        inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        let Some(id) = inv.args.first() else {
            return Ok(CommandResponse::ephemeral(format!("❌ Usage: {}approve <id>", self.prefix)));
        };
        let id = id.to_lowercase();

        match self.gateway.approve_and_execute(&id, &ctx.sender_id).await {
            Some((req, result)) => Ok(CommandResponse::ok(format!(
                "👍 Approved `{}`: `{}`\n{}",
                req.id,
                req.command,
                format_result(&result)
            ))),
            None => Ok(not_applicable(&id, self.gateway.get_request(&id), &ctx.sender_id)),
        }
    }
}

// ---------------------------------------------------------------------------
// reject
// ---------------------------------------------------------------------------

pub struct RejectHandler {
    pub gateway: Arc<ExecGateway>,
    pub prefix: String,
}

#[async_trait]
impl CommandHandler for RejectHandler {
    async fn handle(
        &self,
        ctx: &CommandContext,
        inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        let Some(id) = inv.args.first() else {
            return Ok(CommandResponse::ephemeral(format!("❌ Usage: {}reject <id>", self.prefix)));
        };
        let id = id.to_lowercase();

        match self.gateway.reject(&id) {
            Some(req) => {
                info!(id = %req.id, by = %ctx.sender_id, "Rejected via chat");
                Ok(CommandResponse::ok(format!("🛑 Rejected `{}`: `{}`", req.id, req.command)))
            }
            None => match self.gateway.get_request(&id) {
                Some(req) if req.state == ApprovalState::Approved => Ok(CommandResponse::ephemeral(
                    format!("ℹ️ Request `{id}` was already approved"),
                )),
                _ => Ok(CommandResponse::ephemeral(format!("❓ No pending request `{id}`"))),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// pending
// ---------------------------------------------------------------------------

pub struct PendingHandler {
    pub gateway: Arc<ExecGateway>,
}

#[async_trait]
impl CommandHandler for PendingHandler {
    async fn handle(
        &self,
        ctx: &CommandContext,
        _inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        let pending = self.gateway.list_pending(Some(&ctx.sender_id));
        if pending.is_empty() {
            return Ok(CommandResponse::ephemeral("📭 No pending commands"));
        }
        let mut lines = vec![format!("*Pending commands ({}):*", pending.len())];
        for req in pending {
            lines.push(format!(
                "• `{}` — `{}` (requested {} UTC)",
                req.id,
                req.command,
                req.created_at.format("%H:%M:%S")
            ));
        }
        Ok(CommandResponse::ephemeral(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

pub struct HelpHandler {
    pub registry: CommandRegistry,
    pub prefix: String,
}

#[async_trait]
impl CommandHandler for HelpHandler {
    async fn handle(
        &self,
        _ctx: &CommandContext,
        _inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        let mut lines = vec!["*Available commands:*".to_string()];
        for cmd in self.registry.all() {
            lines.push(format!("• `{}{}` — {}", self.prefix, cmd.usage, cmd.description));
        }
        Ok(CommandResponse::ephemeral(lines.join("\n")))
    }
}
