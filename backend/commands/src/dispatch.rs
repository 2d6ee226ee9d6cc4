/// Command dispatch: route detected commands to handlers.
use anyhow::Result;
use async_trait::async_trait;
use clawgate_core::NotificationSink;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::detection::detect_command;
use crate::registry::CommandRegistry;
use crate::types::CommandInvocation;

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// Context passed to every command handler.
#[derive(Clone)]
pub struct CommandContext {
    pub room_id: String,
    pub sender_id: String,
    pub sender_name: String,
    /// Delivers late messages (expiry notices) back to this room.
    pub notifier: Arc<dyn NotificationSink>,
}

/// The result returned by a command handler, a text reply to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub text: String,
    pub ephemeral: bool, // only visible to the invoker
}

impl CommandResponse {
    pub fn ok(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: false }
    }
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self { text: text.into(), ephemeral: true }
    }
}

#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &CommandContext,
        inv: &CommandInvocation,
    ) -> Result<CommandResponse>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct CommandDispatcher {
    prefix: String,
    registry: CommandRegistry,
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandDispatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), registry: CommandRegistry::new(), handlers: HashMap::new() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn register(&mut self, key: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(key.into(), handler);
    }

    pub async fn dispatch(
        &self,
        ctx: &CommandContext,
        inv: &CommandInvocation,
    ) -> Result<CommandResponse> {
        if let Some(handler) = self.handlers.get(&inv.key) {
            info!(
                command = %inv.key,
                room = %ctx.room_id,
                sender = %ctx.sender_id,
                "Dispatching command"
            );
            handler.handle(ctx, inv).await
        } else {
            Ok(CommandResponse::ephemeral(format!(
                "❓ No handler registered for command {}{}",
                self.prefix, inv.key
            )))
        }
    }

    /// Detect and dispatch a raw chat message. `None` for ordinary text.
    pub async fn handle_text(
        &self,
        ctx: &CommandContext,
        text: &str,
    ) -> Result<Option<CommandResponse>> {
        match detect_command(text, &self.prefix, &self.registry) {
            Some(inv) => self.dispatch(ctx, &inv).await.map(Some),
            None => Ok(None),
        }
    }
}
