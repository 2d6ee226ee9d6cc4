//! Console channel: stdin/stdout stand in for a chat room.

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use clawgate_commands::{build_default_dispatcher, CommandContext};
use clawgate_core::NotificationSink;
use clawgate_sandbox::ExecGateway;

/// Prints late notices (expiry) to stdout.
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn notify(&self, text: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "\n{text}")?;
        out.flush()?;
        Ok(())
    }
}

fn prompt() {
    print!("clawgate> ");
    let _ = std::io::stdout().flush();
}

/// Read chat lines until EOF, dispatching prefixed commands.
pub async fn run_shell(gateway: Arc<ExecGateway>, prefix: &str, user: &str) -> Result<()> {
    let dispatcher = build_default_dispatcher(gateway, prefix);
    let ctx = CommandContext {
        room_id: "console".to_string(),
        sender_id: user.to_string(),
        sender_name: user.to_string(),
        notifier: Arc::new(ConsoleSink),
    };
    info!(user = %user, prefix = %prefix, "Console channel open");
    println!("Type {prefix}help for commands, Ctrl-D to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt();
    while let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            match dispatcher.handle_text(&ctx, &line).await? {
                Some(reply) => println!("{}", reply.text),
                None => println!("Not a command. Try {prefix}help"),
            }
        }
        prompt();
    }
    println!();
    info!("Console channel closed");
    Ok(())
}
