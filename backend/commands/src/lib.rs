pub mod detection;
pub mod dispatch;
pub mod handlers;
pub mod registry;
pub mod types;

pub use detection::detect_command;
pub use dispatch::{CommandContext, CommandDispatcher, CommandHandler, CommandResponse};
pub use handlers::{
    format_result, ApproveHandler, HelpHandler, PendingHandler, RejectHandler, RunHandler,
};
pub use registry::{builtin_commands, CommandRegistry};
pub use types::{CommandDef, CommandInvocation};

use clawgate_sandbox::ExecGateway;
use std::sync::Arc;

/// Build a dispatcher with every built-in handler wired to one gateway.
pub fn build_default_dispatcher(gateway: Arc<ExecGateway>, prefix: &str) -> CommandDispatcher {
    let mut dispatcher = CommandDispatcher::new(prefix);
    let prefix = prefix.to_string();

    dispatcher.register(
        "run",
        Arc::new(RunHandler { gateway: gateway.clone(), prefix: prefix.clone() }),
    );
    dispatcher.register(
        "approve",
        Arc::new(ApproveHandler { gateway: gateway.clone(), prefix: prefix.clone() }),
    );
    dispatcher.register(
        "reject",
        Arc::new(RejectHandler { gateway: gateway.clone(), prefix: prefix.clone() }),
    );
    dispatcher.register("pending", Arc::new(PendingHandler { gateway }));
    dispatcher.register("help", Arc::new(HelpHandler { registry: CommandRegistry::new(), prefix }));

    dispatcher
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use clawgate_core::{ApprovalConfig, NotificationSink};
    use clawgate_sandbox::ExecSettings;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RoomSink {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationSink for RoomSink {
        async fn notify(&self, text: &str) -> Result<()> {
            self.sent.lock().await.push(text.to_string());
            Ok(())
        }
    }

    fn dispatcher(approval_timeout: Duration) -> (CommandDispatcher, Arc<ExecGateway>) {
        let config = ApprovalConfig {
            allowlist: vec!["echo".into()],
            blocklist: vec!["rm -rf".into()],
            approval_timeout,
            require_approval_by_default: true,
        };
        let gateway = Arc::new(ExecGateway::new(
            config,
            ExecSettings::default().with_timeout(Duration::from_secs(10)),
        ));
        (build_default_dispatcher(gateway.clone(), "!"), gateway)
    }

    fn ctx(sender: &str, sink: Arc<RoomSink>) -> CommandContext {
        CommandContext {
            room_id: "!room:example.org".into(),
            sender_id: sender.into(),
            sender_name: sender.trim_start_matches('@').split(':').next().unwrap_or(sender).into(),
            notifier: sink,
        }
    }

    async fn say(d: &CommandDispatcher, ctx: &CommandContext, text: &str) -> String {
        d.handle_text(ctx, text).await.unwrap().expect("command reply").text
    }

    #[tokio::test]
    async fn plain_text_is_not_a_command() {
        let (d, _) = dispatcher(Duration::from_secs(60));
        let alice = ctx("@alice:x", Arc::new(RoomSink::default()));
        assert!(d.handle_text(&alice, "hello there").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn allowed_command_runs_immediately() {
        let (d, _) = dispatcher(Duration::from_secs(60));
        let alice = ctx("@alice:x", Arc::new(RoomSink::default()));
        let reply = say(&d, &alice, "!run echo hi").await;
        assert!(reply.contains("Exit code 0"));
        assert!(reply.contains("hi"));
    }

    #[tokio::test]
    async fn blocked_command_is_refused() {
        let (d, gw) = dispatcher(Duration::from_secs(60));
        let alice = ctx("@alice:x", Arc::new(RoomSink::default()));
        let reply = say(&d, &alice, "!run rm -rf /tmp/x").await;
        assert!(reply.contains("Blocked"));
        assert!(gw.list_pending(None).is_empty());
    }

    #[tokio::test]
    async fn approval_round_trip() {
        let (d, gw) = dispatcher(Duration::from_secs(60));
        let alice = ctx("@alice:x", Arc::new(RoomSink::default()));
        let bob = ctx("@bob:x", Arc::new(RoomSink::default()));

        let reply = say(&d, &alice, "!run printf approved-output").await;
        assert!(reply.contains("Approval required"));
        assert!(reply.contains("expires in 1m"));
        let id = gw.list_pending(Some("@alice:x"))[0].id.clone();
        assert!(reply.contains(&format!("!approve {id}")));

        let listing = say(&d, &alice, "!pending").await;
        assert!(listing.contains(&id));
        assert!(say(&d, &bob, "!pending").await.contains("No pending"));

        let refused = say(&d, &bob, &format!("!approve {id}")).await;
        assert!(refused.contains("Only alice"));

        let approved = say(&d, &alice, &format!("!approve {}", id.to_uppercase())).await;
        assert!(approved.contains("approved-output"));

        let again = say(&d, &alice, &format!("!approve {id}")).await;
        assert!(again.contains("already approved"));
        assert!(say(&d, &alice, "!pending").await.contains("No pending"));
    }

    #[tokio::test]
    async fn anyone_can_reject() {
        let (d, gw) = dispatcher(Duration::from_secs(60));
        let alice = ctx("@alice:x", Arc::new(RoomSink::default()));
        let bob = ctx("@bob:x", Arc::new(RoomSink::default()));

        say(&d, &alice, "!run curl https://example.com").await;
        let id = gw.list_pending(None)[0].id.clone();

        assert!(say(&d, &bob, &format!("!reject {id}")).await.contains("Rejected"));
        assert!(say(&d, &alice, &format!("!reject {id}")).await.contains("No pending request"));
        assert!(say(&d, &alice, &format!("!approve {id}")).await.contains("No pending request"));
    }

    #[tokio::test]
    async fn expiry_notice_reaches_the_room() {
        let (d, _) = dispatcher(Duration::from_millis(50));
        let sink = Arc::new(RoomSink::default());
        let alice = ctx("@alice:x", sink.clone());

        say(&d, &alice, "!run curl https://example.com").await;
        tokio::time::sleep(Duration::from_millis(250)).await;

        let sent = sink.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("expired"));
    }

    #[tokio::test]
    async fn usage_and_help() {
        let (d, _) = dispatcher(Duration::from_secs(60));
        let alice = ctx("@alice:x", Arc::new(RoomSink::default()));
        assert!(say(&d, &alice, "!run").await.contains("Usage: !run <command>"));
        assert!(say(&d, &alice, "!approve").await.contains("Usage"));
        let help = say(&d, &alice, "!help").await;
        for key in ["run", "approve", "reject", "pending"] {
            assert!(help.contains(&format!("!{key}")), "{help}");
        }
    }
}
