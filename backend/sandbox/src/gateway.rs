//! `ExecGateway`: one instance per process, shared as `Arc<ExecGateway>`
//! with every command handler.

use std::sync::Arc;
use std::time::Duration;

use clawgate_core::{ApprovalConfig, ApprovalRequest, Classification, ExecResult, NotificationSink};
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::executor::{self, ExecSettings};
use crate::registry::ApprovalRegistry;

/// What happened to a submitted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Blocked,
    Executed(ExecResult),
    PendingApproval(ApprovalRequest),
}

pub struct ExecGateway {
    classifier: Classifier,
    registry: ApprovalRegistry,
    exec: ExecSettings,
}

impl ExecGateway {
    pub fn new(config: ApprovalConfig, exec: ExecSettings) -> Self {
        info!(
            allowlist = config.allowlist.len(),
            blocklist = config.blocklist.len(),
            approval_timeout_ms = config.approval_timeout.as_millis() as u64,
            require_approval_by_default = config.require_approval_by_default,
            "Exec gateway ready"
        );
        Self {
            classifier: Classifier::new(&config),
            registry: ApprovalRegistry::new(config.approval_timeout),
            exec,
        }
    }

    pub fn classify(&self, command: &str) -> Classification {
        self.classifier.classify(command)
    }

    pub fn create_request(
        &self,
        command: &str,
        requester_id: &str,
        requester_name: &str,
        notify: Arc<dyn NotificationSink>,
    ) -> ApprovalRequest {
        self.registry.create_request(command, requester_id, requester_name, notify)
    }

    pub fn approve(&self, id: &str, approver_id: &str) -> Option<ApprovalRequest> {
        self.registry.approve(id, approver_id)
    }

    pub fn reject(&self, id: &str) -> Option<ApprovalRequest> {
        self.registry.reject(id)
    }

    pub fn get_request(&self, id: &str) -> Option<ApprovalRequest> {
        self.registry.get_request(id)
    }

    pub fn list_pending(&self, requester_id: Option<&str>) -> Vec<ApprovalRequest> {
        self.registry.list_pending(requester_id)
    }

    pub fn format_timeout(&self) -> String {
        self.registry.format_timeout()
    }

    pub fn shutdown(&self) {
        self.registry.shutdown();
    }

    /// Run a command under the configured ceiling, or `timeout` if given.
    ///
    /// This does not classify: callers decide eligibility first.
    pub async fn execute(&self, command: &str, timeout: Option<Duration>) -> ExecResult {
        let settings = match timeout {
            Some(t) => self.exec.with_timeout(t),
            None => self.exec,
        };
        executor::execute(command, &settings).await
    }

    /// Classify and act: refuse, run, or park for approval.
    pub async fn submit(
        &self,
        command: &str,
        requester_id: &str,
        requester_name: &str,
        notify: Arc<dyn NotificationSink>,
    ) -> Submission {
        match self.classify(command) {
            Classification::Blocked => {
                warn!(requester = %requester_id, command = %command, "Refused blocked command");
                Submission::Blocked
            }
            Classification::Allowed => Submission::Executed(self.execute(command, None).await),
            Classification::ApprovalRequired => Submission::PendingApproval(
                self.create_request(command, requester_id, requester_name, notify),
            ),
        }
    }

    /// Approve a request and immediately run its command.
    pub async fn approve_and_execute(
        &self,
        id: &str,
        approver_id: &str,
    ) -> Option<(ApprovalRequest, ExecResult)> {
        let request = self.approve(id, approver_id)?;
        let result = self.execute(&request.command, None).await;
        Some((request, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use clawgate_core::ApprovalState;

    struct NullSink;

    #[async_trait]
    impl NotificationSink for NullSink {
        async fn notify(&self, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    fn gateway(require_approval_by_default: bool) -> ExecGateway {
        let config = ApprovalConfig {
            allowlist: vec!["echo".into(), "aidevops status".into()],
            blocklist: vec!["rm -rf".into()],
            approval_timeout: Duration::from_secs(60),
            require_approval_by_default,
        };
        ExecGateway::new(config, ExecSettings::default().with_timeout(Duration::from_secs(10)))
    }

    #[tokio::test]
    async fn submit_refuses_blocked_commands() {
        let gw = gateway(true);
        let outcome = gw.submit("rm -rf /", "@a:x", "a", Arc::new(NullSink)).await;
        assert_eq!(outcome, Submission::Blocked);
        assert!(gw.list_pending(None).is_empty());
    }

    #[tokio::test]
    async fn submit_runs_allowed_commands() {
        let gw = gateway(true);
        match gw.submit("echo ok", "@a:x", "a", Arc::new(NullSink)).await {
            Submission::Executed(r) => assert_eq!(r.stdout, "ok"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_parks_unknown_commands() {
        let gw = gateway(true);
        let Submission::PendingApproval(req) =
            gw.submit("printf parked", "@a:x", "a", Arc::new(NullSink)).await
        else {
            panic!("expected pending approval");
        };
        assert_eq!(req.state, ApprovalState::Pending);
        assert_eq!(gw.list_pending(Some("@a:x")).len(), 1);

        let (approved, result) = gw.approve_and_execute(&req.id, "@a:x").await.unwrap();
        assert_eq!(approved.state, ApprovalState::Approved);
        assert_eq!(result.stdout, "parked");
        assert!(gw.approve_and_execute(&req.id, "@a:x").await.is_none());
    }

    #[tokio::test]
    async fn permissive_default_runs_unknown_commands() {
        let gw = gateway(false);
        assert_eq!(gw.classify("printf hi"), Classification::Allowed);
        assert!(matches!(
            gw.submit("printf hi", "@a:x", "a", Arc::new(NullSink)).await,
            Submission::Executed(_)
        ));
    }

    #[tokio::test]
    async fn execute_honours_explicit_timeout() {
        let gw = gateway(true);
        let r = gw.execute("sleep 5", Some(Duration::from_millis(100))).await;
        assert!(r.timed_out);
        assert_eq!(r.exit_code, -1);
    }

    #[tokio::test]
    async fn shutdown_empties_gateway() {
        let gw = gateway(true);
        let req = gw.create_request("curl x", "@a:x", "a", Arc::new(NullSink));
        gw.shutdown();
        assert!(gw.get_request(&req.id).is_none());
        assert!(gw.reject(&req.id).is_none());
        assert_eq!(gw.format_timeout(), "1m");
    }
}
