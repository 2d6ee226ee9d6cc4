//! Pending approval registry.
//!
//! Each request starts `Pending` with its own expiry task. Exactly one of
//! approve, reject or expire moves it to a terminal state; the `Pending` check
//! under the store lock is the only guard, so the first caller wins and every
//! later caller gets `None`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use clawgate_core::{ApprovalRequest, ApprovalState, GateError, NotificationSink};
use rand::RngCore;
use rand::rngs::OsRng;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

struct Entry {
    request: ApprovalRequest,
    /// Distinguishes reuses of the same id; an expiry task only touches the
    /// entry it was spawned for.
    generation: u64,
    timer: Option<JoinHandle<()>>,
    notify: Option<Arc<dyn NotificationSink>>,
}

impl Entry {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

#[derive(Default)]
struct Store {
    entries: Mutex<HashMap<String, Entry>>,
    generations: AtomicU64,
}

impl Store {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fired by the expiry task. A request that was already resolved is left alone.
    async fn expire(&self, id: &str, generation: u64, timeout: Duration) {
        let (request, sink) = {
            let mut entries = self.lock();
            match entries.get_mut(id) {
                Some(entry) if entry.generation != generation => return,
                Some(entry) if entry.request.state.is_pending() => {}
                Some(entry) => {
                    entry.timer = None;
                    return;
                }
                None => return,
            }
            let Some(mut entry) = entries.remove(id) else { return };
            entry.timer = None;
            entry.request.state = ApprovalState::Expired;
            (entry.request, entry.notify.take())
        };

        info!(id = %request.id, requester = %request.requester_id, "Approval request expired");

        let Some(sink) = sink else { return };
        let text = format!(
            "⏰ Approval request `{}` expired: `{}` was not approved within {}.",
            request.id,
            request.command,
            format_timeout(timeout),
        );
        if let Err(e) = sink.notify(&text).await {
            let err = GateError::Notification(e.to_string());
            warn!(id = %request.id, error = %err, "Failed to deliver expiry notice");
        }
    }
}

/// In-memory store of approval requests, keyed by a 4-hex-character id.
///
/// Must be used from within a Tokio runtime: every new request spawns its
/// expiry task. Dropping the registry cancels all outstanding timers.
pub struct ApprovalRegistry {
    store: Arc<Store>,
    timeout: Duration,
}

impl ApprovalRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self { store: Arc::new(Store::default()), timeout }
    }

    /// Park a command as `Pending` and start its expiry countdown.
    pub fn create_request(
        &self,
        command: &str,
        requester_id: &str,
        requester_name: &str,
        notify: Arc<dyn NotificationSink>,
    ) -> ApprovalRequest {
        let mut entries = self.store.lock();
        let id = generate_id(&entries);
        let generation = self.store.generations.fetch_add(1, Ordering::Relaxed);

        let request = ApprovalRequest {
            id: id.clone(),
            command: command.to_string(),
            requester_id: requester_id.to_string(),
            requester_name: requester_name.to_string(),
            created_at: Utc::now(),
            state: ApprovalState::Pending,
        };

        // The task needs the lock to expire anything, so it cannot observe
        // the entry before the handle is stored.
        let timer =
            spawn_expiry(Arc::downgrade(&self.store), id.clone(), generation, self.timeout);
        entries.insert(
            id.clone(),
            Entry {
                request: request.clone(),
                generation,
                timer: Some(timer),
                notify: Some(notify),
            },
        );

        info!(
            id = %id,
            requester = %requester_id,
            command = %command,
            timeout_ms = self.timeout.as_millis() as u64,
            "Approval request created"
        );
        request
    }

    /// Approve a pending request. Only the original requester may do this.
    ///
    /// Approved requests stay retrievable through `get_request`.
    pub fn approve(&self, id: &str, approver_id: &str) -> Option<ApprovalRequest> {
        let mut entries = self.store.lock();
        let entry = entries.get_mut(id)?;

        if !entry.request.state.is_pending() {
            debug!(id = %id, state = %entry.request.state, "Approve ignored, request not pending");
            return None;
        }
        if entry.request.requester_id != approver_id {
            warn!(
                id = %id,
                requester = %entry.request.requester_id,
                approver = %approver_id,
                "Approve refused, approver is not the requester"
            );
            return None;
        }

        entry.cancel_timer();
        entry.notify = None;
        entry.request.state = ApprovalState::Approved;
        info!(id = %id, approver = %approver_id, "Approval request approved");
        Some(entry.request.clone())
    }

    /// Reject a pending request. Anyone may reject; the request is removed.
    pub fn reject(&self, id: &str) -> Option<ApprovalRequest> {
        let mut entries = self.store.lock();
        if !entries.get(id)?.request.state.is_pending() {
            debug!(id = %id, "Reject ignored, request not pending");
            return None;
        }

        let mut entry = entries.remove(id)?;
        entry.cancel_timer();
        entry.request.state = ApprovalState::Rejected;
        info!(id = %id, "Approval request rejected");
        Some(entry.request)
    }

    pub fn get_request(&self, id: &str) -> Option<ApprovalRequest> {
        self.store.lock().get(id).map(|e| e.request.clone())
    }

    /// All pending requests, oldest first, optionally for one requester.
    pub fn list_pending(&self, requester_id: Option<&str>) -> Vec<ApprovalRequest> {
        let entries = self.store.lock();
        let mut pending: Vec<ApprovalRequest> = entries
            .values()
            .filter(|e| e.request.state.is_pending())
            .filter(|e| requester_id.is_none_or(|r| e.request.requester_id == r))
            .map(|e| e.request.clone())
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        pending
    }

    pub fn format_timeout(&self) -> String {
        format_timeout(self.timeout)
    }

    /// Cancel every timer and forget every request. Safe to call repeatedly.
    pub fn shutdown(&self) {
        let drained: Vec<Entry> = self.store.lock().drain().map(|(_, e)| e).collect();
        if drained.is_empty() {
            return;
        }
        let count = drained.len();
        for mut entry in drained {
            entry.cancel_timer();
        }
        info!(count, "Approval registry shut down");
    }
}

impl Drop for ApprovalRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_expiry(
    store: Weak<Store>,
    id: String,
    generation: u64,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        if let Some(store) = store.upgrade() {
            store.expire(&id, generation, timeout).await;
        }
    })
}

/// Draw ids from the OS RNG until one is free in the live store.
fn generate_id(entries: &HashMap<String, Entry>) -> String {
    loop {
        let id = format!("{:04x}", OsRng.next_u32() as u16);
        if !entries.contains_key(&id) {
            return id;
        }
        debug!(id = %id, "Approval id collision, retrying");
    }
}

/// Render a timeout as whole minutes from one minute up, whole seconds below.
pub fn format_timeout(timeout: Duration) -> String {
    let ms = timeout.as_millis();
    if ms < 60_000 {
        format!("{}s", ms / 1000)
    } else {
        format!("{}m", ms / 60_000)
    }
}
