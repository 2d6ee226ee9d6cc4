use anyhow::Result;
use async_trait::async_trait;

/// Delivers an asynchronous message back to whoever submitted a command.
///
/// A sink is bound to one requester/room by the transport and handed to the
/// gateway when a pending request is created. The gateway calls it at most
/// once per request, when the request expires.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl NotificationSink for Recorder {
        async fn notify(&self, text: &str) -> Result<()> {
            self.0.lock().await.push(text.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn sink_is_object_safe() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let sink: Arc<dyn NotificationSink> = recorder.clone();
        sink.notify("hello").await.unwrap();
        assert_eq!(recorder.0.lock().await.as_slice(), ["hello".to_string()]);
    }
}
