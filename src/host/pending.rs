//! Correlated replies for message-passing bridges
//!
//! Every request gets its own token and its own oneshot channel. Whichever of
//! {reply, timeout} settles first removes the registration, so a reply that
//! arrives late finds nothing and is dropped.

use crate::error::{DevIdError, DevIdResult};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

/// Registry of in-flight bridge requests keyed by correlation token
#[derive(Debug, Default)]
pub struct PendingReplies {
    slots: Mutex<HashMap<Uuid, oneshot::Sender<String>>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request and return its token and reply receiver
    pub fn register(&self) -> (Uuid, oneshot::Receiver<String>) {
        let token = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.slots().insert(token, tx);
        (token, rx)
    }

    /// Deliver a reply. Returns false if the token is unknown or already settled.
    pub fn complete(&self, token: Uuid, value: impl Into<String>) -> bool {
        let Some(tx) = self.slots().remove(&token) else {
            debug!("Dropping reply for settled token {}", token);
            return false;
        };
        tx.send(value.into()).is_ok()
    }

    /// Drop a registration without replying
    pub fn cancel(&self, token: Uuid) -> bool {
        self.slots().remove(&token).is_some()
    }

    /// Wait for the reply to `token`, giving up after `timeout`
    pub async fn wait(
        &self,
        token: Uuid,
        rx: oneshot::Receiver<String>,
        timeout: Duration,
    ) -> DevIdResult<String> {
        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => {
                self.cancel(token);
                Err(DevIdError::bridge_failed("postMessage", "reply channel closed"))
            }
            Err(_) => {
                self.cancel(token);
                Err(DevIdError::Timeout {
                    what: "bridge reply".to_string(),
                    millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        }
    }

    /// Whether `token` is still waiting for a reply
    pub fn is_pending(&self, token: Uuid) -> bool {
        self.slots().contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Uuid, oneshot::Sender<String>>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
