//! Single-slot message-of-the-day mailbox.
//!
//! Any number of connections may write the slot; the driver reads it once
//! per tick. A newer message always replaces the older one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// The message currently on display.
#[derive(Debug, Clone)]
pub struct MotdMessage {
    text: String,
    received: Instant,
    hold: Duration,
}

impl MotdMessage {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    /// A zero hold never expires.
    pub fn is_expired(&self) -> bool {
        !self.hold.is_zero() && self.received.elapsed() >= self.hold
    }
}

/// What the renderer gets on each read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotdSnapshot {
    pub text: Option<String>,
    /// True if the slot changed since the previous snapshot.
    pub changed: bool,
}

#[derive(Debug, Default)]
struct Slot {
    message: Option<MotdMessage>,
    changed: bool,
}

/// Cloneable handle to the shared slot.
#[derive(Debug, Clone, Default)]
pub struct MotdMailbox {
    slot: Arc<Mutex<Slot>>,
}

impl MotdMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current message.
    pub async fn store(&self, text: impl Into<String>, hold: Duration) {
        let text = text.into();
        debug!(len = text.len(), hold_secs = hold.as_secs(), "storing motd");

        let mut slot = self.slot.lock().await;
        slot.message = Some(MotdMessage {
            text,
            received: Instant::now(),
            hold,
        });
        slot.changed = true;
    }

    /// Returns the current text and clears the changed flag.
    ///
    /// An expired message is dropped here, which counts as a change.
    pub async fn snapshot(&self) -> MotdSnapshot {
        let mut slot = self.slot.lock().await;

        if slot.message.as_ref().is_some_and(MotdMessage::is_expired) {
            debug!("motd expired");
            slot.message = None;
            slot.changed = true;
        }

        let changed = std::mem::take(&mut slot.changed);
        MotdSnapshot {
            text: slot.message.as_ref().map(|m| m.text.clone()),
            changed,
        }
    }

    pub async fn current(&self) -> Option<MotdMessage> {
        self.slot.lock().await.message.clone()
    }

    pub async fn clear(&self) {
        let mut slot = self.slot.lock().await;
        if slot.message.take().is_some() {
            slot.changed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_mailbox() {
        let mailbox = MotdMailbox::new();
        assert_eq!(
            mailbox.snapshot().await,
            MotdSnapshot {
                text: None,
                changed: false
            }
        );
    }

    #[tokio::test]
    async fn snapshot_consumes_changed_flag() {
        let mailbox = MotdMailbox::new();
        mailbox.store("Sauna at six", Duration::ZERO).await;

        let first = mailbox.snapshot().await;
        assert_eq!(first.text.as_deref(), Some("Sauna at six"));
        assert!(first.changed);

        let second = mailbox.snapshot().await;
        assert_eq!(second.text.as_deref(), Some("Sauna at six"));
        assert!(!second.changed);
    }

    #[tokio::test]
    async fn newer_message_replaces_older() {
        let mailbox = MotdMailbox::new();
        let writer = mailbox.clone();
        writer.store("first", Duration::ZERO).await;
        writer.store("second", Duration::ZERO).await;

        assert_eq!(mailbox.snapshot().await.text.as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn message_expires_after_hold() {
        let mailbox = MotdMailbox::new();
        mailbox.store("coffee", Duration::from_secs(30)).await;
        assert!(mailbox.snapshot().await.changed);

        tokio::time::advance(Duration::from_secs(29)).await;
        let snap = mailbox.snapshot().await;
        assert_eq!(snap.text.as_deref(), Some("coffee"));
        assert!(!snap.changed);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(
            mailbox.snapshot().await,
            MotdSnapshot {
                text: None,
                changed: true
            }
        );
        assert!(mailbox.current().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_hold_never_expires() {
        let mailbox = MotdMailbox::new();
        mailbox.store("pinned", Duration::ZERO).await;

        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert_eq!(mailbox.snapshot().await.text.as_deref(), Some("pinned"));
    }

    #[tokio::test]
    async fn clear_marks_change_only_when_set() {
        let mailbox = MotdMailbox::new();
        mailbox.clear().await;
        assert!(!mailbox.snapshot().await.changed);

        mailbox.store("x", Duration::ZERO).await;
        mailbox.snapshot().await;
        mailbox.clear().await;
        assert!(mailbox.snapshot().await.changed);
    }
}
