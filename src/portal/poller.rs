//! Background refresh of a user's inbox.
//!
//! The poller is a tokio task that asks the portal for the user's
//! conversation partners, unread count and (optionally) one open
//! conversation on a fixed interval. Each successful round is published
//! as an [`InboxSnapshot`] on a `watch` channel. A failed round is logged
//! and retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{Message, User},
    error::Result,
    portal::PortalApi,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboxSnapshot {
    pub conversations: Vec<User>,
    pub unread: i64,
    /// The open conversation, oldest message first. Empty when none is open.
    pub messages: Vec<Message>,
    /// Completed rounds so far.
    pub round: u64,
}

pub struct InboxPoller {
    portal: Arc<dyn PortalApi>,
    user_id: String,
    counterpart: Option<String>,
    interval: Duration,
}

impl InboxPoller {
    pub fn new(portal: Arc<dyn PortalApi>, user_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            portal,
            user_id: user_id.into(),
            counterpart: None,
            interval,
        }
    }

    /// Also refresh the conversation with `other_id` each round.
    pub fn with_conversation(mut self, other_id: impl Into<String>) -> Self {
        self.counterpart = Some(other_id.into());
        self
    }

    pub fn start(self) -> PollerHandle {
        let cancel = CancellationToken::new();
        let (tx, rx) = watch::channel(InboxSnapshot::default());

        let task = tokio::spawn(self.run(cancel.clone(), tx));

        PollerHandle {
            cancel,
            snapshots: rx,
            task: Some(task),
        }
    }

    async fn run(self, cancel: CancellationToken, tx: watch::Sender<InboxSnapshot>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
        let mut round = 0;

        tracing::debug!("Inbox poller started for {}", self.user_id);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    match self.poll_once().await {
                        Ok(mut snapshot) => {
                            round += 1;
                            snapshot.round = round;
                            // Nobody listening is not a reason to stop.
                            let _ = tx.send(snapshot);
                        }
                        Err(e) => {
                            tracing::warn!("Inbox poll for {} failed: {}", self.user_id, e);
                        }
                    }
                }
            }
        }

        tracing::debug!("Inbox poller stopped for {}", self.user_id);
    }

    async fn poll_once(&self) -> Result<InboxSnapshot> {
        let conversations = self.portal.get_conversations(&self.user_id).await?;
        let unread = self.portal.get_unread_count(&self.user_id).await?;
        let messages = match &self.counterpart {
            Some(other) => self.portal.get_conversation(&self.user_id, other).await?,
            None => Vec::new(),
        };

        Ok(InboxSnapshot {
            conversations,
            unread,
            messages,
            round: 0,
        })
    }
}

/// Owns a running poller. Stopping or dropping the handle ends the task.
pub struct PollerHandle {
    cancel: CancellationToken,
    snapshots: watch::Receiver<InboxSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    pub fn subscribe(&self) -> watch::Receiver<InboxSnapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> InboxSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Cancels the task and waits for it to finish its current round.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
