use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use namegame_core::{Field, View};

use crate::{ChannelId, MessageId};

/// Something shown in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayOutput {
    Render {
        channel: ChannelId,
        message: MessageId,
        view: View,
    },
    UpdateField {
        channel: ChannelId,
        message: MessageId,
        index: usize,
        field: Field,
    },
    Say {
        channel: ChannelId,
        text: String,
    },
}

impl DisplayOutput {
    pub fn channel(&self) -> ChannelId {
        match self {
            Self::Render { channel, .. }
            | Self::UpdateField { channel, .. }
            | Self::Say { channel, .. } => *channel,
        }
    }
}

/// Where game displays go.
#[async_trait]
pub trait DisplaySink: Send + Sync {
    /// Show a new card. Returns its message id for later field updates.
    async fn render(&self, channel: ChannelId, view: View) -> MessageId;

    /// Replace one field of a previously rendered card.
    async fn update_field(&self, channel: ChannelId, message: MessageId, index: usize, field: Field);

    async fn say(&self, channel: ChannelId, text: String);
}

/// Fans every output out to broadcast subscribers.
pub struct BroadcastDisplay {
    tx: broadcast::Sender<DisplayOutput>,
    next_message: AtomicU64,
}

impl BroadcastDisplay {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            next_message: AtomicU64::new(1),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayOutput> {
        self.tx.subscribe()
    }

    fn publish(&self, output: DisplayOutput) {
        // No subscribers is fine; nobody is watching the channel.
        let _ = self.tx.send(output);
    }
}

#[async_trait]
impl DisplaySink for BroadcastDisplay {
    async fn render(&self, channel: ChannelId, view: View) -> MessageId {
        let message = self.next_message.fetch_add(1, Ordering::Relaxed);
        self.publish(DisplayOutput::Render {
            channel,
            message,
            view,
        });
        message
    }

    async fn update_field(&self, channel: ChannelId, message: MessageId, index: usize, field: Field) {
        self.publish(DisplayOutput::UpdateField {
            channel,
            message,
            index,
            field,
        });
    }

    async fn say(&self, channel: ChannelId, text: String) {
        self.publish(DisplayOutput::Say { channel, text });
    }
}
