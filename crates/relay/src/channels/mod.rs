//! Chat channel implementations.

pub mod mattermost;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::events::ChatMessage;

/// Trait for chat destinations that accept a rendered message.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Deliver one message. Implementations must not retry.
    async fn send(&self, message: &ChatMessage) -> Result<(), ChannelError>;
}
