//! Channel abstraction for message I/O.

pub mod cli;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;
use crate::message::ChatMessage;
use crate::router::ChatClient;

pub use cli::CliChannel;

/// Stream of inbound messages produced by a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = ChatMessage> + Send>>;

/// A chat platform connection: inbound messages plus reply delivery.
#[async_trait]
pub trait Channel: ChatClient {
    /// Channel name (e.g. "cli").
    fn name(&self) -> &str;

    /// Start receiving messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Stop the channel.
    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
