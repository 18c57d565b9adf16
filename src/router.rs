//! Routes inbound messages to registered commands.
//!
//! The router strips the configured prefix from the first token, looks the
//! remaining trigger up in the [`CommandRegistry`], dispatches, and hands the
//! replies the command queued to the [`ChatClient`] without waiting for
//! delivery.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::{Dispatcher, Invocation, InvocationReport};
use crate::config::DispatchConfig;
use crate::error::ChannelError;
use crate::message::{ChatMessage, Directory, OutgoingReply};
use crate::registry::CommandRegistry;
use crate::requirement::Requirement;

/// Trigger answered by the router itself when no `help` command is registered.
pub const HELP_TRIGGER: &str = "help";

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send(&self, reply: OutgoingReply) -> Result<(), ChannelError>;
}

/// Prefix-based command router.
pub struct CommandRouter {
    prefix: String,
    ignore_bots: bool,
    registry: Arc<CommandRegistry>,
    directory: Arc<dyn Directory>,
    dispatcher: Dispatcher,
}

impl CommandRouter {
    pub fn new(
        config: &DispatchConfig,
        registry: Arc<CommandRegistry>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            prefix: config.prefix.clone(),
            ignore_bots: config.ignore_bots,
            registry,
            directory,
            dispatcher: Dispatcher::new(config),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Command name the message invokes, if it starts with the prefix.
    pub fn trigger<'m>(&self, message: &'m ChatMessage) -> Option<&'m str> {
        message
            .content
            .split_whitespace()
            .next()?
            .strip_prefix(self.prefix.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Dispatch `message` to the command it names.
    ///
    /// Returns `None` for messages that are not commands, come from bots, or
    /// name an unknown command.
    pub async fn route<'m>(&self, message: &'m ChatMessage) -> Option<Invocation<'m>> {
        if self.ignore_bots && message.author.bot {
            debug!(author = %message.author.id, "Ignoring message from bot");
            return None;
        }
        let trigger = self.trigger(message)?;
        let Some(handler) = self.registry.resolve(trigger).await else {
            debug!(trigger, "Unknown command");
            return None;
        };
        Some(
            self.dispatcher
                .dispatch(handler.as_ref(), message, self.directory.as_ref()),
        )
    }

    /// Route `message` and deliver any replies through `client` in the background.
    pub async fn handle(
        &self,
        message: &ChatMessage,
        client: &Arc<dyn ChatClient>,
    ) -> Option<InvocationReport> {
        if self.trigger(message) == Some(HELP_TRIGGER)
            && !self.registry.has(HELP_TRIGGER).await
            && !(self.ignore_bots && message.author.bot)
        {
            let reply = OutgoingReply {
                channel_id: message.channel_id,
                content: self.help_text(message).await,
                reply_to: Some(message.id),
            };
            deliver(client, vec![reply]);
            return None;
        }

        let mut invocation = self.route(message).await?;
        deliver(client, invocation.take_replies());
        Some(invocation.report())
    }

    /// Listing of the commands `message`'s author may run, with usage lines.
    pub async fn help_text(&self, message: &ChatMessage) -> String {
        let mut lines = vec!["Available commands:".to_string()];
        for declaration in self.registry.declarations().await {
            if !declaration
                .requirement()
                .check(message, self.directory.as_ref())
            {
                continue;
            }
            let trigger = format!("{}{}", self.prefix, declaration.name());
            let mut header = format!("{trigger} - {}", declaration.description());
            if *declaration.requirement() != Requirement::Always {
                header.push_str(&format!(" (requires {})", declaration.requirement()));
            }
            lines.push(header);
            for usage in declaration.signature().usage_lines(&trigger) {
                lines.push(format!("    {usage}"));
            }
        }
        lines.join("\n")
    }
}

/// Send replies in order on a background task; failures are logged.
pub(crate) fn deliver(client: &Arc<dyn ChatClient>, replies: Vec<OutgoingReply>) {
    if replies.is_empty() {
        return;
    }
    let client = Arc::clone(client);
    tokio::spawn(async move {
        for reply in replies {
            if let Err(e) = client.send(reply).await {
                warn!(error = %e, "Failed to deliver reply");
            }
        }
    });
}
