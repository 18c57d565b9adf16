//! Dispatch entry point for callers in another process.
//!
//! Remote callers never ship a full message. They send a [`CommandKey`] and
//! a [`MessageHandle`]; the message is re-resolved locally and dispatched
//! like any other. The transport carrying these calls is not part of this
//! crate.

use std::sync::Arc;

use tracing::{info, warn};

use crate::command::{CommandKey, Dispatcher};
use crate::config::DispatchConfig;
use crate::message::{Directory, MessageHandle, MessageResolver};
use crate::registry::CommandRegistry;
use crate::router::{ChatClient, deliver};

/// Executes registered commands by key and message handle.
pub struct RemoteDispatch {
    registry: Arc<CommandRegistry>,
    resolver: Arc<dyn MessageResolver>,
    directory: Arc<dyn Directory>,
    dispatcher: Dispatcher,
    client: Option<Arc<dyn ChatClient>>,
}

impl RemoteDispatch {
    pub fn new(
        config: &DispatchConfig,
        registry: Arc<CommandRegistry>,
        resolver: Arc<dyn MessageResolver>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            registry,
            resolver,
            directory,
            dispatcher: Dispatcher::new(config),
            client: None,
        }
    }

    /// Deliver replies queued by remotely executed commands through `client`.
    pub fn with_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Run the command named by `key` against the message `handle` refers to.
    ///
    /// Returns whether the invocation succeeded. Unknown commands and
    /// unresolvable handles return `false`.
    pub async fn execute(&self, key: &CommandKey, handle: &MessageHandle) -> bool {
        let Some(handler) = self.registry.resolve(key.as_str()).await else {
            warn!(command = %key, "Remote execute for unknown command");
            return false;
        };
        let Some(message) = self.resolver.resolve(handle).await else {
            warn!(
                command = %key,
                message_id = %handle.message_id,
                channel = %handle.channel_id,
                "Remote execute for unresolvable message"
            );
            return false;
        };

        let mut invocation =
            self.dispatcher
                .dispatch(handler.as_ref(), &message, self.directory.as_ref());
        let success = invocation.succeeded();
        info!(
            invocation = %invocation.id(),
            command = %key,
            success,
            "Remote command executed"
        );

        if let Some(client) = &self.client {
            deliver(client, invocation.take_replies());
        }
        success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandDeclaration, CommandHandler, Invocation};
    use crate::message::{Author, ChannelId, ChatMessage, MessageCache, MessageId, StaticDirectory, UserId};
    use crate::requirement::Requirement;

    struct Ping {
        declaration: CommandDeclaration,
    }

    impl CommandHandler for Ping {
        fn declaration(&self) -> &CommandDeclaration {
            &self.declaration
        }

        fn execute(&self, invocation: &mut Invocation<'_>) -> anyhow::Result<()> {
            invocation.reply("pong");
            Ok(())
        }
    }

    async fn setup() -> (RemoteDispatch, Arc<MessageCache>, ChatMessage) {
        let registry = Arc::new(CommandRegistry::new());
        registry
            .register(Arc::new(Ping {
                declaration: CommandDeclaration::new("ping", "pong"),
            }))
            .await
            .unwrap();
        registry
            .register(Arc::new(Ping {
                declaration: CommandDeclaration::new("owner", "owner only")
                    .with_requirement(Requirement::user(UserId(1))),
            }))
            .await
            .unwrap();

        let cache = Arc::new(MessageCache::new(16));
        let message = ChatMessage::new(
            MessageId(5),
            Author::new(UserId(2), "dave"),
            ChannelId(6),
            "!ping",
        );
        cache.insert(message.clone()).await;

        let remote = RemoteDispatch::new(
            &DispatchConfig::default(),
            registry,
            cache.clone(),
            Arc::new(StaticDirectory::new()),
        );
        (remote, cache, message)
    }

    #[tokio::test]
    async fn executes_by_key_and_handle() {
        let (remote, _cache, message) = setup().await;
        let key = CommandKey("ping".into());
        assert!(remote.execute(&key, &message.handle()).await);
    }

    #[tokio::test]
    async fn rejected_permission_is_false() {
        let (remote, _cache, message) = setup().await;
        assert!(!remote.execute(&CommandKey("owner".into()), &message.handle()).await);
    }

    #[tokio::test]
    async fn unknown_command_or_message_is_false() {
        let (remote, _cache, message) = setup().await;
        assert!(!remote.execute(&CommandKey("nope".into()), &message.handle()).await);

        let stale = MessageHandle {
            message_id: MessageId(999),
            ..message.handle()
        };
        assert!(!remote.execute(&CommandKey("ping".into()), &stale).await);
    }

    #[tokio::test]
    async fn handle_survives_serialization() {
        let (remote, _cache, message) = setup().await;
        let wire = serde_json::to_string(&(CommandKey("ping".into()), message.handle())).unwrap();
        let (key, handle): (CommandKey, MessageHandle) = serde_json::from_str(&wire).unwrap();
        assert!(remote.execute(&key, &handle).await);
    }
}
