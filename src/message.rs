//! Inbound chat message model and the context lookups requirements read.
//!
//! The chat-platform gateway converts its native events into [`ChatMessage`]
//! values. Membership and role data stay behind the [`Directory`] capability
//! so requirement checks always observe the platform's current state.

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// Platform user identifier.
    UserId
);
snowflake!(
    /// Platform channel identifier.
    ChannelId
);
snowflake!(
    /// Guild (server) identifier.
    GuildId
);
snowflake!(
    /// Guild role identifier.
    RoleId
);
snowflake!(
    /// Platform message identifier.
    MessageId
);

/// Kind of channel a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Text channel inside a guild.
    GuildText,
    /// One-to-one direct message.
    Direct,
    /// Group direct message.
    Group,
    /// Announcement channel inside a guild.
    Announcement,
    /// Thread inside a guild channel.
    Thread,
}

impl ChannelKind {
    /// Direct and group messages live outside any guild.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Direct | Self::Group)
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GuildText => "guild_text",
            Self::Direct => "direct",
            Self::Group => "group",
            Self::Announcement => "announcement",
            Self::Thread => "thread",
        };
        write!(f, "{s}")
    }
}

/// Message author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub bot: bool,
}

impl Author {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bot: false,
        }
    }
}

/// File attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub size: u64,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
            size: 0,
        }
    }
}

/// Unified inbound chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    /// Raw text body, trigger included.
    pub content: String,
    pub author: Author,
    pub channel_id: ChannelId,
    pub channel_kind: ChannelKind,
    /// Absent for direct and group messages.
    pub guild_id: Option<GuildId>,
    pub attachments: Vec<Attachment>,
    pub received_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a direct message. Use [`ChatMessage::in_guild`] to move it into a guild channel.
    pub fn new(
        id: MessageId,
        author: Author,
        channel_id: ChannelId,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            author,
            channel_id,
            channel_kind: ChannelKind::Direct,
            guild_id: None,
            attachments: Vec::new(),
            received_at: Utc::now(),
        }
    }

    /// Place the message in a guild text channel.
    pub fn in_guild(mut self, guild_id: GuildId) -> Self {
        self.guild_id = Some(guild_id);
        if self.channel_kind.is_private() {
            self.channel_kind = ChannelKind::GuildText;
        }
        self
    }

    pub fn with_kind(mut self, kind: ChannelKind) -> Self {
        self.channel_kind = kind;
        if kind.is_private() {
            self.guild_id = None;
        }
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn is_private(&self) -> bool {
        self.channel_kind.is_private()
    }

    /// Lightweight handle used to re-resolve this message across a process boundary.
    pub fn handle(&self) -> MessageHandle {
        MessageHandle {
            message_id: self.id,
            channel_id: self.channel_id,
            is_private: self.is_private(),
        }
    }
}

/// Serializable reference to a message: `(message id, channel id, is private)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub is_private: bool,
}

/// Reply requested by a command body, delivered after dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingReply {
    pub channel_id: ChannelId,
    pub content: String,
    pub reply_to: Option<MessageId>,
}

/// Guild membership as seen by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub roles: BTreeSet<RoleId>,
    /// Holds the guild's administrator permission.
    pub administrator: bool,
}

impl Member {
    pub fn with_roles(roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
            administrator: false,
        }
    }

    pub fn admin() -> Self {
        Self {
            roles: BTreeSet::new(),
            administrator: true,
        }
    }
}

/// Read-only view of guild membership, owned by the chat client.
pub trait Directory: Send + Sync {
    /// Membership of `user` in `guild`, or `None` when the user is not a member
    /// or the lookup is unavailable.
    fn member(&self, guild: GuildId, user: UserId) -> Option<Member>;
}

/// In-memory directory for tests and local channels.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    members: HashMap<(GuildId, UserId), Member>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, guild: GuildId, user: UserId, member: Member) -> Self {
        self.members.insert((guild, user), member);
        self
    }
}

impl Directory for StaticDirectory {
    fn member(&self, guild: GuildId, user: UserId) -> Option<Member> {
        self.members.get(&(guild, user)).cloned()
    }
}

/// Resolves a [`MessageHandle`] back into the full message.
#[async_trait]
pub trait MessageResolver: Send + Sync {
    async fn resolve(&self, handle: &MessageHandle) -> Option<ChatMessage>;
}

/// Bounded in-memory cache of recently seen messages.
pub struct MessageCache {
    capacity: usize,
    inner: RwLock<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    messages: HashMap<MessageId, ChatMessage>,
    order: VecDeque<MessageId>,
}

impl MessageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(CacheInner::default()),
        }
    }

    /// Remember a message, evicting the oldest one once the cache is full.
    pub async fn insert(&self, message: ChatMessage) {
        let mut inner = self.inner.write().await;
        let id = message.id;
        if inner.messages.insert(id, message).is_none() {
            inner.order.push_back(id);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.messages.remove(&oldest);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageResolver for MessageCache {
    async fn resolve(&self, handle: &MessageHandle) -> Option<ChatMessage> {
        let inner = self.inner.read().await;
        inner
            .messages
            .get(&handle.message_id)
            .filter(|m| m.channel_id == handle.channel_id && m.is_private() == handle.is_private)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: u64) -> ChatMessage {
        ChatMessage::new(
            MessageId(id),
            Author::new(UserId(7), "alice"),
            ChannelId(100),
            "!ping",
        )
    }

    #[test]
    fn guild_placement_tracks_channel_kind() {
        let msg = message(1).in_guild(GuildId(5));
        assert_eq!(msg.channel_kind, ChannelKind::GuildText);
        assert!(!msg.is_private());

        let dm = msg.with_kind(ChannelKind::Direct);
        assert!(dm.is_private());
        assert_eq!(dm.guild_id, None);
    }

    #[test]
    fn handle_serializes_as_triple() {
        let handle = message(9).handle();
        let json = serde_json::to_value(handle).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message_id": 9, "channel_id": 100, "is_private": true})
        );
    }

    #[test]
    fn static_directory_lookup() {
        let dir = StaticDirectory::new().with_member(GuildId(1), UserId(2), Member::admin());
        assert!(dir.member(GuildId(1), UserId(2)).unwrap().administrator);
        assert!(dir.member(GuildId(1), UserId(3)).is_none());
    }

    #[tokio::test]
    async fn cache_resolves_matching_handle() {
        let cache = MessageCache::new(8);
        let msg = message(1);
        cache.insert(msg.clone()).await;

        assert_eq!(cache.resolve(&msg.handle()).await, Some(msg.clone()));

        let wrong_channel = MessageHandle {
            channel_id: ChannelId(999),
            ..msg.handle()
        };
        assert!(cache.resolve(&wrong_channel).await.is_none());
    }

    #[tokio::test]
    async fn cache_evicts_oldest() {
        let cache = MessageCache::new(2);
        for id in 1..=3 {
            cache.insert(message(id)).await;
        }
        assert_eq!(cache.len().await, 2);
        assert!(cache.resolve(&message(1).handle()).await.is_none());
        assert!(cache.resolve(&message(3).handle()).await.is_some());
    }
}
