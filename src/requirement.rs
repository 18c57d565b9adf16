//! Permission predicates gating command execution.
//!
//! A [`Requirement`] is built once when a command is declared and evaluated
//! against every inbound message. Evaluation only reads the message and the
//! [`Directory`]; nothing is cached between calls, so a role change on the
//! platform is visible on the very next check.
//!
//! Guild-scoped predicates evaluated outside a guild (direct messages) are
//! simply false.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::message::{ChannelId, ChannelKind, ChatMessage, Directory, GuildId, RoleId, UserId};

/// Boolean gating predicate over an inbound message and its ambient context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Requirement {
    /// Always passes.
    #[default]
    Always,
    /// Message author is this user.
    User { id: UserId },
    /// Message was posted in this channel.
    Channel { id: ChannelId },
    /// Message was posted in this guild.
    Guild { id: GuildId },
    /// Author holds the administrator permission in the message's guild.
    Admin,
    /// Author holds this role in the message's guild.
    Role { id: RoleId },
    /// Author is a member of this guild, wherever the message was posted.
    MemberOf { guild: GuildId },
    /// Message was posted in a channel of this kind.
    ChannelKind { kind: ChannelKind },
    /// Every operand passes. Empty is true.
    All { of: Vec<Requirement> },
    /// At least one operand passes. Empty is false.
    Any { of: Vec<Requirement> },
}

impl Requirement {
    pub fn user(id: UserId) -> Self {
        Self::User { id }
    }

    pub fn channel(id: ChannelId) -> Self {
        Self::Channel { id }
    }

    pub fn guild(id: GuildId) -> Self {
        Self::Guild { id }
    }

    pub fn admin() -> Self {
        Self::Admin
    }

    pub fn role(id: RoleId) -> Self {
        Self::Role { id }
    }

    pub fn member_of(guild: GuildId) -> Self {
        Self::MemberOf { guild }
    }

    pub fn channel_kind(kind: ChannelKind) -> Self {
        Self::ChannelKind { kind }
    }

    /// Conjunction of all operands.
    pub fn all(of: impl IntoIterator<Item = Requirement>) -> Self {
        Self::All {
            of: of.into_iter().collect(),
        }
    }

    /// Disjunction of all operands.
    pub fn any(of: impl IntoIterator<Item = Requirement>) -> Self {
        Self::Any {
            of: of.into_iter().collect(),
        }
    }

    /// New requirement passing when both `self` and `other` pass.
    pub fn and(self, other: Requirement) -> Self {
        Self::all([self, other])
    }

    /// New requirement passing when either `self` or `other` passes.
    pub fn or(self, other: Requirement) -> Self {
        Self::any([self, other])
    }

    /// Evaluate the predicate against `message`.
    pub fn check(&self, message: &ChatMessage, directory: &dyn Directory) -> bool {
        let passed = match self {
            Self::Always => true,
            Self::User { id } => message.author.id == *id,
            Self::Channel { id } => message.channel_id == *id,
            Self::Guild { id } => message.guild_id == Some(*id),
            Self::Admin => message
                .guild_id
                .and_then(|guild| directory.member(guild, message.author.id))
                .is_some_and(|member| member.administrator),
            Self::Role { id } => message
                .guild_id
                .and_then(|guild| directory.member(guild, message.author.id))
                .is_some_and(|member| member.roles.contains(id)),
            Self::MemberOf { guild } => directory.member(*guild, message.author.id).is_some(),
            Self::ChannelKind { kind } => message.channel_kind == *kind,
            Self::All { of } => of.iter().all(|r| r.check(message, directory)),
            Self::Any { of } => of.iter().any(|r| r.check(message, directory)),
        };
        trace!(requirement = %self, passed, "Evaluated requirement");
        passed
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, of: &[Requirement], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, r) in of.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{r}")?;
            }
            write!(f, ")")
        }

        match self {
            Self::Always => write!(f, "anyone"),
            Self::User { id } => write!(f, "user {id}"),
            Self::Channel { id } => write!(f, "channel {id}"),
            Self::Guild { id } => write!(f, "guild {id}"),
            Self::Admin => write!(f, "admin"),
            Self::Role { id } => write!(f, "role {id}"),
            Self::MemberOf { guild } => write!(f, "member of {guild}"),
            Self::ChannelKind { kind } => write!(f, "{kind} channel"),
            Self::All { of } if of.is_empty() => write!(f, "anyone"),
            Self::Any { of } if of.is_empty() => write!(f, "no one"),
            Self::All { of } => join(f, of, "and"),
            Self::Any { of } => join(f, of, "or"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Author, Member, MessageId, StaticDirectory};

    const GUILD: GuildId = GuildId(10);
    const MOD_ROLE: RoleId = RoleId(500);

    fn directory() -> StaticDirectory {
        StaticDirectory::new()
            .with_member(GUILD, UserId(1), Member::admin())
            .with_member(GUILD, UserId(2), Member::with_roles([MOD_ROLE]))
            .with_member(GUILD, UserId(3), Member::default())
    }

    fn guild_message(author: u64) -> ChatMessage {
        ChatMessage::new(
            MessageId(1),
            Author::new(UserId(author), "user"),
            ChannelId(20),
            "!cmd",
        )
        .in_guild(GUILD)
    }

    fn direct_message(author: u64) -> ChatMessage {
        ChatMessage::new(
            MessageId(2),
            Author::new(UserId(author), "user"),
            ChannelId(30),
            "!cmd",
        )
    }

    #[test]
    fn leaf_predicates() {
        let dir = directory();
        let msg = guild_message(2);

        assert!(Requirement::Always.check(&msg, &dir));
        assert!(Requirement::user(UserId(2)).check(&msg, &dir));
        assert!(!Requirement::user(UserId(1)).check(&msg, &dir));
        assert!(Requirement::channel(ChannelId(20)).check(&msg, &dir));
        assert!(Requirement::guild(GUILD).check(&msg, &dir));
        assert!(Requirement::role(MOD_ROLE).check(&msg, &dir));
        assert!(!Requirement::admin().check(&msg, &dir));
        assert!(Requirement::admin().check(&guild_message(1), &dir));
        assert!(Requirement::channel_kind(ChannelKind::GuildText).check(&msg, &dir));
    }

    #[test]
    fn guild_predicates_false_in_direct_messages() {
        let dir = directory();
        let dm = direct_message(1);

        assert!(!Requirement::admin().check(&dm, &dir));
        assert!(!Requirement::role(MOD_ROLE).check(&direct_message(2), &dir));
        assert!(!Requirement::guild(GUILD).check(&dm, &dir));
        // membership is looked up by guild id, not by where the message was sent
        assert!(Requirement::member_of(GUILD).check(&dm, &dir));
        assert!(!Requirement::member_of(GUILD).check(&direct_message(99), &dir));
    }

    #[test]
    fn empty_composites() {
        let dir = directory();
        let msg = guild_message(3);
        assert!(Requirement::All { of: vec![] }.check(&msg, &dir));
        assert!(!Requirement::Any { of: vec![] }.check(&msg, &dir));
    }

    #[test]
    fn admin_or_owner() {
        let dir = directory();
        let requirement = Requirement::admin().or(Requirement::user(UserId(3)));
        assert!(requirement.check(&guild_message(1), &dir));
        assert!(requirement.check(&guild_message(3), &dir));
        assert!(!requirement.check(&guild_message(2), &dir));
    }

    #[test]
    fn and_or_are_associative() {
        let dir = directory();
        let leaves = [
            Requirement::Always,
            Requirement::admin(),
            Requirement::role(MOD_ROLE),
            Requirement::user(UserId(3)),
            Requirement::channel_kind(ChannelKind::Direct),
            Requirement::Any { of: vec![] },
        ];
        let messages = [
            guild_message(1),
            guild_message(2),
            guild_message(3),
            direct_message(3),
        ];

        for a in &leaves {
            for b in &leaves {
                for c in &leaves {
                    for msg in &messages {
                        let left_and = a.clone().and(b.clone()).and(c.clone());
                        let right_and = a.clone().and(b.clone().and(c.clone()));
                        assert_eq!(left_and.check(msg, &dir), right_and.check(msg, &dir));

                        let left_or = a.clone().or(b.clone()).or(c.clone());
                        let right_or = a.clone().or(b.clone().or(c.clone()));
                        assert_eq!(left_or.check(msg, &dir), right_or.check(msg, &dir));
                    }
                }
            }
        }
    }

    #[test]
    fn check_is_idempotent() {
        let dir = directory();
        let msg = guild_message(2);
        let requirement = Requirement::role(MOD_ROLE).and(Requirement::guild(GUILD));
        let first = requirement.check(&msg, &dir);
        for _ in 0..3 {
            assert_eq!(requirement.check(&msg, &dir), first);
        }
    }

    #[test]
    fn check_reads_directory_on_every_call() {
        let msg = guild_message(3);
        let requirement = Requirement::role(MOD_ROLE);
        assert!(!requirement.check(&msg, &directory()));

        let promoted = directory().with_member(GUILD, UserId(3), Member::with_roles([MOD_ROLE]));
        assert!(requirement.check(&msg, &promoted));
        assert!(!requirement.check(&msg, &directory()));
    }

    #[test]
    fn display_and_serde() {
        let requirement = Requirement::admin().or(Requirement::user(UserId(3)));
        assert_eq!(requirement.to_string(), "(admin or user 3)");

        let json = serde_json::to_value(&requirement).unwrap();
        assert_eq!(json["op"], "any");
        assert_eq!(json["of"][0]["op"], "admin");
        let back: Requirement = serde_json::from_value(json).unwrap();
        assert_eq!(back, requirement);
    }
}
