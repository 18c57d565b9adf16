//! CLI channel: stdin/stdout REPL for local testing.
//!
//! Every line becomes a message from the configured author. Attachments can
//! be simulated by appending `| <url> [<url>...]` to the line.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::channels::{Channel, MessageStream};
use crate::error::ChannelError;
use crate::message::{
    Attachment, Author, ChannelId, ChannelKind, ChatMessage, GuildId, MessageId, OutgoingReply,
};
use crate::router::ChatClient;

/// A simple CLI channel that reads from stdin and writes to stdout.
pub struct CliChannel {
    author: Author,
    channel_id: ChannelId,
    guild_id: Option<GuildId>,
    next_id: Arc<AtomicU64>,
    started: AtomicBool,
}

impl CliChannel {
    pub fn new(author: Author, channel_id: ChannelId, guild_id: Option<GuildId>) -> Self {
        Self {
            author,
            channel_id,
            guild_id,
            next_id: Arc::new(AtomicU64::new(1)),
            started: AtomicBool::new(false),
        }
    }
}

/// Build a message from one input line.
fn line_to_message(
    line: &str,
    id: MessageId,
    author: &Author,
    channel_id: ChannelId,
    guild_id: Option<GuildId>,
) -> ChatMessage {
    let (content, urls): (&str, Vec<&str>) = match line.split_once('|') {
        Some((content, urls)) => (content.trim(), urls.split_whitespace().collect()),
        None => (line.trim(), Vec::new()),
    };

    let mut msg = ChatMessage::new(id, author.clone(), channel_id, content);
    msg = match guild_id {
        Some(guild) => msg.in_guild(guild),
        None => msg.with_kind(ChannelKind::Direct),
    };
    for url in urls {
        let filename = url.rsplit('/').next().unwrap_or(url);
        msg = msg.with_attachment(Attachment::new(filename, url));
    }
    msg
}

#[async_trait]
impl ChatClient for CliChannel {
    async fn send(&self, reply: OutgoingReply) -> Result<(), ChannelError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "\n{}\n", reply.content)?;
        stdout.flush()?;
        eprint!("> ");
        Ok(())
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        // stdin can only be drained by one reader
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ChannelError::StartupFailed {
                name: self.name().to_string(),
                reason: "already started".into(),
            });
        }
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let author = self.author.clone();
        let channel_id = self.channel_id;
        let guild_id = self.guild_id;
        let next_id = Arc::clone(&self.next_id);

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            // Print prompt
            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        let id = MessageId(next_id.fetch_add(1, Ordering::Relaxed));
                        let msg = line_to_message(&line, id, &author, channel_id, guild_id);
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::UserId;

    fn author() -> Author {
        Author::new(UserId(1), "local-user")
    }

    #[test]
    fn plain_line_in_guild() {
        let msg = line_to_message("  !greet Bob ", MessageId(3), &author(), ChannelId(1), Some(GuildId(2)));
        assert_eq!(msg.content, "!greet Bob");
        assert_eq!(msg.guild_id, Some(GuildId(2)));
        assert_eq!(msg.channel_kind, ChannelKind::GuildText);
        assert!(msg.attachments.is_empty());
    }

    #[test]
    fn attachments_after_pipe() {
        let msg = line_to_message(
            "!inspect | https://cdn.example/a.png https://cdn.example/b.txt",
            MessageId(4),
            &author(),
            ChannelId(1),
            None,
        );
        assert_eq!(msg.content, "!inspect");
        assert!(msg.is_private());
        assert_eq!(msg.attachments.len(), 2);
        assert_eq!(msg.attachments[0].filename, "a.png");
        assert_eq!(msg.attachments[1].url, "https://cdn.example/b.txt");
    }
}
