use std::sync::Arc;

use futures::StreamExt;

use chat_dispatch::builtin::register_builtin_commands;
use chat_dispatch::channels::{Channel, CliChannel};
use chat_dispatch::command::CommandKey;
use chat_dispatch::config::DispatchConfig;
use chat_dispatch::message::{
    Author, ChannelId, ChatMessage, GuildId, Member, MessageCache, MessageHandle, MessageId,
    StaticDirectory,
};
use chat_dispatch::registry::CommandRegistry;
use chat_dispatch::remote::RemoteDispatch;
use chat_dispatch::router::{ChatClient, CommandRouter};

const LOCAL_GUILD: GuildId = GuildId(1);
const LOCAL_CHANNEL: ChannelId = ChannelId(1);
const CACHE_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DispatchConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = serve(config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Run the CLI channel until stdin closes or `/quit`.
async fn serve(config: DispatchConfig) -> chat_dispatch::error::Result<()> {
    let registry = Arc::new(CommandRegistry::new());
    register_builtin_commands(&registry, &config)?;

    // The local user owns the bot and administers the local guild.
    let directory = Arc::new(
        StaticDirectory::new().with_member(LOCAL_GUILD, config.owner_id, Member::admin()),
    );
    let cache = Arc::new(MessageCache::new(CACHE_CAPACITY));

    let channel = Arc::new(CliChannel::new(
        Author::new(config.owner_id, "local-user"),
        LOCAL_CHANNEL,
        Some(LOCAL_GUILD),
    ));
    let client: Arc<dyn ChatClient> = channel.clone();

    let router = CommandRouter::new(&config, Arc::clone(&registry), directory.clone());
    let remote = RemoteDispatch::new(&config, Arc::clone(&registry), cache.clone(), directory)
        .with_client(Arc::clone(&client));

    eprintln!("💬 Chat Dispatch v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Prefix: {}", router.prefix());
    eprintln!("   Commands: {} registered", registry.count().await);
    eprintln!("   Try {}help. /rerun <command> <message id> replays a message. /quit to exit.\n", router.prefix());

    let mut stream = channel.start().await?;
    while let Some(msg) = stream.next().await {
        let content = msg.content.trim();
        if content == "/quit" {
            break;
        }
        if let Some(args) = content.strip_prefix("/rerun") {
            rerun(&remote, &msg, args).await;
            continue;
        }

        cache.insert(msg.clone()).await;
        if let Some(report) = router.handle(&msg, &client).await {
            match serde_json::to_string(&report) {
                Ok(json) => tracing::debug!(command = %report.command, report = %json, "Invocation finished"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize invocation report"),
            }
        }
    }

    channel.shutdown().await?;
    Ok(())
}

/// Replay an earlier message through the remote entry point.
async fn rerun(remote: &RemoteDispatch, msg: &ChatMessage, args: &str) {
    let mut parts = args.split_whitespace();
    let (Some(command), Some(Ok(id))) = (parts.next(), parts.next().map(str::parse::<u64>))
    else {
        eprintln!("Usage: /rerun <command> <message id>");
        return;
    };
    let handle = MessageHandle {
        message_id: MessageId(id),
        ..msg.handle()
    };
    let success = remote.execute(&CommandKey(command.to_string()), &handle).await;
    eprintln!("   rerun {} on message {}: {}", command, id, if success { "ok" } else { "failed" });
}
