//! Built-in commands.

pub mod admin;
pub mod general;

use std::sync::Arc;

use crate::command::{CommandDeclaration, Invocation};
use crate::config::DispatchConfig;
use crate::error::RegistryError;
use crate::registry::CommandRegistry;

pub use admin::FlagCommand;
pub use general::{AddCommand, GreetCommand, InspectCommand, RollCommand, WhoAmICommand};

/// Register every built-in command.
pub fn register_builtin_commands(
    registry: &CommandRegistry,
    config: &DispatchConfig,
) -> Result<(), RegistryError> {
    registry.register_sync(Arc::new(GreetCommand::new()))?;
    registry.register_sync(Arc::new(AddCommand::new()))?;
    registry.register_sync(Arc::new(RollCommand::new()))?;
    registry.register_sync(Arc::new(InspectCommand::new()))?;
    registry.register_sync(Arc::new(WhoAmICommand::new()))?;
    registry.register_sync(Arc::new(FlagCommand::new(config.owner_id)))?;
    Ok(())
}

/// Reply with the usage lines of `declaration`.
pub(crate) fn reply_usage(invocation: &mut Invocation<'_>, declaration: &CommandDeclaration) {
    let trigger = invocation
        .message()
        .content
        .split_whitespace()
        .next()
        .unwrap_or(declaration.name())
        .to_string();
    let usage = declaration.signature().usage_lines(&trigger).join("\n    ");
    invocation.reply(format!("Usage:\n    {usage}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registers_all_builtins() {
        let registry = CommandRegistry::new();
        register_builtin_commands(&registry, &DispatchConfig::default()).unwrap();
        assert_eq!(
            registry.list().await,
            vec!["add", "flag", "greet", "inspect", "roll", "whoami"]
        );
        // a second registration collides
        assert!(register_builtin_commands(&registry, &DispatchConfig::default()).is_err());
    }
}
