//! Name-keyed registry of command handlers.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::command::{CommandDeclaration, CommandHandler};
use crate::error::RegistryError;

/// Registry of available commands, keyed by declaration name.
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            commands: RwLock::new(HashMap::new()),
        }
    }

    /// Register a command. Rejects a name that is already taken.
    pub async fn register(&self, handler: Arc<dyn CommandHandler>) -> Result<(), RegistryError> {
        let name = handler.declaration().name().to_string();
        let mut commands = self.commands.write().await;
        if commands.contains_key(&name) {
            tracing::warn!(command = %name, "Rejected command registration: name already taken");
            return Err(RegistryError::AlreadyRegistered { name });
        }
        commands.insert(name.clone(), handler);
        tracing::debug!("Registered command: {}", name);
        Ok(())
    }

    /// Register a command (sync version for startup).
    pub fn register_sync(&self, handler: Arc<dyn CommandHandler>) -> Result<(), RegistryError> {
        let name = handler.declaration().name().to_string();
        let Ok(mut commands) = self.commands.try_write() else {
            return Err(RegistryError::Busy { name });
        };
        if commands.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered { name });
        }
        commands.insert(name.clone(), handler);
        tracing::debug!("Registered command: {}", name);
        Ok(())
    }

    /// Unregister a command.
    pub async fn unregister(&self, name: &str) -> Result<Arc<dyn CommandHandler>, RegistryError> {
        self.commands
            .write()
            .await
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }

    /// Get a command by name.
    pub async fn resolve(&self, name: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.read().await.get(name).cloned()
    }

    /// Check if a command exists.
    pub async fn has(&self, name: &str) -> bool {
        self.commands.read().await.contains_key(name)
    }

    /// List all command names, sorted.
    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered commands.
    pub async fn count(&self) -> usize {
        self.commands.read().await.len()
    }

    /// Declarations of every registered command, sorted by name.
    pub async fn declarations(&self) -> Vec<CommandDeclaration> {
        let mut declarations: Vec<CommandDeclaration> = self
            .commands
            .read()
            .await
            .values()
            .map(|handler| handler.declaration().clone())
            .collect();
        declarations.sort_by(|a, b| a.name().cmp(b.name()));
        declarations
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
