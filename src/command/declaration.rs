//! Command declarations.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterConfiguration;
use crate::requirement::Requirement;
use crate::signature::CommandSignature;

/// Identity, policy and grammar of one invocable command.
///
/// Two declarations are equal when their names are equal; the name is the
/// dispatch key.
#[derive(Debug, Clone)]
pub struct CommandDeclaration {
    name: String,
    description: String,
    requirement: Requirement,
    signature: CommandSignature,
}

impl CommandDeclaration {
    /// Declaration open to everyone and accepting only the bare trigger.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            requirement: Requirement::Always,
            signature: CommandSignature::no_arguments(),
        }
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn with_signature(mut self, signature: CommandSignature) -> Self {
        self.signature = signature;
        self
    }

    /// Replace the signature with these configurations, highest priority first.
    pub fn with_configurations(
        self,
        configurations: impl IntoIterator<Item = ParameterConfiguration>,
    ) -> Self {
        self.with_signature(CommandSignature::new(configurations.into_iter().collect()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    pub fn signature(&self) -> &CommandSignature {
        &self.signature
    }

    pub fn key(&self) -> CommandKey {
        CommandKey(self.name.clone())
    }
}

impl PartialEq for CommandDeclaration {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for CommandDeclaration {}

impl Hash for CommandDeclaration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Borrow<str> for CommandDeclaration {
    fn borrow(&self) -> &str {
        &self.name
    }
}

/// Serializable dispatch key naming a declaration across process boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandKey(pub String);

impl CommandKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&CommandDeclaration> for CommandKey {
    fn from(declaration: &CommandDeclaration) -> Self {
        declaration.key()
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
