//! Parameter declarations and parameter configurations.
//!
//! A [`ParameterConfiguration`] is one complete shape a command invocation
//! may take. It either resolves every declared parameter or fails as a whole.

pub mod parser;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DispatchError;
use crate::message::ChatMessage;
use crate::separator::ArgumentSeparator;

pub use parser::{ParameterResult, ValueParser};

/// Region of a message a parameter is extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Whitespace-separated tokens of the text body.
    Content,
    /// Files attached to the message.
    Attachment,
    /// Anything else the message carries (author, channel, guild...).
    Other,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Content => "content",
            Self::Attachment => "attachment",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// One declared parameter of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    pub name: String,
    pub description: String,
    pub location: Location,
    pub parser: ValueParser,
}

impl ParameterDeclaration {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        location: Location,
        parser: ValueParser,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            location,
            parser,
        }
    }

    /// Parameter read from the text body.
    pub fn content(
        name: impl Into<String>,
        description: impl Into<String>,
        parser: ValueParser,
    ) -> Self {
        Self::new(name, description, Location::Content, parser)
    }

    /// Parameter bound to an attachment; the raw value is its URL.
    pub fn attachment(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, Location::Attachment, ValueParser::String)
    }

    /// Parameter supplied by the configuration's context extractor.
    pub fn other(
        name: impl Into<String>,
        description: impl Into<String>,
        parser: ValueParser,
    ) -> Self {
        Self::new(name, description, Location::Other, parser)
    }

    /// Run this parameter's value parser over `raw`.
    pub fn parse(&self, raw: &str) -> ParameterResult {
        self.parser.parse(&self.name, raw)
    }
}

/// One acceptable invocation shape: ordered parameters plus the separator
/// that extracts them.
#[derive(Debug, Clone, Default)]
pub struct ParameterConfiguration {
    description: String,
    parameters: Vec<ParameterDeclaration>,
    separator: ArgumentSeparator,
}

impl ParameterConfiguration {
    /// Configuration using the default separator.
    pub fn new(description: impl Into<String>, parameters: Vec<ParameterDeclaration>) -> Self {
        Self {
            description: description.into(),
            parameters,
            separator: ArgumentSeparator::default(),
        }
    }

    /// Configuration accepting a bare trigger.
    pub fn empty(description: impl Into<String>) -> Self {
        Self::new(description, Vec::new())
    }

    pub fn with_separator(mut self, separator: ArgumentSeparator) -> Self {
        self.separator = separator;
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &[ParameterDeclaration] {
        &self.parameters
    }

    pub fn separator(&self) -> &ArgumentSeparator {
        &self.separator
    }

    /// Resolve every declared parameter from `message`, in declaration order.
    ///
    /// All parameters are evaluated even after the first failure so the
    /// error names every one that could not be derived.
    pub fn parse(&self, message: &ChatMessage) -> Result<Vec<ParameterResult>, DispatchError> {
        let raw = match self.separator.split(message, &self.parameters) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(
                    configuration = %self.description,
                    error = %e,
                    "Separator rejected message"
                );
                Default::default()
            }
        };

        let mut results = Vec::with_capacity(self.parameters.len());
        let mut missing = Vec::new();
        for declaration in &self.parameters {
            let result = match raw.get(&declaration.name) {
                Some(value) => declaration.parse(value),
                None => ParameterResult::Missing(declaration.name.clone()),
            };
            if result.is_missing() {
                debug!(
                    configuration = %self.description,
                    parameter = %declaration.name,
                    location = %declaration.location,
                    "Parameter could not be derived"
                );
                missing.push(declaration.name.clone());
            }
            results.push(result);
        }

        if missing.is_empty() {
            Ok(results)
        } else {
            Err(DispatchError::FieldDerivationFailure { missing })
        }
    }

    /// Usage line, e.g. `!add <a: integer> <b: integer>`.
    pub fn usage(&self, trigger: &str) -> String {
        let mut line = trigger.to_string();
        for p in &self.parameters {
            match p.location {
                Location::Content => line.push_str(&format!(" <{}: {}>", p.name, p.parser.type_name())),
                Location::Attachment => line.push_str(&format!(" [attach {}]", p.name)),
                Location::Other => {}
            }
        }
        line
    }
}
