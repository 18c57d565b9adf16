//! Text-body separator.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ConfigError, SeparatorError};
use crate::message::ChatMessage;
use crate::parameter::ParameterDeclaration;
use crate::separator::RawArguments;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Splits the text body into one token per content parameter.
///
/// The first whitespace-delimited token is the trigger and is discarded; the
/// remainder is split by the delimiter. The token count, trigger included,
/// must equal the number of content parameters plus one.
#[derive(Debug, Clone)]
pub enum ContentSeparator {
    /// Contributes nothing.
    NoOp,
    /// Splits the arguments on every match of `delimiter`.
    Delimited { delimiter: Regex },
}

impl Default for ContentSeparator {
    fn default() -> Self {
        Self::whitespace()
    }
}

impl ContentSeparator {
    /// Split on whitespace runs.
    pub fn whitespace() -> Self {
        Self::Delimited {
            delimiter: WHITESPACE_RUN.clone(),
        }
    }

    /// Split the arguments on a custom pattern, e.g. `\s*,\s*`.
    pub fn delimited(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self::Delimited {
            delimiter: Regex::new(pattern)?,
        })
    }

    pub fn separate(
        &self,
        message: &ChatMessage,
        parameters: &[&ParameterDeclaration],
    ) -> Result<RawArguments, SeparatorError> {
        let delimiter = match self {
            Self::NoOp => return Ok(RawArguments::new()),
            Self::Delimited { delimiter } => delimiter,
        };

        let arguments = WHITESPACE_RUN
            .splitn(message.content.trim(), 2)
            .nth(1)
            .unwrap_or("");
        let tokens: Vec<&str> = if arguments.is_empty() {
            Vec::new()
        } else {
            delimiter.split(arguments).collect()
        };

        let expected = parameters.len() + 1;
        let found = tokens.len() + 1;
        if found != expected {
            return Err(SeparatorError::ContentTokenCount { expected, found });
        }

        Ok(parameters
            .iter()
            .zip(tokens)
            .map(|(p, token)| (p.name.clone(), token.to_string()))
            .collect())
    }
}
