//! Separator for context that is neither text nor attachment.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{SeparatorError, panic_message};
use crate::message::ChatMessage;
use crate::parameter::ParameterDeclaration;
use crate::separator::RawArguments;

/// Pulls raw values for `Other` parameters out of a message.
pub trait ContextExtractor: Send + Sync + fmt::Debug {
    fn extract(
        &self,
        message: &ChatMessage,
        parameters: &[&ParameterDeclaration],
    ) -> Result<RawArguments, SeparatorError>;
}

/// Separator for the `Other` location. Contributes nothing unless an
/// extractor is installed.
#[derive(Debug, Clone, Default)]
pub enum OtherSeparator {
    #[default]
    NoOp,
    Extractor(Arc<dyn ContextExtractor>),
}

impl OtherSeparator {
    pub fn extractor(extractor: impl ContextExtractor + 'static) -> Self {
        Self::Extractor(Arc::new(extractor))
    }

    /// Bind parameters to message metadata fields by position.
    pub fn fields(fields: impl IntoIterator<Item = MessageField>) -> Self {
        Self::extractor(MessageFields::new(fields))
    }

    pub fn separate(
        &self,
        message: &ChatMessage,
        parameters: &[&ParameterDeclaration],
    ) -> Result<RawArguments, SeparatorError> {
        match self {
            Self::NoOp => Ok(RawArguments::new()),
            Self::Extractor(extractor) => {
                catch_unwind(AssertUnwindSafe(|| extractor.extract(message, parameters)))
                    .unwrap_or_else(|payload| {
                        Err(SeparatorError::Extractor(format!(
                            "extractor panicked: {}",
                            panic_message(&*payload)
                        )))
                    })
            }
        }
    }
}

/// Message metadata exposed to `Other` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageField {
    AuthorId,
    AuthorName,
    ChannelId,
    /// Absent in direct messages.
    GuildId,
    MessageId,
}

impl MessageField {
    fn read(&self, message: &ChatMessage) -> Option<String> {
        match self {
            Self::AuthorId => Some(message.author.id.to_string()),
            Self::AuthorName => Some(message.author.name.clone()),
            Self::ChannelId => Some(message.channel_id.to_string()),
            Self::GuildId => message.guild_id.map(|g| g.to_string()),
            Self::MessageId => Some(message.id.to_string()),
        }
    }
}

/// Positional mapping of `Other` parameters onto [`MessageField`]s.
///
/// A field the message does not carry leaves its parameter without a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFields {
    fields: Vec<MessageField>,
}

impl MessageFields {
    pub fn new(fields: impl IntoIterator<Item = MessageField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }
}

impl ContextExtractor for MessageFields {
    fn extract(
        &self,
        message: &ChatMessage,
        parameters: &[&ParameterDeclaration],
    ) -> Result<RawArguments, SeparatorError> {
        if parameters.len() != self.fields.len() {
            return Err(SeparatorError::Extractor(format!(
                "{} fields configured for {} parameters",
                self.fields.len(),
                parameters.len()
            )));
        }

        Ok(parameters
            .iter()
            .zip(&self.fields)
            .filter_map(|(p, field)| field.read(message).map(|value| (p.name.clone(), value)))
            .collect())
    }
}
