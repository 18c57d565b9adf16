//! Argument separation: turning a message into raw per-parameter values.
//!
//! The [`ArgumentSeparator`] partitions a configuration's parameters by
//! [`Location`] and hands each partition to that location's separator. A
//! location with no declared parameters is skipped entirely, so a
//! configuration never fails on a region it does not read.

pub mod attachment;
pub mod content;
pub mod other;

use std::collections::HashMap;

use tracing::warn;

use crate::error::SeparatorError;
use crate::message::ChatMessage;
use crate::parameter::{Location, ParameterDeclaration};

pub use attachment::AttachmentSeparator;
pub use content::ContentSeparator;
pub use other::{ContextExtractor, MessageField, MessageFields, OtherSeparator};

/// Raw values keyed by parameter name.
pub type RawArguments = HashMap<String, String>;

/// Orchestrates the three location separators for one configuration.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSeparator {
    content: ContentSeparator,
    attachment: AttachmentSeparator,
    other: OtherSeparator,
}

impl ArgumentSeparator {
    pub fn new(
        content: ContentSeparator,
        attachment: AttachmentSeparator,
        other: OtherSeparator,
    ) -> Self {
        Self {
            content,
            attachment,
            other,
        }
    }

    pub fn with_content(mut self, content: ContentSeparator) -> Self {
        self.content = content;
        self
    }

    pub fn with_attachment(mut self, attachment: AttachmentSeparator) -> Self {
        self.attachment = attachment;
        self
    }

    pub fn with_other(mut self, other: OtherSeparator) -> Self {
        self.other = other;
        self
    }

    /// Split `message` into raw values for `parameters`.
    ///
    /// Fails if any location separator fails or if some declared parameter
    /// ends up without a value.
    pub fn split(
        &self,
        message: &ChatMessage,
        parameters: &[ParameterDeclaration],
    ) -> Result<RawArguments, SeparatorError> {
        let partition = |location: Location| -> Vec<&ParameterDeclaration> {
            parameters
                .iter()
                .filter(|p| p.location == location)
                .collect()
        };
        let content = partition(Location::Content);
        let attachments = partition(Location::Attachment);
        let other = partition(Location::Other);

        let mut merged = RawArguments::with_capacity(parameters.len());
        let parts = [
            (!content.is_empty())
                .then(|| self.content.separate(message, &content))
                .transpose()?,
            (!attachments.is_empty())
                .then(|| self.attachment.separate(message, &attachments))
                .transpose()?,
            (!other.is_empty())
                .then(|| self.other.separate(message, &other))
                .transpose()?,
        ];
        for part in parts.into_iter().flatten() {
            merge(&mut merged, part);
        }

        let unaccounted: Vec<String> = parameters
            .iter()
            .filter(|p| !merged.contains_key(&p.name))
            .map(|p| p.name.clone())
            .collect();
        if !unaccounted.is_empty() {
            return Err(SeparatorError::Unaccounted(unaccounted));
        }

        Ok(merged)
    }
}

/// Last write wins; collisions are not fatal.
fn merge(into: &mut RawArguments, part: RawArguments) {
    for (name, value) in part {
        if let Some(previous) = into.insert(name.clone(), value) {
            warn!(
                parameter = %name,
                previous = %previous,
                "Parameter supplied by more than one location, keeping the last value"
            );
        }
    }
}
