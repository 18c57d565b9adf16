//! Attachment separator.

use crate::error::SeparatorError;
use crate::message::ChatMessage;
use crate::parameter::ParameterDeclaration;
use crate::separator::RawArguments;

/// Binds attachment parameters to the message's attachments by position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttachmentSeparator {
    /// Contributes nothing.
    NoOp,
    /// The i-th parameter receives the URL of the i-th attachment. Counts must match.
    #[default]
    Positional,
}

impl AttachmentSeparator {
    pub fn separate(
        &self,
        message: &ChatMessage,
        parameters: &[&ParameterDeclaration],
    ) -> Result<RawArguments, SeparatorError> {
        if *self == Self::NoOp {
            return Ok(RawArguments::new());
        }

        if parameters.len() != message.attachments.len() {
            return Err(SeparatorError::AttachmentCount {
                expected: parameters.len(),
                found: message.attachments.len(),
            });
        }

        Ok(parameters
            .iter()
            .zip(&message.attachments)
            .map(|(p, attachment)| (p.name.clone(), attachment.url.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Attachment, Author, ChannelId, MessageId, UserId};

    fn message(files: usize) -> ChatMessage {
        (0..files).fold(
            ChatMessage::new(
                MessageId(1),
                Author::new(UserId(1), "alice"),
                ChannelId(1),
                "!upload",
            ),
            |msg, i| msg.with_attachment(Attachment::new(format!("{i}.png"), format!("https://f/{i}"))),
        )
    }

    #[test]
    fn positional_bijection() {
        let first = ParameterDeclaration::attachment("first", "");
        let second = ParameterDeclaration::attachment("second", "");
        let raw = AttachmentSeparator::Positional
            .separate(&message(2), &[&first, &second])
            .unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw["first"], "https://f/0");
        assert_eq!(raw["second"], "https://f/1");
    }

    #[test]
    fn count_mismatch_fails() {
        let only = ParameterDeclaration::attachment("only", "");
        assert_eq!(
            AttachmentSeparator::Positional
                .separate(&message(2), &[&only])
                .unwrap_err(),
            SeparatorError::AttachmentCount {
                expected: 1,
                found: 2
            }
        );
        assert!(
            AttachmentSeparator::Positional
                .separate(&message(0), &[&only])
                .is_err()
        );
    }

    #[test]
    fn no_op_ignores_attachments() {
        let only = ParameterDeclaration::attachment("only", "");
        assert!(
            AttachmentSeparator::NoOp
                .separate(&message(1), &[&only])
                .unwrap()
                .is_empty()
        );
    }
}
