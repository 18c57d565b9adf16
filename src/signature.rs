//! Command signatures: ordered alternatives of parameter configurations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::message::ChatMessage;
use crate::parameter::{ParameterConfiguration, ParameterResult};

/// Every configuration a command accepts, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct CommandSignature {
    configurations: Vec<ParameterConfiguration>,
}

/// Outcome of [`CommandSignature::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureMatch {
    /// Index of the configuration that matched, if any.
    pub index: Option<usize>,
    /// Parsed parameters of the matching configuration; empty when nothing matched.
    pub results: Vec<ParameterResult>,
}

impl SignatureMatch {
    pub fn no_match() -> Self {
        Self {
            index: None,
            results: Vec::new(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.index.is_some()
    }

    /// Matched index, or `-1` when nothing matched.
    pub fn sentinel_index(&self) -> i64 {
        self.index.map_or(-1, |i| i as i64)
    }
}

impl CommandSignature {
    pub fn new(configurations: Vec<ParameterConfiguration>) -> Self {
        Self { configurations }
    }

    /// Signature accepting only the bare trigger.
    pub fn no_arguments() -> Self {
        Self::new(vec![ParameterConfiguration::empty("no arguments")])
    }

    /// Append a lower-priority alternative.
    pub fn or(mut self, configuration: ParameterConfiguration) -> Self {
        self.configurations.push(configuration);
        self
    }

    pub fn configurations(&self) -> &[ParameterConfiguration] {
        &self.configurations
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Try each configuration in declared order; the first one that resolves wins.
    pub fn parse(&self, message: &ChatMessage) -> SignatureMatch {
        for (index, configuration) in self.configurations.iter().enumerate() {
            match configuration.parse(message) {
                Ok(results) => {
                    debug!(
                        index,
                        configuration = %configuration.description(),
                        "Parameter configuration matched"
                    );
                    return SignatureMatch {
                        index: Some(index),
                        results,
                    };
                }
                Err(e) => {
                    debug!(
                        index,
                        configuration = %configuration.description(),
                        error = %e,
                        "Parameter configuration did not match"
                    );
                }
            }
        }
        SignatureMatch::no_match()
    }

    /// One usage line per configuration.
    pub fn usage_lines(&self, trigger: &str) -> Vec<String> {
        self.configurations
            .iter()
            .map(|c| c.usage(trigger))
            .collect()
    }
}
