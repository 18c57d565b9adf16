//! Configuration types.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::message::UserId;

/// Environment variable holding the command prefix.
pub const PREFIX_VAR: &str = "CHAT_DISPATCH_PREFIX";
/// Environment variable capping the number of trace entries kept per invocation.
pub const TRACE_CAPACITY_VAR: &str = "CHAT_DISPATCH_TRACE_CAPACITY";
/// Environment variable naming the bot owner.
pub const OWNER_VAR: &str = "CHAT_DISPATCH_OWNER_ID";

/// Dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Prefix a message must start with to be treated as a command (e.g. `!`).
    pub prefix: String,
    /// Maximum number of entries kept in an execution log (oldest dropped first).
    pub trace_capacity: Option<usize>,
    /// User that owner-only commands accept.
    pub owner_id: UserId,
    /// Whether messages authored by bots are ignored by the router.
    pub ignore_bots: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            trace_capacity: Some(64),
            owner_id: UserId(1),
            ignore_bots: true,
        }
    }
}

impl DispatchConfig {
    /// Build a configuration from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(prefix) = lookup(PREFIX_VAR) {
            if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidValue {
                    key: PREFIX_VAR.into(),
                    message: "prefix must be non-empty and contain no whitespace".into(),
                });
            }
            config.prefix = prefix;
        }

        if let Some(raw) = lookup(TRACE_CAPACITY_VAR) {
            let capacity: usize = parse_var(TRACE_CAPACITY_VAR, &raw)?;
            // 0 disables the cap
            config.trace_capacity = (capacity > 0).then_some(capacity);
        }

        if let Some(raw) = lookup(OWNER_VAR) {
            config.owner_id = UserId(parse_var(OWNER_VAR, &raw)?);
        }

        Ok(config)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = DispatchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DispatchConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = DispatchConfig::from_lookup(lookup(&[
            (PREFIX_VAR, "?"),
            (TRACE_CAPACITY_VAR, "0"),
            (OWNER_VAR, "42"),
        ]))
        .unwrap();
        assert_eq!(config.prefix, "?");
        assert_eq!(config.trace_capacity, None);
        assert_eq!(config.owner_id, UserId(42));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            DispatchConfig::from_lookup(lookup(&[(OWNER_VAR, "alice")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            DispatchConfig::from_lookup(lookup(&[(PREFIX_VAR, "a b")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
