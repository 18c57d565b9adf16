//! Value parsers turning a raw token into a typed parameter.
//!
//! Parsing is total: malformed input produces [`ParameterResult::Missing`]
//! instead of an error, and the owning configuration decides what to do.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("static regex"));

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").expect("static regex"));

/// Typed outcome of parsing one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterResult {
    /// The named parameter could not be derived.
    Missing(String),
    Null,
    String(String),
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
}

impl ParameterResult {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Decimal view; integers widen losslessly.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(d) => Some(*d),
            Self::Int(i) => Some(Decimal::from(*i)),
            _ => None,
        }
    }
}

/// How a raw token is converted into a [`ParameterResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueParser {
    /// Any token, verbatim.
    String,
    /// Literal `true` or `false`, nothing else.
    Bool,
    /// `[+-]?[0-9]+` within `i64`.
    Int,
    /// `[+-]?[0-9]+(.[0-9]+)?`, no exponent.
    Decimal,
    /// One of a fixed set of words, matched case-insensitively.
    Keyword { allowed: Vec<String> },
    /// Ignores its input.
    Null,
}

impl ValueParser {
    pub fn keyword<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keyword {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `raw` for the parameter called `name`.
    pub fn parse(&self, name: &str, raw: &str) -> ParameterResult {
        let missing = || ParameterResult::Missing(name.to_string());
        match self {
            Self::String => ParameterResult::String(raw.to_string()),
            Self::Bool => match raw {
                "true" => ParameterResult::Bool(true),
                "false" => ParameterResult::Bool(false),
                _ => missing(),
            },
            Self::Int => {
                if !INTEGER.is_match(raw) {
                    return missing();
                }
                raw.parse::<i64>()
                    .map(ParameterResult::Int)
                    .unwrap_or_else(|_| missing())
            }
            Self::Decimal => {
                if !DECIMAL.is_match(raw) {
                    return missing();
                }
                Decimal::from_str(raw)
                    .map(ParameterResult::Decimal)
                    .unwrap_or_else(|_| missing())
            }
            Self::Keyword { allowed } => allowed
                .iter()
                .find(|word| word.eq_ignore_ascii_case(raw))
                .map(|word| ParameterResult::String(word.clone()))
                .unwrap_or_else(missing),
            Self::Null => ParameterResult::Null,
        }
    }

    /// Short type name shown in usage lines.
    pub fn type_name(&self) -> String {
        match self {
            Self::String => "text".into(),
            Self::Bool => "true|false".into(),
            Self::Int => "integer".into(),
            Self::Decimal => "number".into(),
            Self::Keyword { allowed } => allowed.join("|"),
            Self::Null => "any".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn missing(name: &str) -> ParameterResult {
        ParameterResult::Missing(name.into())
    }

    #[test]
    fn strict_bool() {
        let p = ValueParser::Bool;
        assert_eq!(p.parse("flag", "true"), ParameterResult::Bool(true));
        assert_eq!(p.parse("flag", "false"), ParameterResult::Bool(false));
        for raw in ["True", "1", "yes", "FALSE", ""] {
            assert_eq!(p.parse("flag", raw), missing("flag"), "input {raw:?}");
        }
    }

    #[test]
    fn strict_int() {
        let p = ValueParser::Int;
        assert_eq!(p.parse("n", "42"), ParameterResult::Int(42));
        assert_eq!(p.parse("n", "-7"), ParameterResult::Int(-7));
        assert_eq!(p.parse("n", "+3"), ParameterResult::Int(3));
        for raw in ["4.2", "0x10", "1e3", " 5", "", "99999999999999999999"] {
            assert_eq!(p.parse("n", raw), missing("n"), "input {raw:?}");
        }
    }

    #[test]
    fn strict_decimal() {
        let p = ValueParser::Decimal;
        assert_eq!(p.parse("x", "2.50"), ParameterResult::Decimal(dec!(2.50)));
        assert_eq!(p.parse("x", "-10"), ParameterResult::Decimal(dec!(-10)));
        for raw in [".5", "5.", "1e3", "NaN", "1,5"] {
            assert_eq!(p.parse("x", raw), missing("x"), "input {raw:?}");
        }
    }

    #[test]
    fn keyword_returns_canonical_spelling() {
        let p = ValueParser::keyword(["on", "off"]);
        assert_eq!(p.parse("mode", "ON"), ParameterResult::String("on".into()));
        assert_eq!(p.parse("mode", "off"), ParameterResult::String("off".into()));
        assert_eq!(p.parse("mode", "maybe"), missing("mode"));
    }

    #[test]
    fn null_ignores_input() {
        let p = ValueParser::Null;
        assert_eq!(p.parse("x", "anything"), ParameterResult::Null);
        assert_eq!(p.parse("x", ""), ParameterResult::Null);
    }

    #[test]
    fn accessors() {
        assert_eq!(ParameterResult::Int(3).as_decimal(), Some(dec!(3)));
        assert_eq!(ParameterResult::String("a".into()).as_str(), Some("a"));
        assert_eq!(ParameterResult::Null.as_bool(), None);
        assert!(missing("a").is_missing());
    }

    #[test]
    fn result_serde_shape() {
        let json = serde_json::to_value(ParameterResult::Int(5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "int", "value": 5}));
    }
}
