//! Environment-variable configuration helpers
//!
//! Configuration structs read their values through [`EnvSource`] so tests can
//! feed a map instead of mutating the process environment.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Problems reading a variable
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("{name} is not set")]
    Missing { name: String },

    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: String,
        value: String,
        reason: String,
    },
}

/// Where variables come from
pub enum EnvSource {
    /// The process environment
    Process,
    /// A fixed map, for tests
    Map(HashMap<String, String>),
}

impl EnvSource {
    /// Build a map source from pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Raw lookup; blank values count as unset
    pub fn get(&self, name: &str) -> Option<String> {
        let value = match self {
            Self::Process => std::env::var(name).ok(),
            Self::Map(map) => map.get(name).cloned(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn require(&self, name: &str) -> Result<String, EnvError> {
        self.get(name).ok_or_else(|| EnvError::Missing {
            name: name.to_string(),
        })
    }

    /// Parse a variable, falling back to `default` when unset
    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T, EnvError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| EnvError::Invalid {
                name: name.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }
}

/// Load `.env` from the working directory or its parents, if there is one
///
/// Returns the path of the loaded file. Variables already set in the process
/// environment are not overridden.
///
/// Runs before tracing is set up so `RUST_LOG` may come from the file; the
/// caller logs the path once a subscriber exists.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_and_blank() {
        let env = EnvSource::from_pairs([("A", "1"), ("BLANK", "  ")]);
        assert_eq!(env.require("A").unwrap(), "1");
        assert_eq!(
            env.require("BLANK"),
            Err(EnvError::Missing {
                name: "BLANK".to_string()
            })
        );
        assert!(env.get("MISSING").is_none());
    }

    #[test]
    fn test_parse_or() {
        let env = EnvSource::from_pairs([("PORT", "9000"), ("BAD", "abc")]);
        assert_eq!(env.parse_or("PORT", 8000_u16).unwrap(), 9000);
        assert_eq!(env.parse_or("UNSET", 8000_u16).unwrap(), 8000);
        let err = env.parse_or("BAD", 1_u16).unwrap_err();
        assert!(matches!(err, EnvError::Invalid { ref value, .. } if value == "abc"));
    }

    #[test]
    fn test_string_or() {
        let env = EnvSource::from_pairs([("MODEL", "gemini-2.5-flash")]);
        assert_eq!(env.string_or("MODEL", "x"), "gemini-2.5-flash");
        assert_eq!(env.string_or("HOST", "0.0.0.0"), "0.0.0.0");
    }
}
