//! Namespaced registry keys.
//!
//! Keys name blocks, items and recipes in configs, records and sync messages
//! (e.g. `homestead:barrel/oak`). They order lexically by namespace then path,
//! which keeps registry iteration and persisted output stable across runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Namespace used when a key omits one.
pub const DEFAULT_NAMESPACE: &str = "homestead";

/// Error returned when parsing an invalid [`RegistryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryKeyError {
    /// Input was blank.
    #[error("registry key cannot be empty")]
    Empty,
    /// Namespace part was empty, too long or had illegal characters.
    #[error("invalid registry key namespace `{0}` (allowed: a-z0-9_.-, max 64)")]
    Namespace(String),
    /// Path part was empty, too long or had illegal characters.
    #[error("invalid registry key path `{0}` (allowed: a-z0-9_./-, max 128)")]
    Path(String),
}

/// A namespaced key of the form `namespace:path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegistryKey {
    namespace: String,
    path: String,
}

impl RegistryKey {
    /// Parse `namespace:path`, or `path` under [`DEFAULT_NAMESPACE`].
    pub fn parse(input: &str) -> Result<Self, RegistryKeyError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RegistryKeyError::Empty);
        }
        let (namespace, path) = input.split_once(':').unwrap_or((DEFAULT_NAMESPACE, input));
        Self::new(namespace.trim(), path.trim())
    }

    /// Build a key from its parts.
    pub fn new(namespace: &str, path: &str) -> Result<Self, RegistryKeyError> {
        if !valid_part(namespace, 64, false) {
            return Err(RegistryKeyError::Namespace(namespace.to_string()));
        }
        if !valid_part(path, 128, true) {
            return Err(RegistryKeyError::Path(path.to_string()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
    }

    /// Key in the default namespace built from path segments joined by `/`.
    ///
    /// Segments come from the content enums' `name()` methods, which are
    /// always valid path characters.
    pub fn homestead(segments: &[&str]) -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            path: segments.join("/"),
        }
    }

    /// Registry key namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Registry key path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn valid_part(part: &str, max_len: usize, allow_slash: bool) -> bool {
    !part.is_empty()
        && part.len() <= max_len
        && part.chars().all(|c| {
            matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.') || (allow_slash && c == '/')
        })
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for RegistryKey {
    type Err = RegistryKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RegistryKey {
    type Error = RegistryKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RegistryKey> for String {
    fn from(key: RegistryKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_namespaced_key() {
        let key = RegistryKey::parse("homestead:barrel/oak").unwrap();
        assert_eq!(key.namespace(), "homestead");
        assert_eq!(key.path(), "barrel/oak");
        assert_eq!(key.to_string(), "homestead:barrel/oak");
    }

    #[test]
    fn bare_path_uses_default_namespace() {
        let key: RegistryKey = "pickling".parse().unwrap();
        assert_eq!(key, RegistryKey::homestead(&["pickling"]));
    }

    #[test]
    fn rejects_invalid_keys() {
        assert_eq!(RegistryKey::parse("   "), Err(RegistryKeyError::Empty));
        assert!(matches!(
            RegistryKey::parse("Bad:stone"),
            Err(RegistryKeyError::Namespace(_))
        ));
        assert!(matches!(
            RegistryKey::parse("homestead:"),
            Err(RegistryKeyError::Path(_))
        ));
        assert!(matches!(
            RegistryKey::parse("ns/x:stone"),
            Err(RegistryKeyError::Namespace(_))
        ));
    }

    #[test]
    fn keys_order_by_namespace_then_path() {
        let a = RegistryKey::parse("a:z").unwrap();
        let b = RegistryKey::parse("b:a").unwrap();
        let c = RegistryKey::parse("b:b").unwrap();
        assert!(a < b && b < c);
    }
}
