//! Multi-valued request parameters.
//!
//! Query, entity-body and protocol parameters share one map. The namespace
//! only decides which keys may be inserted: protocol keys carry the `oauth_`
//! prefix, the others never do.

use std::collections::BTreeMap;
use std::fmt;

use crate::codec::form;
use crate::error::SigningError;

/// Prefix reserved for protocol parameters.
pub const PROTOCOL_PREFIX: &str = "oauth_";

/// Origin of a request parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// URI query component.
    Query,
    /// Form-encoded entity body.
    Entity,
    /// `oauth_`-prefixed protocol parameter.
    Protocol,
}

impl Namespace {
    /// Whether `key` may be inserted into this namespace.
    pub fn accepts(self, key: &str) -> bool {
        let prefixed = key.starts_with(PROTOCOL_PREFIX);
        match self {
            Self::Protocol => prefixed,
            Self::Query | Self::Entity => !prefixed,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Entity => "entity",
            Self::Protocol => "protocol",
        })
    }
}

/// Parameters of one request, keyed by name with every value kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: BTreeMap<String, Vec<String>>,
}

impl ParameterSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value under `key` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::NamespaceViolation`] when the key's prefix does
    /// not match the namespace.
    pub fn insert(
        &mut self,
        namespace: Namespace,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, SigningError> {
        let key = key.into();
        if !namespace.accepts(&key) {
            return Err(SigningError::NamespaceViolation { key, namespace });
        }
        self.entries.entry(key).or_default().push(value.into());
        Ok(self)
    }

    /// Add a query parameter.
    pub fn insert_query(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, SigningError> {
        self.insert(Namespace::Query, key, value)
    }

    /// Add an entity-body parameter.
    pub fn insert_entity(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, SigningError> {
        self.insert(Namespace::Entity, key, value)
    }

    /// Add a protocol parameter.
    pub fn insert_protocol(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, SigningError> {
        self.insert(Namespace::Protocol, key, value)
    }

    /// Add every pair of a raw query string (`a=1&b=2`).
    pub fn extend_query(&mut self, query: &str) -> Result<&mut Self, SigningError> {
        self.extend_encoded(Namespace::Query, query)
    }

    /// Add every pair of a form-encoded entity body.
    pub fn extend_form(&mut self, body: &str) -> Result<&mut Self, SigningError> {
        self.extend_encoded(Namespace::Entity, body)
    }

    fn extend_encoded(
        &mut self,
        namespace: Namespace,
        encoded: &str,
    ) -> Result<&mut Self, SigningError> {
        for (key, value) in form::parse(encoded)? {
            self.insert(namespace, key, value)?;
        }
        Ok(self)
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values stored under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether at least one value is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        !self.get_all(key).is_empty()
    }

    /// Remove `key` and return its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(key)
    }

    /// Every key/value pair; keys in string order, values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(k, v)| pairs(k, v))
    }

    /// Protocol keys with their values.
    pub fn protocol(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .filter(|(k, _)| k.starts_with(PROTOCOL_PREFIX))
            .map(|(k, values)| (k.as_str(), values.as_slice()))
    }

    /// Number of key/value pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pair one key with each of its values.
fn pairs<'a>(key: &'a str, values: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> {
    values.iter().map(move |value| (key, value.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_key_requires_prefix() {
        let mut params = ParameterSet::new();
        let err = params.insert_protocol("nonce", "x").unwrap_err();
        assert!(matches!(
            err,
            SigningError::NamespaceViolation {
                namespace: Namespace::Protocol,
                ..
            }
        ));
        assert!(params.is_empty());
    }

    #[test]
    fn test_request_key_rejects_prefix() {
        let mut params = ParameterSet::new();
        assert!(params.insert_query("oauth_token", "x").is_err());
        assert!(params.insert_entity("oauth_token", "x").is_err());
        assert!(params.insert_query("oauthtoken", "x").is_ok());
    }

    #[test]
    fn test_duplicate_keys_preserved() {
        let mut params = ParameterSet::new();
        params
            .insert_query("a", "2")
            .unwrap()
            .insert_entity("a", "1")
            .unwrap();
        assert_eq!(params.get_all("a"), ["2", "1"]);
        assert_eq!(params.get("a"), Some("2"));
        assert_eq!(params.len(), 2);
        let all: Vec<_> = params.iter().collect();
        assert_eq!(all, [("a", "2"), ("a", "1")]);
    }

    #[test]
    fn test_get_missing() {
        let params = ParameterSet::new();
        assert_eq!(params.get("a"), None);
        assert!(params.get_all("a").is_empty());
        assert!(!params.contains_key("a"));
    }

    #[test]
    fn test_extend_query() {
        let mut params = ParameterSet::new();
        params.extend_query("b5=%3D%253D&a3=a&c%40=&a2=r%20b").unwrap();
        assert_eq!(params.get("b5"), Some("=%3D"));
        assert_eq!(params.get("c@"), Some(""));
        assert_eq!(params.get("a2"), Some("r b"));
    }

    #[test]
    fn test_extend_form_rejects_protocol_keys() {
        let mut params = ParameterSet::new();
        let err = params.extend_form("status=hi&oauth_token=x").unwrap_err();
        assert!(matches!(
            err,
            SigningError::NamespaceViolation {
                namespace: Namespace::Entity,
                ..
            }
        ));
    }

    #[test]
    fn test_extend_query_malformed() {
        let mut params = ParameterSet::new();
        assert!(matches!(
            params.extend_query("a=%G0"),
            Err(SigningError::Codec(_))
        ));
    }

    #[test]
    fn test_protocol_iter() {
        let mut params = ParameterSet::new();
        params.insert_query("status", "x").unwrap();
        params.insert_protocol("oauth_nonce", "n").unwrap();
        params.insert_protocol("oauth_token", "t").unwrap();
        let keys: Vec<&str> = params.protocol().map(|(k, _)| k).collect();
        assert_eq!(keys, ["oauth_nonce", "oauth_token"]);
    }

    #[test]
    fn test_iter_flattens_values() {
        let mut params = ParameterSet::new();
        params.insert_query("b", "1").unwrap();
        params.insert_query("a", "2").unwrap();
        params.insert_query("a", "1").unwrap();
        let pairs: Vec<(&str, &str)> = params.iter().collect();
        assert_eq!(pairs, [("a", "2"), ("a", "1"), ("b", "1")]);
    }
}
