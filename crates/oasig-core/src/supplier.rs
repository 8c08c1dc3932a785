//! Nonce and timestamp sources.

use std::time::{SystemTime, UNIX_EPOCH};

/// Produces a fresh string value each time it is called.
pub trait Supplier: Send + Sync {
    /// Produce a value.
    fn supply(&self) -> String;
}

impl<F> Supplier for F
where
    F: Fn() -> String + Send + Sync,
{
    fn supply(&self) -> String {
        self()
    }
}

/// Cryptographically random nonce (32 hex characters).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomNonce;

impl Supplier for RandomNonce {
    fn supply(&self) -> String {
        let bytes: [u8; 16] = rand::random();
        hex::encode(bytes)
    }
}

/// Seconds since the Unix epoch, as decimal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixTimestamp;

impl Supplier for UnixTimestamp {
    fn supply(&self) -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            .to_string()
    }
}

/// Always returns the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed(pub String);

impl Fixed {
    /// Create a supplier returning `value`.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl Supplier for Fixed {
    fn supply(&self) -> String {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_uniqueness() {
        let nonce1 = RandomNonce.supply();
        let nonce2 = RandomNonce.supply();
        assert_ne!(nonce1, nonce2);
        assert_eq!(nonce1.len(), 32);
    }

    #[test]
    fn test_timestamp_is_decimal_seconds() {
        let timestamp = UnixTimestamp.supply();
        let secs: u64 = timestamp.parse().unwrap();
        // 2020-01-01T00:00:00Z
        assert!(secs > 1_577_836_800);
    }

    #[test]
    fn test_fixed() {
        let supplier = Fixed::new("1318622958");
        assert_eq!(supplier.supply(), "1318622958");
        assert_eq!(supplier.supply(), "1318622958");
    }

    #[test]
    fn test_closure_supplier() {
        let supplier = || "abc".to_owned();
        assert_eq!(supplier.supply(), "abc");
    }
}
