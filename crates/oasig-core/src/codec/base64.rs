//! Standard Base64 (`A-Z a-z 0-9 + /`, `=` padding).

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::error::CodecError;

/// Base64-encode bytes.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Decode padded standard Base64.
pub fn decode(input: &str) -> Result<Vec<u8>, CodecError> {
    Ok(BASE64_STANDARD.decode(input)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(encode(b""), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_padding() {
        assert_eq!(encode(b"abc"), "YWJj");
        assert_eq!(encode(b"ab"), "YWI=");
        assert_eq!(encode(b"a"), "YQ==");
        assert_eq!(decode("YWJj").unwrap(), b"abc");
        assert_eq!(decode("YWI=").unwrap(), b"ab");
        assert_eq!(decode("YQ==").unwrap(), b"a");
    }

    #[test]
    fn test_full_alphabet() {
        assert_eq!(encode([0xFB, 0xFF, 0xBF]), "+/+/");
        assert_eq!(decode("+/+/").unwrap(), [0xFB, 0xFF, 0xBF]);
    }

    #[test]
    fn test_round_trip_all_lengths() {
        let data: Vec<u8> = (0..=255).collect();
        for len in 0..data.len() {
            assert_eq!(decode(&encode(&data[..len])).unwrap(), &data[..len]);
        }
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(decode("YQ="), Err(CodecError::Base64(_))));
        assert!(matches!(decode("Y!=="), Err(CodecError::Base64(_))));
        assert!(matches!(decode("YQ"), Err(CodecError::Base64(_))));
    }
}
