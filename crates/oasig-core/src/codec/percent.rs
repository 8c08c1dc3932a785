//! Percent-encoding per RFC 5849 Section 3.6.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};

use super::Charset;
use crate::error::CodecError;

/// OAuth unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode the UTF-8 bytes of `input`.
///
/// Space becomes `%20`, never `+`.
pub fn encode(input: &str) -> String {
    percent_encode(input.as_bytes(), OAUTH_ENCODE_SET).to_string()
}

/// Percent-encode `input` after converting it to `charset` bytes.
pub fn encode_with(input: &str, charset: Charset) -> Result<String, CodecError> {
    let bytes = charset.encode(input)?;
    Ok(percent_encode(&bytes, OAUTH_ENCODE_SET).to_string())
}

/// Decode a percent-encoded UTF-8 string.
///
/// Unlike form decoding, `+` is left as is.
pub fn decode(input: &str) -> Result<String, CodecError> {
    decode_with(input, Charset::Utf8)
}

/// Decode a percent-encoded string whose bytes are in `charset`.
pub fn decode_with(input: &str, charset: Charset) -> Result<String, CodecError> {
    check_escapes(input)?;
    let bytes: Vec<u8> = percent_decode_str(input).collect();
    charset.decode(&bytes)
}

/// Reject any `%` that is not followed by two hex digits.
///
/// `percent_decode_str` passes such sequences through untouched.
pub(crate) fn check_escapes(input: &str) -> Result<(), CodecError> {
    let bytes = input.as_bytes();
    for (offset, _) in input.match_indices('%') {
        let valid = bytes
            .get(offset + 1..offset + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(CodecError::MalformedPercent { offset });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_unreserved() {
        // Unreserved characters should not be encoded
        assert_eq!(encode("abc123"), "abc123");
        assert_eq!(encode("ABC"), "ABC");
        assert_eq!(encode("-._~"), "-._~");
    }

    #[test]
    fn test_encode_reserved() {
        // Reserved characters should be encoded
        assert_eq!(encode(" "), "%20");
        assert_eq!(encode("&"), "%26");
        assert_eq!(encode("="), "%3D");
        assert_eq!(encode("/"), "%2F");
        assert_eq!(encode("+"), "%2B");
        assert_eq!(encode("*"), "%2A");
    }

    #[test]
    fn test_encode_uses_uppercase_hex() {
        assert_eq!(encode("\u{e9}"), "%C3%A9");
        assert_eq!(encode("\u{2603}"), "%E2%98%83");
    }

    #[test]
    fn test_encode_with_latin1() {
        assert_eq!(encode_with("\u{e9}", Charset::Latin1).unwrap(), "%E9");
        assert!(encode_with("\u{2603}", Charset::Latin1).is_err());
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            decode("Ladies%20%2B%20Gentlemen").unwrap(),
            "Ladies + Gentlemen"
        );
        assert_eq!(decode("a+b").unwrap(), "a+b");
        assert_eq!(decode("%e2%98%83").unwrap(), "\u{2603}");
    }

    #[test]
    fn test_decode_with_latin1() {
        assert_eq!(decode_with("caf%E9", Charset::Latin1).unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            decode("100%"),
            Err(CodecError::MalformedPercent { offset: 3 })
        ));
        assert!(matches!(
            decode("%4"),
            Err(CodecError::MalformedPercent { offset: 0 })
        ));
        assert!(matches!(
            decode("a%zz"),
            Err(CodecError::MalformedPercent { offset: 1 })
        ));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(matches!(decode("%FF"), Err(CodecError::Utf8(_))));
    }

    #[test]
    fn test_round_trip() {
        for input in [
            "",
            "plain",
            "Hello Ladies + Gentlemen, a signed OAuth request!",
            "\u{2603} snow & ice = 100%",
            "~!@#$%^&*()_+`-={}|[]\\:\";'<>?,./",
            "\u{1F600}",
        ] {
            assert_eq!(decode(&encode(input)).unwrap(), input);
        }
    }
}
