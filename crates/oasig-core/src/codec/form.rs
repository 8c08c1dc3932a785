//! `application/x-www-form-urlencoded` encoding.
//!
//! Only used for the form body serialization and for reading query strings
//! and form bodies into parameters. Base string canonicalization always uses
//! [`super::percent`].

use super::percent;
use crate::error::CodecError;

/// Form-encode a single name or value (space becomes `+`).
pub fn encode(input: &str) -> String {
    form_urlencoded::byte_serialize(input.as_bytes()).collect()
}

/// Decode a single form-encoded name or value.
pub fn decode(input: &str) -> Result<String, CodecError> {
    if input.contains('+') {
        percent::decode(&input.replace('+', " "))
    } else {
        percent::decode(input)
    }
}

/// Serialize pairs as `name=value&name=value`.
pub fn serialize<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse `name=value&name=value` into decoded pairs.
///
/// Empty segments are skipped; a segment without `=` has an empty value.
pub fn parse(input: &str) -> Result<Vec<(String, String)>, CodecError> {
    input
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok((decode(key)?, decode(value)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_space_as_plus() {
        assert_eq!(
            encode("Hello Ladies + Gentlemen"),
            "Hello+Ladies+%2B+Gentlemen"
        );
    }

    #[test]
    fn test_encode_reserved() {
        assert_eq!(encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode("*-._"), "*-._");
        assert_eq!(encode("~"), "%7E");
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            decode("Hello+Ladies+%2B+Gentlemen").unwrap(),
            "Hello Ladies + Gentlemen"
        );
        assert!(decode("bad%2").is_err());
    }

    #[test]
    fn test_serialize() {
        let body = serialize([("status", "Hello world!"), ("empty", "")]);
        assert_eq!(body, "status=Hello+world%21&empty=");
    }

    #[test]
    fn test_parse() {
        let pairs = parse("c2&a3=2+q&&b5=%3D%253D").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("c2".to_owned(), String::new()),
                ("a3".to_owned(), "2 q".to_owned()),
                ("b5".to_owned(), "=%3D".to_owned()),
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").unwrap().is_empty());
    }
}
