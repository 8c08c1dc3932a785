//! Error types for request signing.

use std::str::Utf8Error;

use crate::codec::Charset;
use crate::params::Namespace;

/// Error from encoding or decoding a value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// A `%` not followed by two hexadecimal digits.
    #[error("malformed percent-encoding at byte {offset}")]
    MalformedPercent {
        /// Byte offset of the offending `%`.
        offset: usize,
    },

    /// Decoded bytes are not valid UTF-8.
    #[error("decoded bytes are not valid UTF-8")]
    Utf8(#[from] Utf8Error),

    /// Character cannot be represented in the target charset.
    #[error("character {ch:?} cannot be encoded as {charset}")]
    Unmappable {
        /// Target charset.
        charset: Charset,
        /// The offending character.
        ch: char,
    },

    /// Byte is not valid in the source charset.
    #[error("byte 0x{byte:02X} is not valid {charset}")]
    InvalidByte {
        /// Source charset.
        charset: Charset,
        /// The offending byte.
        byte: u8,
    },

    /// Charset name not recognized.
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Malformed Base64 input.
    #[error("invalid Base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// RSA key loading/parsing error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RsaKeyError {
    /// Key file could not be read.
    #[error("failed to read key file: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 in key file.
    #[error("invalid UTF-8 in key")]
    InvalidUtf8(#[from] Utf8Error),

    /// PKCS#1 key parsing error.
    #[error("PKCS#1 key error: {0}")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// PKCS#8 key parsing error (returned when both formats fail).
    #[error("PKCS#8 key error: {0}")]
    Pkcs8(#[from] rsa::pkcs8::Error),
}

/// Error from building, signing or assembling an OAuth request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SigningError {
    /// A required input was not provided before it was needed.
    #[error("{0} is not set")]
    InvalidState(&'static str),

    /// Key does not match the namespace it was inserted into.
    #[error("parameter {key:?} cannot be used as a {namespace} parameter")]
    NamespaceViolation {
        /// Offending key.
        key: String,
        /// Namespace the caller tried to insert into.
        namespace: Namespace,
    },

    /// Protocol parameter carries more than one value.
    #[error("protocol parameter {0:?} has more than one value")]
    DuplicateProtocolParameter(String),

    /// Request URI could not be parsed.
    #[error("invalid request URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    /// Request URI is not usable as a base string URI.
    #[error("request URI {0:?} has no host")]
    MissingHost(String),

    /// Unknown `oauth_signature_method` name.
    #[error("unsupported signature method: {0}")]
    UnsupportedMethod(String),

    /// Encoding or decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// HMAC key was rejected by the primitive.
    #[error("HMAC key rejected")]
    HmacKey(#[from] hmac::digest::InvalidLength),

    /// RSA signing failed.
    #[error("RSA signature failed")]
    Rsa(#[from] rsa::signature::Error),

    /// RSA key could not be loaded.
    #[error(transparent)]
    RsaKey(#[from] RsaKeyError),
}
