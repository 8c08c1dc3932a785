//! OAuth 1.0 request signing (RFC 5849).
//!
//! The crate turns a description of an HTTP request into the signed
//! protocol parameters a client sends with it:
//!
//! - [`BaseStringBuilder`]: collects the method, URI and parameters and
//!   produces the canonical [`BaseString`]
//! - [`SignatureMethod`]: `PLAINTEXT`, `HMAC-SHA1` and `RSA-SHA1` signers
//! - [`RequestSigner`]: binds a request to a signature method and returns a
//!   [`SignedRequest`] with header, form body and query representations
//!
//! Parameter names and values are percent-encoded by the [`codec`] module
//! using the RFC 3986 unreserved set.
//!
//! # Example
//!
//! ```
//! use oasig_core::{BaseStringBuilder, Fixed, RequestSigner, SignatureMethod};
//!
//! let builder = BaseStringBuilder::new()
//!     .method("GET")
//!     .uri("https://api.example.com/items?page=2")?
//!     .protocol_param("oauth_consumer_key", "key")?
//!     .nonce_supplier(Fixed::new("abc123"))
//!     .timestamp_supplier(Fixed::new("1700000000"));
//!
//! let signed = RequestSigner::new(builder)
//!     .signature_method(SignatureMethod::hmac_sha1("consumer-secret", ""))
//!     .sign()?;
//!
//! assert!(signed.authorization_header().starts_with("OAuth oauth_consumer_key=\"key\""));
//! # Ok::<(), oasig_core::SigningError>(())
//! ```

mod base_string;
pub mod codec;
mod error;
mod key;
mod params;
mod protocol;
mod signature;
mod supplier;

pub use base_string::{
    BaseString, BaseStringBuilder, OAUTH_NONCE, OAUTH_SIGNATURE, OAUTH_TIMESTAMP,
    normalize_parameters, signature_base_string, split_request_uri,
};
pub use error::{CodecError, RsaKeyError, SigningError};
pub use key::{load_private_key, load_private_key_from_file};
pub use params::{Namespace, PROTOCOL_PREFIX, ParameterSet};
pub use protocol::{
    OAUTH_SIGNATURE_METHOD, OAuthParams, ProtocolParameters, RequestSigner, SignedRequest,
};
pub use signature::{
    HmacSha1, Plaintext, RsaSha1, Secrets, SignatureMethod, SignatureMethodKind, Signer,
    signing_key,
};
pub use supplier::{Fixed, RandomNonce, Supplier, UnixTimestamp};

/// Re-exported so callers can hold a loaded key without depending on `rsa`.
pub use rsa::RsaPrivateKey;
