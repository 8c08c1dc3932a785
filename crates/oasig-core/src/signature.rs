//! Signature methods (RFC 5849 Section 3.4).
//!
//! Each method is a standalone [`Signer`]; [`SignatureMethod`] selects one at
//! construction time and carries its key material.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer as _};
use sha1::Sha1;

use crate::codec::{Charset, base64, percent};
use crate::error::SigningError;

/// Produces the `oauth_signature` value for a signature base string.
///
/// The returned value is not percent-encoded.
pub trait Signer {
    /// Value of `oauth_signature_method` for this signer.
    fn method_name(&self) -> &'static str;

    /// Sign `base_string`.
    fn sign(&self, base_string: &str) -> Result<String, SigningError>;
}

/// Build the `consumer_secret&token_secret` key shared by PLAINTEXT and HMAC-SHA1.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
    format!(
        "{}&{}",
        percent::encode(consumer_secret),
        percent::encode(token_secret)
    )
}

/// Client shared secret and token shared secret.
///
/// Either may be the empty string; a secret that was never set is an error
/// at signing time.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    consumer_secret: Option<String>,
    token_secret: Option<String>,
}

impl Secrets {
    /// Create with both secrets set.
    pub fn new(consumer_secret: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self {
            consumer_secret: Some(consumer_secret.into()),
            token_secret: Some(token_secret.into()),
        }
    }

    /// Set the client shared secret.
    #[must_use]
    pub fn consumer_secret(mut self, secret: impl Into<String>) -> Self {
        self.consumer_secret = Some(secret.into());
        self
    }

    /// Set the token shared secret.
    #[must_use]
    pub fn token_secret(mut self, secret: impl Into<String>) -> Self {
        self.token_secret = Some(secret.into());
        self
    }

    fn signing_key(&self) -> Result<String, SigningError> {
        let consumer = self
            .consumer_secret
            .as_deref()
            .ok_or(SigningError::InvalidState("consumer secret"))?;
        let token = self
            .token_secret
            .as_deref()
            .ok_or(SigningError::InvalidState("token secret"))?;
        Ok(signing_key(consumer, token))
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field(
                "consumer_secret",
                &self.consumer_secret.as_ref().map(|_| "***"),
            )
            .field("token_secret", &self.token_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

/// `PLAINTEXT`: the signature is the signing key itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plaintext {
    secrets: Secrets,
}

impl Plaintext {
    /// Create a PLAINTEXT signer.
    pub fn new(secrets: Secrets) -> Self {
        Self { secrets }
    }
}

impl Signer for Plaintext {
    fn method_name(&self) -> &'static str {
        SignatureMethodKind::Plaintext.name()
    }

    fn sign(&self, _base_string: &str) -> Result<String, SigningError> {
        self.secrets.signing_key()
    }
}

/// `HMAC-SHA1` keyed with the PLAINTEXT signing key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HmacSha1 {
    secrets: Secrets,
}

impl HmacSha1 {
    /// Create an HMAC-SHA1 signer.
    pub fn new(secrets: Secrets) -> Self {
        Self { secrets }
    }
}

impl Signer for HmacSha1 {
    fn method_name(&self) -> &'static str {
        SignatureMethodKind::HmacSha1.name()
    }

    fn sign(&self, base_string: &str) -> Result<String, SigningError> {
        // One byte per character: the key is ASCII after percent-encoding
        let key = Charset::Latin1
            .encode(&self.secrets.signing_key()?)?
            .into_owned();
        let mut mac = Hmac::<Sha1>::new_from_slice(&key)?;
        mac.update(base_string.as_bytes());
        Ok(base64::encode(mac.finalize().into_bytes()))
    }
}

/// `RSA-SHA1`: RSASSA-PKCS1-v1_5 over SHA-1 with the client's private key.
#[derive(Clone, Default)]
pub struct RsaSha1 {
    signing_key: Option<SigningKey<Sha1>>,
}

impl RsaSha1 {
    /// Create an RSA-SHA1 signer for `private_key`.
    pub fn new(private_key: RsaPrivateKey) -> Self {
        Self {
            signing_key: Some(SigningKey::<Sha1>::new(private_key)),
        }
    }
}

impl fmt::Debug for RsaSha1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSha1")
            .field("has_key", &self.signing_key.is_some())
            .finish()
    }
}

impl Signer for RsaSha1 {
    fn method_name(&self) -> &'static str {
        SignatureMethodKind::RsaSha1.name()
    }

    fn sign(&self, base_string: &str) -> Result<String, SigningError> {
        let signing_key = self
            .signing_key
            .as_ref()
            .ok_or(SigningError::InvalidState("RSA private key"))?;
        let signature = signing_key.try_sign(base_string.as_bytes())?;
        Ok(base64::encode(signature.to_bytes()))
    }
}

/// Name of a signature method, without key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureMethodKind {
    /// `PLAINTEXT`
    Plaintext,
    /// `HMAC-SHA1`
    HmacSha1,
    /// `RSA-SHA1`
    RsaSha1,
}

impl SignatureMethodKind {
    /// Wire name used in `oauth_signature_method`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plaintext => "PLAINTEXT",
            Self::HmacSha1 => "HMAC-SHA1",
            Self::RsaSha1 => "RSA-SHA1",
        }
    }
}

impl fmt::Display for SignatureMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureMethodKind {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Plaintext, Self::HmacSha1, Self::RsaSha1]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SigningError::UnsupportedMethod(s.to_owned()))
    }
}

/// A signature method together with its key material.
#[derive(Debug, Clone)]
pub enum SignatureMethod {
    /// `PLAINTEXT` with client and token secrets.
    Plaintext(Plaintext),
    /// `HMAC-SHA1` with client and token secrets.
    HmacSha1(HmacSha1),
    /// `RSA-SHA1` with the client's private key.
    RsaSha1(RsaSha1),
}

impl SignatureMethod {
    /// `PLAINTEXT` with both secrets.
    pub fn plaintext(consumer_secret: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self::Plaintext(Plaintext::new(Secrets::new(consumer_secret, token_secret)))
    }

    /// `HMAC-SHA1` with both secrets.
    pub fn hmac_sha1(consumer_secret: impl Into<String>, token_secret: impl Into<String>) -> Self {
        Self::HmacSha1(HmacSha1::new(Secrets::new(consumer_secret, token_secret)))
    }

    /// `RSA-SHA1` with a private key.
    pub fn rsa_sha1(private_key: RsaPrivateKey) -> Self {
        Self::RsaSha1(RsaSha1::new(private_key))
    }

    /// Which method this is.
    pub fn kind(&self) -> SignatureMethodKind {
        match self {
            Self::Plaintext(_) => SignatureMethodKind::Plaintext,
            Self::HmacSha1(_) => SignatureMethodKind::HmacSha1,
            Self::RsaSha1(_) => SignatureMethodKind::RsaSha1,
        }
    }

    fn signer(&self) -> &dyn Signer {
        match self {
            Self::Plaintext(signer) => signer,
            Self::HmacSha1(signer) => signer,
            Self::RsaSha1(signer) => signer,
        }
    }
}

impl Signer for SignatureMethod {
    fn method_name(&self) -> &'static str {
        self.kind().name()
    }

    fn sign(&self, base_string: &str) -> Result<String, SigningError> {
        let signature = self.signer().sign(base_string)?;
        tracing::debug!(method = self.method_name(), "Computed signature");
        Ok(signature)
    }
}
