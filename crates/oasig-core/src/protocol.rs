//! Signed protocol parameters and their wire representations (RFC 5849 Section 3.5).

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::base_string::{BaseString, BaseStringBuilder, OAUTH_SIGNATURE};
use crate::codec::{form, percent};
use crate::error::SigningError;
use crate::params::ParameterSet;
use crate::signature::{SignatureMethod, Signer};

/// Protocol parameter naming the signature method.
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";

/// Protocol parameters of a signed request, sorted by key.
///
/// Always holds exactly one `oauth_signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolParameters {
    params: BTreeMap<String, String>,
}

impl ProtocolParameters {
    /// Sign `base_string` and merge the signature into its protocol parameters.
    ///
    /// Any `oauth_signature` already present in the input is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::DuplicateProtocolParameter`] when a protocol
    /// parameter has several values, or the signer's error.
    pub fn assemble(base_string: &BaseString, signer: &dyn Signer) -> Result<Self, SigningError> {
        let mut params = BTreeMap::new();
        for (key, values) in base_string.parameters().protocol() {
            if key == OAUTH_SIGNATURE {
                continue;
            }
            let [value] = values else {
                return Err(SigningError::DuplicateProtocolParameter(key.to_owned()));
            };
            params.insert(key.to_owned(), value.clone());
        }

        if let Some(declared) = params.get(OAUTH_SIGNATURE_METHOD)
            && declared != signer.method_name()
        {
            tracing::warn!(
                declared = %declared,
                used = signer.method_name(),
                "oauth_signature_method does not match the signing method"
            );
        }

        let signature = signer.sign(base_string.as_str())?;
        params.insert(OAUTH_SIGNATURE.to_owned(), signature);
        Ok(Self { params })
    }

    /// The computed `oauth_signature` value (not percent-encoded).
    pub fn signature(&self) -> &str {
        self.get(OAUTH_SIGNATURE).unwrap_or_default()
    }

    /// Value of a protocol parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of parameters, including the signature.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Always false: the signature is always present.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `Authorization` header value (RFC 5849 Section 3.5.1).
    ///
    /// The realm is written as given; parameter names and values are
    /// percent-encoded.
    pub fn to_authorization_header(&self, realm: Option<&str>) -> String {
        let mut header = String::from("OAuth");
        let mut separator = " ";
        if let Some(realm) = realm {
            let _ = write!(header, " realm=\"{realm}\"");
            separator = ", ";
        }
        for (key, value) in &self.params {
            let _ = write!(
                header,
                "{separator}{}=\"{}\"",
                percent::encode(key),
                percent::encode(value)
            );
            separator = ", ";
        }
        header
    }

    /// `application/x-www-form-urlencoded` entity body (RFC 5849 Section 3.5.2).
    pub fn to_form_body(&self) -> String {
        form::serialize(self.iter())
    }

    /// Query component (RFC 5849 Section 3.5.3).
    pub fn to_query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", percent::encode(k), percent::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Standard protocol parameters identifying the client and token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthParams {
    /// `oauth_consumer_key`.
    pub consumer_key: String,
    /// `oauth_token`; absent when requesting temporary credentials.
    pub token: Option<String>,
    /// `oauth_callback`, sent when requesting temporary credentials.
    pub callback: Option<String>,
    /// `oauth_verifier`, sent when exchanging for token credentials.
    pub verifier: Option<String>,
    /// Whether to send `oauth_version="1.0"`.
    pub include_version: bool,
}

impl OAuthParams {
    /// Create parameters for `consumer_key`, including `oauth_version`.
    pub fn new(consumer_key: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            include_version: true,
            ..Self::default()
        }
    }

    /// Set `oauth_token`.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add the parameters to `params`.
    ///
    /// Keys the caller already set are left untouched.
    pub fn apply(&self, params: &mut ParameterSet) -> Result<(), SigningError> {
        let version = self.include_version.then_some("1.0");
        let defaults = [
            ("oauth_consumer_key", Some(self.consumer_key.as_str())),
            ("oauth_token", self.token.as_deref()),
            ("oauth_callback", self.callback.as_deref()),
            ("oauth_verifier", self.verifier.as_deref()),
            ("oauth_version", version),
        ];
        for (key, value) in defaults {
            if let Some(value) = value
                && !params.contains_key(key)
            {
                params.insert_protocol(key, value)?;
            }
        }
        Ok(())
    }
}

/// Binds a base string builder to a signature method.
#[derive(Debug, Default)]
pub struct RequestSigner {
    builder: BaseStringBuilder,
    method: Option<SignatureMethod>,
    realm: Option<String>,
}

impl RequestSigner {
    /// Create a signer for the request described by `builder`.
    pub fn new(builder: BaseStringBuilder) -> Self {
        Self {
            builder,
            ..Self::default()
        }
    }

    /// Bind the signature method.
    #[must_use]
    pub fn signature_method(mut self, method: SignatureMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Set the `realm` written into the Authorization header.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Build the base string, sign it and assemble the protocol parameters.
    ///
    /// `oauth_signature_method` is added from the bound method when the
    /// request does not carry one.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidState`] when no signature method is
    /// bound, or any error from building, signing or assembling.
    pub fn sign(self) -> Result<SignedRequest, SigningError> {
        let method = self
            .method
            .ok_or(SigningError::InvalidState("signature method"))?;
        let mut builder = self.builder;
        if !builder.parameters().contains_key(OAUTH_SIGNATURE_METHOD) {
            builder
                .parameters_mut()
                .insert_protocol(OAUTH_SIGNATURE_METHOD, method.method_name())?;
        }

        let base_string = builder.build()?;
        let parameters = ProtocolParameters::assemble(&base_string, &method)?;
        Ok(SignedRequest {
            base_string,
            parameters,
            realm: self.realm,
        })
    }
}

/// Result of signing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    base_string: BaseString,
    parameters: ProtocolParameters,
    realm: Option<String>,
}

impl SignedRequest {
    /// The signed base string.
    pub fn base_string(&self) -> &BaseString {
        &self.base_string
    }

    /// Protocol parameters including `oauth_signature`.
    pub fn parameters(&self) -> &ProtocolParameters {
        &self.parameters
    }

    /// `Authorization` header value, with the realm if one was set.
    pub fn authorization_header(&self) -> String {
        self.parameters
            .to_authorization_header(self.realm.as_deref())
    }

    /// Form-encoded entity body.
    pub fn form_body(&self) -> String {
        self.parameters.to_form_body()
    }

    /// Query component.
    pub fn query_string(&self) -> String {
        self.parameters.to_query_string()
    }
}

#[cfg(test)]
mod tests {
    // Signed output is shared across threads by callers
    static_assertions::assert_impl_all!(super::ProtocolParameters: Send, Sync);
    static_assertions::assert_impl_all!(super::SignedRequest: Send, Sync);
    static_assertions::assert_impl_all!(super::RequestSigner: Send, Sync);
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::key::load_private_key;
    use crate::supplier::Fixed;

    const TWITTER_CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
    const TWITTER_TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";

    fn twitter_builder() -> BaseStringBuilder {
        BaseStringBuilder::new()
            .method("POST")
            .base_uri("https://api.twitter.com/1/statuses/update.json")
            .query_param("include_entities", "true")
            .unwrap()
            .entity_param(
                "status",
                "Hello Ladies + Gentlemen, a signed OAuth request!",
            )
            .unwrap()
            .protocol_param("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog")
            .unwrap()
            .protocol_param("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg")
            .unwrap()
            .protocol_param("oauth_signature_method", "HMAC-SHA1")
            .unwrap()
            .protocol_param("oauth_timestamp", "1318622958")
            .unwrap()
            .protocol_param(
                "oauth_token",
                "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            )
            .unwrap()
            .protocol_param("oauth_version", "1.0")
            .unwrap()
    }

    fn twitter_signed() -> SignedRequest {
        RequestSigner::new(twitter_builder())
            .signature_method(SignatureMethod::hmac_sha1(
                TWITTER_CONSUMER_SECRET,
                TWITTER_TOKEN_SECRET,
            ))
            .sign()
            .unwrap()
    }

    #[test]
    fn test_twitter_signature() {
        let signed = twitter_signed();
        assert_eq!(
            signed.parameters().signature(),
            "tnnArxj06cWHq44gCs1OSKk/jLY="
        );
    }

    #[test]
    fn test_twitter_authorization_header() {
        assert_eq!(
            twitter_signed().authorization_header(),
            concat!(
                r#"OAuth oauth_consumer_key="xvz1evFS4wEEPTGEFPHBog", "#,
                r#"oauth_nonce="kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg", "#,
                r#"oauth_signature="tnnArxj06cWHq44gCs1OSKk%2FjLY%3D", "#,
                r#"oauth_signature_method="HMAC-SHA1", "#,
                r#"oauth_timestamp="1318622958", "#,
                r#"oauth_token="370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb", "#,
                r#"oauth_version="1.0""#,
            )
        );
    }

    #[test]
    fn test_protocol_parameters_exclude_request_parameters() {
        let signed = twitter_signed();
        let keys: Vec<&str> = signed.parameters().iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            [
                "oauth_consumer_key",
                "oauth_nonce",
                "oauth_signature",
                "oauth_signature_method",
                "oauth_timestamp",
                "oauth_token",
                "oauth_version",
            ]
        );
    }

    #[test]
    fn test_rfc_example_with_corrected_signature() {
        // RFC 5849 Section 3.1 prints "bYT5CMsGcbgUdFHObYMEfcx6bsw=" for this
        // request; that value is wrong (errata 2550). The secrets are those
        // of the Section 1.2 example.
        let builder = BaseStringBuilder::new()
            .method("POST")
            .uri("http://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b")
            .unwrap()
            .form_body("c2&a3=2+q")
            .unwrap()
            .protocol_param("oauth_consumer_key", "9djdj82h48djs9d2")
            .unwrap()
            .protocol_param("oauth_token", "kkk9d7dh3k39sjv7")
            .unwrap()
            .protocol_param("oauth_signature_method", "HMAC-SHA1")
            .unwrap()
            .protocol_param("oauth_timestamp", "137131201")
            .unwrap()
            .protocol_param("oauth_nonce", "7d8f3e4a")
            .unwrap()
            .protocol_param("oauth_signature", "bYT5CMsGcbgUdFHObYMEfcx6bsw=")
            .unwrap();
        let signed = RequestSigner::new(builder)
            .signature_method(SignatureMethod::hmac_sha1("j49sk3j29djd", "dh893hdasih9"))
            .realm("Example")
            .sign()
            .unwrap();

        assert_eq!(
            signed.parameters().signature(),
            "r6/TJjbCOr97/+UU0NsvSne7s5g="
        );
        assert_eq!(
            signed.authorization_header(),
            concat!(
                r#"OAuth realm="Example", oauth_consumer_key="9djdj82h48djs9d2", "#,
                r#"oauth_nonce="7d8f3e4a", "#,
                r#"oauth_signature="r6%2FTJjbCOr97%2F%2BUU0NsvSne7s5g%3D", "#,
                r#"oauth_signature_method="HMAC-SHA1", oauth_timestamp="137131201", "#,
                r#"oauth_token="kkk9d7dh3k39sjv7""#,
            )
        );
    }

    #[test]
    fn test_rfc_temporary_credentials_request() {
        // RFC 5849 Section 1.2, temporary credentials
        let mut builder = BaseStringBuilder::new()
            .method("POST")
            .uri("https://photos.example.net/initiate")
            .unwrap()
            .nonce_supplier(Fixed::new("wIjqoS"))
            .timestamp_supplier(Fixed::new("137131200"));
        OAuthParams {
            consumer_key: "dpf43f3p2l4k3l03".to_owned(),
            callback: Some("http://printer.example.com/ready".to_owned()),
            ..OAuthParams::default()
        }
        .apply(builder.parameters_mut())
        .unwrap();

        let signed = RequestSigner::new(builder)
            .signature_method(SignatureMethod::hmac_sha1("kd94hf93k423kf44", ""))
            .realm("Photos")
            .sign()
            .unwrap();

        assert_eq!(
            signed.parameters().signature(),
            "74KNZJeDHnMBp0EMJ9ZHt/XKycU="
        );
        assert_eq!(
            signed.parameters().get(OAUTH_SIGNATURE_METHOD),
            Some("HMAC-SHA1")
        );
    }

    #[test]
    fn test_header_without_parameters_after_realm() {
        let builder = BaseStringBuilder::new()
            .method("GET")
            .base_uri("http://example.com/")
            .nonce_supplier(Fixed::new("n"))
            .timestamp_supplier(Fixed::new("1"));
        let signed = RequestSigner::new(builder)
            .signature_method(SignatureMethod::plaintext("cs", "ts"))
            .realm("http://sp.example.com/")
            .sign()
            .unwrap();
        assert_eq!(
            signed.authorization_header(),
            concat!(
                r#"OAuth realm="http://sp.example.com/", oauth_nonce="n", "#,
                r#"oauth_signature="cs%26ts", oauth_signature_method="PLAINTEXT", "#,
                r#"oauth_timestamp="1""#,
            )
        );
    }

    #[test]
    fn test_header_encodes_parameter_names() {
        let builder = BaseStringBuilder::new()
            .method("GET")
            .base_uri("http://example.com/")
            .protocol_param("oauth_a b", "c")
            .unwrap()
            .nonce_supplier(Fixed::new("n"))
            .timestamp_supplier(Fixed::new("1"));
        let signed = RequestSigner::new(builder)
            .signature_method(SignatureMethod::plaintext("cs", ""))
            .sign()
            .unwrap();
        assert_eq!(
            signed.authorization_header(),
            concat!(
                r#"OAuth oauth_a%20b="c", oauth_nonce="n", oauth_signature="cs%26", "#,
                r#"oauth_signature_method="PLAINTEXT", oauth_timestamp="1""#,
            )
        );
    }

    #[test]
    fn test_form_body_and_query_string() {
        let builder = BaseStringBuilder::new()
            .method("POST")
            .base_uri("http://example.com/")
            .protocol_param("oauth_callback", "http://a.example/cb?x=1 2")
            .unwrap()
            .nonce_supplier(Fixed::new("n"))
            .timestamp_supplier(Fixed::new("1"));
        let signed = RequestSigner::new(builder)
            .signature_method(SignatureMethod::plaintext("c s", ""))
            .sign()
            .unwrap();

        assert_eq!(
            signed.form_body(),
            concat!(
                "oauth_callback=http%3A%2F%2Fa.example%2Fcb%3Fx%3D1+2&oauth_nonce=n",
                "&oauth_signature=c%2520s%26&oauth_signature_method=PLAINTEXT",
                "&oauth_timestamp=1",
            )
        );
        assert_eq!(
            signed.query_string(),
            concat!(
                "oauth_callback=http%3A%2F%2Fa.example%2Fcb%3Fx%3D1%202&oauth_nonce=n",
                "&oauth_signature=c%2520s%26&oauth_signature_method=PLAINTEXT",
                "&oauth_timestamp=1",
            )
        );
    }

    #[test]
    fn test_missing_signature_method() {
        let err = RequestSigner::new(twitter_builder()).sign().unwrap_err();
        assert!(matches!(
            err,
            SigningError::InvalidState("signature method")
        ));
    }

    #[test]
    fn test_duplicate_protocol_parameter() {
        let builder = twitter_builder()
            .protocol_param("oauth_token", "second")
            .unwrap();
        let err = RequestSigner::new(builder)
            .signature_method(SignatureMethod::hmac_sha1("a", "b"))
            .sign()
            .unwrap_err();
        assert!(matches!(
            err,
            SigningError::DuplicateProtocolParameter(key) if key == "oauth_token"
        ));
    }

    #[test]
    fn test_assemble_from_frozen_base_string() {
        let base = twitter_builder().build().unwrap();
        let signer = SignatureMethod::hmac_sha1(TWITTER_CONSUMER_SECRET, TWITTER_TOKEN_SECRET);
        let first = ProtocolParameters::assemble(&base, &signer).unwrap();
        let second = ProtocolParameters::assemble(&base, &signer).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
    }

    #[test]
    fn test_rsa_sha1_request() {
        let key = load_private_key(include_bytes!("../testdata/consumer_pkcs8.pem")).unwrap();
        let mut builder = BaseStringBuilder::new()
            .method("GET")
            .uri("http://photos.example.net/photos?file=vacation.jpg&size=original")
            .unwrap()
            .protocol_param("oauth_nonce", "chapoH")
            .unwrap()
            .protocol_param("oauth_timestamp", "137131202")
            .unwrap();
        OAuthParams {
            consumer_key: "dpf43f3p2l4k3l03".to_owned(),
            token: Some("nnch734d00sl2jdk".to_owned()),
            ..OAuthParams::default()
        }
        .apply(builder.parameters_mut())
        .unwrap();

        let signed = RequestSigner::new(builder)
            .signature_method(SignatureMethod::rsa_sha1(key))
            .sign()
            .unwrap();
        let signature = signed.parameters().signature();
        assert!(signature.starts_with("d4/8z9ZwkSFsUqWO8EUJ"));
    }

    #[test]
    fn test_oauth_params_new_includes_version() {
        let mut params = ParameterSet::new();
        OAuthParams::new("key")
            .token("tok")
            .apply(&mut params)
            .unwrap();
        assert_eq!(params.get("oauth_consumer_key"), Some("key"));
        assert_eq!(params.get("oauth_token"), Some("tok"));
        assert_eq!(params.get("oauth_version"), Some("1.0"));
        assert!(!params.contains_key("oauth_callback"));
    }

    #[test]
    fn test_oauth_params_keep_caller_values() {
        let mut params = ParameterSet::new();
        params.insert_protocol("oauth_token", "explicit").unwrap();
        OAuthParams::new("key")
            .token("default")
            .apply(&mut params)
            .unwrap();
        assert_eq!(params.get_all("oauth_token"), ["explicit"]);
    }
}
