//! Signature base string construction (RFC 5849 Section 3.4.1).

use std::fmt::{self, Write};

use url::Url;

use crate::codec::percent;
use crate::error::SigningError;
use crate::params::{Namespace, ParameterSet};
use crate::supplier::Supplier;

/// Protocol parameter holding the signature; never part of the base string.
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
/// Protocol parameter holding the nonce.
pub const OAUTH_NONCE: &str = "oauth_nonce";
/// Protocol parameter holding the timestamp.
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";

/// Build the normalized parameter string (RFC 5849 Section 3.4.1.3.2).
///
/// Keys and values are percent-encoded independently, then sorted by encoded
/// key and, for repeated keys, by encoded value. `oauth_signature` is skipped.
pub fn normalize_parameters(params: &ParameterSet) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| *k != OAUTH_SIGNATURE)
        .map(|(k, v)| (percent::encode(k), percent::encode(v)))
        .collect();
    encoded.sort_unstable();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the signature base string from already validated parts.
///
/// Format: `METHOD&encoded_base_uri&encoded_parameters`
pub fn signature_base_string(method: &str, base_uri: &str, params: &ParameterSet) -> String {
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent::encode(base_uri),
        percent::encode(&normalize_parameters(params))
    )
}

/// Split an absolute request URI into its base string URI and raw query.
///
/// The base string URI (RFC 5849 Section 3.4.1.2) has a lower-case scheme
/// and host, no default port, no query and no fragment.
pub fn split_request_uri(uri: &str) -> Result<(String, Option<String>), SigningError> {
    let url = Url::parse(uri)?;
    let host = url
        .host_str()
        .ok_or_else(|| SigningError::MissingHost(uri.to_owned()))?;

    let mut base = format!("{}://{}", url.scheme(), host.to_ascii_lowercase());
    // `port()` is None when the port is the scheme default
    if let Some(port) = url.port() {
        let _ = write!(base, ":{port}");
    }
    base.push_str(url.path());

    Ok((base, url.query().map(str::to_owned)))
}

/// Collects the inputs of a signature base string.
///
/// Parameters accumulate until [`build`](Self::build) consumes the builder;
/// the resulting [`BaseString`] is immutable.
#[derive(Default)]
pub struct BaseStringBuilder {
    method: Option<String>,
    base_uri: Option<String>,
    parameters: ParameterSet,
    nonce: Option<Box<dyn Supplier>>,
    timestamp: Option<Box<dyn Supplier>>,
}

impl fmt::Debug for BaseStringBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseStringBuilder")
            .field("method", &self.method)
            .field("base_uri", &self.base_uri)
            .field("parameters", &self.parameters)
            .field("nonce_supplier", &self.nonce.is_some())
            .field("timestamp_supplier", &self.timestamp.is_some())
            .finish()
    }
}

impl BaseStringBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method (case-insensitive).
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set the base string URI verbatim.
    #[must_use]
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Set the base string URI from a full request URI.
    ///
    /// The URI is normalized per [`split_request_uri`] and its query pairs
    /// are added as query parameters.
    pub fn uri(mut self, uri: &str) -> Result<Self, SigningError> {
        let (base_uri, query) = split_request_uri(uri)?;
        if let Some(query) = query {
            self.parameters.extend_query(&query)?;
        }
        self.base_uri = Some(base_uri);
        Ok(self)
    }

    /// Add a parameter in the given namespace.
    pub fn param(
        mut self,
        namespace: Namespace,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, SigningError> {
        self.parameters.insert(namespace, key, value)?;
        Ok(self)
    }

    /// Add a query parameter.
    pub fn query_param(
        self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, SigningError> {
        self.param(Namespace::Query, key, value)
    }

    /// Add an entity-body parameter.
    pub fn entity_param(
        self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, SigningError> {
        self.param(Namespace::Entity, key, value)
    }

    /// Add a protocol (`oauth_`) parameter.
    pub fn protocol_param(
        self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, SigningError> {
        self.param(Namespace::Protocol, key, value)
    }

    /// Add the pairs of a form-encoded entity body.
    pub fn form_body(mut self, body: &str) -> Result<Self, SigningError> {
        self.parameters.extend_form(body)?;
        Ok(self)
    }

    /// Parameters collected so far.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Mutable access for incremental population.
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    /// Supply `oauth_nonce` at build time when it is not set explicitly.
    #[must_use]
    pub fn nonce_supplier(mut self, supplier: impl Supplier + 'static) -> Self {
        self.nonce = Some(Box::new(supplier));
        self
    }

    /// Supply `oauth_timestamp` at build time when it is not set explicitly.
    #[must_use]
    pub fn timestamp_supplier(mut self, supplier: impl Supplier + 'static) -> Self {
        self.timestamp = Some(Box::new(supplier));
        self
    }

    /// Freeze the inputs and compute the base string.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::InvalidState`] when the method or base URI is
    /// missing, or when `oauth_nonce`/`oauth_timestamp` is neither set nor
    /// suppliable.
    pub fn build(self) -> Result<BaseString, SigningError> {
        let method = self
            .method
            .ok_or(SigningError::InvalidState("HTTP method"))?
            .to_uppercase();
        let base_uri = self
            .base_uri
            .ok_or(SigningError::InvalidState("base URI"))?;
        let mut parameters = self.parameters;

        fill_from(&mut parameters, OAUTH_NONCE, self.nonce.as_deref())?;
        fill_from(&mut parameters, OAUTH_TIMESTAMP, self.timestamp.as_deref())?;

        let value = signature_base_string(&method, &base_uri, &parameters);
        tracing::debug!(
            %method,
            %base_uri,
            params = parameters.len(),
            "Built signature base string"
        );
        tracing::trace!(base_string = %value);

        Ok(BaseString {
            method,
            base_uri,
            parameters,
            value,
        })
    }
}

/// Insert a supplied protocol value unless the caller already set one.
fn fill_from(
    parameters: &mut ParameterSet,
    key: &'static str,
    supplier: Option<&dyn Supplier>,
) -> Result<(), SigningError> {
    if parameters.contains_key(key) {
        return Ok(());
    }
    let supplier = supplier.ok_or(SigningError::InvalidState(key))?;
    parameters.insert_protocol(key, supplier.supply())?;
    Ok(())
}

/// A computed signature base string together with the inputs it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseString {
    method: String,
    base_uri: String,
    parameters: ParameterSet,
    value: String,
}

impl BaseString {
    /// The base string itself.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Upper-cased HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Base string URI (unencoded).
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Frozen parameter set, including supplied nonce and timestamp.
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Consume and return the base string.
    pub fn into_string(self) -> String {
        self.value
    }
}

impl AsRef<str> for BaseString {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for BaseString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}
