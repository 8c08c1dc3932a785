//! Configuration management for oasig.
//!
//! Parses `oasig.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Every field of `[credentials]` and `[signing]` is expanded.

mod expand;

use std::path::{Path, PathBuf};

use oasig_core::{
    OAuthParams, RsaKeyError, SignatureMethod, SignatureMethodKind, SigningError,
    load_private_key_from_file,
};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "oasig.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override consumer key.
    pub consumer_key: Option<String>,
    /// Override consumer secret.
    pub consumer_secret: Option<String>,
    /// Override token.
    pub token: Option<String>,
    /// Override token secret.
    pub token_secret: Option<String>,
    /// Override private key path (relative to the working directory).
    pub private_key: Option<PathBuf>,
    /// Override signature method.
    pub method: Option<SignatureMethodKind>,
    /// Override realm.
    pub realm: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client and token credentials.
    pub credentials: CredentialsConfig,
    /// Signing options.
    pub signing: SigningConfig,

    /// Resolved private key path (set after loading).
    #[serde(skip)]
    pub private_key_path: Option<PathBuf>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Client and token credentials.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// OAuth consumer key.
    pub consumer_key: String,
    /// Consumer secret, required by HMAC-SHA1 and PLAINTEXT.
    pub consumer_secret: Option<String>,
    /// Token identifier.
    pub token: Option<String>,
    /// Token secret.
    pub token_secret: Option<String>,
    /// PEM private key path as written in the file.
    private_key: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("consumer_key", &self.consumer_key)
            .field(
                "consumer_secret",
                &self.consumer_secret.as_ref().map(|_| "***"),
            )
            .field("token", &self.token)
            .field("token_secret", &self.token_secret.as_ref().map(|_| "***"))
            .field("private_key", &self.private_key)
            .finish()
    }
}

/// Signing options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Signature method name (`PLAINTEXT`, `HMAC-SHA1` or `RSA-SHA1`).
    pub method: String,
    /// Realm for the Authorization header.
    pub realm: Option<String>,
    /// Whether to send `oauth_version="1.0"`.
    pub include_version: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            method: SignatureMethodKind::HmacSha1.name().to_owned(),
            realm: None,
            include_version: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`credentials.token_secret`").
        field: String,
        /// Error message (e.g., "${`OASIG_TOKEN_SECRET`} not set").
        message: String,
    },
    /// Private key could not be loaded.
    #[error("Failed to load private key {}: {source}", .path.display())]
    Key {
        /// Resolved key path.
        path: PathBuf,
        /// Underlying error.
        source: RsaKeyError,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `oasig.toml` in current directory and parents,
    /// falling back to defaults when none exists.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let credentials = &mut self.credentials;
        if let Some(consumer_key) = &settings.consumer_key {
            credentials.consumer_key.clone_from(consumer_key);
        }
        if let Some(consumer_secret) = &settings.consumer_secret {
            credentials.consumer_secret = Some(consumer_secret.clone());
        }
        if let Some(token) = &settings.token {
            credentials.token = Some(token.clone());
        }
        if let Some(token_secret) = &settings.token_secret {
            credentials.token_secret = Some(token_secret.clone());
        }
        if let Some(private_key) = &settings.private_key {
            self.private_key_path = Some(private_key.clone());
        }
        if let Some(method) = settings.method {
            self.signing.method = method.name().to_owned();
        }
        if let Some(realm) = &settings.realm {
            self.signing.realm = Some(realm.clone());
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "Loading configuration");
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let credentials = &mut self.credentials;
        credentials.consumer_key =
            expand::expand_env(&credentials.consumer_key, "credentials.consumer_key")?;
        expand::expand_env_opt(
            &mut credentials.consumer_secret,
            "credentials.consumer_secret",
        )?;
        expand::expand_env_opt(&mut credentials.token, "credentials.token")?;
        expand::expand_env_opt(&mut credentials.token_secret, "credentials.token_secret")?;
        expand::expand_env_opt(&mut credentials.private_key, "credentials.private_key")?;

        self.signing.method = expand::expand_env(&self.signing.method, "signing.method")?;
        expand::expand_env_opt(&mut self.signing.realm, "signing.realm")?;

        Ok(())
    }

    /// Resolve the private key path against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.private_key_path = self
            .credentials
            .private_key
            .as_deref()
            .map(|key| config_dir.join(key));
    }

    /// Validate configuration values.
    ///
    /// Checks that the signature method is known and that the credentials it
    /// needs are present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.signature_kind()? {
            SignatureMethodKind::RsaSha1 => {
                if self.private_key_path.is_none() {
                    return Err(ConfigError::Validation(
                        "credentials.private_key is required for RSA-SHA1".to_owned(),
                    ));
                }
            }
            kind @ (SignatureMethodKind::Plaintext | SignatureMethodKind::HmacSha1) => {
                if self.credentials.consumer_secret.is_none() {
                    return Err(ConfigError::Validation(format!(
                        "credentials.consumer_secret is required for {kind}"
                    )));
                }
            }
        }
        if let Some(realm) = &self.signing.realm {
            require_non_empty(realm, "signing.realm")?;
        }
        Ok(())
    }

    /// Parsed signature method.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` for an unknown method name.
    pub fn signature_kind(&self) -> Result<SignatureMethodKind, ConfigError> {
        self.signing
            .method
            .parse()
            .map_err(|e: SigningError| ConfigError::Validation(format!("signing.method: {e}")))
    }

    /// Build the configured signature method, loading the private key for
    /// RSA-SHA1.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when required credentials are missing
    /// and `ConfigError::Key` when the private key cannot be loaded.
    pub fn signature_method(&self) -> Result<SignatureMethod, ConfigError> {
        self.validate()?;
        let credentials = &self.credentials;
        let consumer_secret = credentials.consumer_secret.clone().unwrap_or_default();
        let token_secret = credentials.token_secret.clone().unwrap_or_default();

        Ok(match self.signature_kind()? {
            SignatureMethodKind::Plaintext => {
                SignatureMethod::plaintext(consumer_secret, token_secret)
            }
            SignatureMethodKind::HmacSha1 => {
                SignatureMethod::hmac_sha1(consumer_secret, token_secret)
            }
            SignatureMethodKind::RsaSha1 => {
                let path = self.private_key_path.clone().ok_or_else(|| {
                    ConfigError::Validation(
                        "credentials.private_key is required for RSA-SHA1".to_owned(),
                    )
                })?;
                let key = load_private_key_from_file(&path)
                    .map_err(|source| ConfigError::Key { path, source })?;
                SignatureMethod::rsa_sha1(key)
            }
        })
    }

    /// Standard protocol parameters for the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the consumer key is empty.
    pub fn oauth_params(&self) -> Result<OAuthParams, ConfigError> {
        require_non_empty(&self.credentials.consumer_key, "credentials.consumer_key")?;
        Ok(OAuthParams {
            consumer_key: self.credentials.consumer_key.clone(),
            token: self.credentials.token.clone(),
            include_version: self.signing.include_version,
            ..OAuthParams::default()
        })
    }
}
