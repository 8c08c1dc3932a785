//! `oasig sign` command implementation.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use oasig_config::{CliSettings, Config};
use oasig_core::{RequestSigner, SignatureMethodKind, SignedRequest, SigningError};

use super::request::RequestArgs;
use crate::error::CliError;
use crate::output::Output;

/// Representation of the signed protocol parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    /// `Authorization` header value.
    #[default]
    Header,
    /// Form-encoded entity body.
    Body,
    /// URI query component.
    Query,
}

/// Arguments for the sign command.
#[derive(Args)]
pub(crate) struct SignArgs {
    #[command(flatten)]
    request: RequestArgs,

    /// Signature method (overrides config).
    #[arg(short = 'm', long, value_parser = parse_method)]
    signature_method: Option<SignatureMethodKind>,

    /// Consumer key (overrides config).
    #[arg(long, env = "OASIG_CONSUMER_KEY")]
    consumer_key: Option<String>,

    /// Consumer secret (overrides config).
    #[arg(long, env = "OASIG_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: Option<String>,

    /// Token identifier (overrides config).
    #[arg(long, env = "OASIG_TOKEN")]
    token: Option<String>,

    /// Token secret (overrides config).
    #[arg(long, env = "OASIG_TOKEN_SECRET", hide_env_values = true)]
    token_secret: Option<String>,

    /// Path to the RSA private key for RSA-SHA1 (overrides config).
    #[arg(short = 'k', long)]
    private_key: Option<PathBuf>,

    /// Realm for the Authorization header (overrides config).
    #[arg(long)]
    realm: Option<String>,

    /// Output representation.
    #[arg(short, long, value_enum, default_value_t = Format::Header)]
    format: Format,

    /// Path to configuration file (default: auto-discover oasig.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SignArgs {
    /// Execute the sign command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or signing fails.
    pub(crate) fn execute(self, output: &Output, verbose: bool) -> Result<(), CliError> {
        let signed = self.sign()?;

        if verbose {
            output.highlight("Signature base string:");
            output.info(signed.base_string().as_str());
        }
        output.result(&render(&signed, self.format));
        Ok(())
    }

    /// Load configuration, build the request and sign it.
    fn sign(&self) -> Result<SignedRequest, CliError> {
        let cli_settings = CliSettings {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            token: self.token.clone(),
            token_secret: self.token_secret.clone(),
            private_key: self.private_key.clone(),
            method: self.signature_method,
            realm: self.realm.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        tracing::debug!(
            config = ?config.config_path,
            method = %config.signing.method,
            "Resolved signing configuration"
        );

        let mut builder = self.request.builder()?;
        config.oauth_params()?.apply(builder.parameters_mut())?;

        let mut signer = RequestSigner::new(builder).signature_method(config.signature_method()?);
        if let Some(realm) = &config.signing.realm {
            signer = signer.realm(realm.as_str());
        }
        Ok(signer.sign()?)
    }
}

/// Serialize the signed parameters in the requested representation.
fn render(signed: &SignedRequest, format: Format) -> String {
    match format {
        Format::Header => signed.authorization_header(),
        Format::Body => signed.form_body(),
        Format::Query => signed.query_string(),
    }
}

fn parse_method(arg: &str) -> Result<SignatureMethodKind, String> {
    arg.parse().map_err(|e: SigningError| e.to_string())
}
