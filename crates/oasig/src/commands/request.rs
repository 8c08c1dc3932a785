//! Request description shared by the commands.

use clap::Args;
use oasig_core::{BaseStringBuilder, Fixed, RandomNonce, SigningError, UnixTimestamp};

/// Arguments describing the HTTP request to sign.
#[derive(Args, Debug)]
pub(crate) struct RequestArgs {
    /// HTTP request method.
    #[arg(short = 'X', long, default_value = "GET")]
    pub(crate) method: String,

    /// Absolute request URI; its query component is signed as query parameters.
    #[arg(short, long)]
    pub(crate) uri: String,

    /// Additional query parameter (repeatable).
    #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub(crate) query: Vec<(String, String)>,

    /// Form-encoded entity-body parameter (repeatable).
    #[arg(long = "body", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub(crate) body: Vec<(String, String)>,

    /// Protocol parameter with an `oauth_` prefix (repeatable).
    #[arg(long = "oauth", value_name = "KEY=VALUE", value_parser = parse_pair)]
    pub(crate) oauth: Vec<(String, String)>,

    /// Fixed nonce (default: random).
    #[arg(long)]
    pub(crate) nonce: Option<String>,

    /// Fixed timestamp (default: current time).
    #[arg(long)]
    pub(crate) timestamp: Option<String>,
}

impl RequestArgs {
    /// Base string builder for the described request.
    pub(crate) fn builder(&self) -> Result<BaseStringBuilder, SigningError> {
        let mut builder = BaseStringBuilder::new()
            .method(self.method.as_str())
            .uri(&self.uri)?;
        for (key, value) in &self.query {
            builder = builder.query_param(key.as_str(), value.as_str())?;
        }
        for (key, value) in &self.body {
            builder = builder.entity_param(key.as_str(), value.as_str())?;
        }
        for (key, value) in &self.oauth {
            builder = builder.protocol_param(key.as_str(), value.as_str())?;
        }

        builder = match &self.nonce {
            Some(nonce) => builder.nonce_supplier(Fixed::new(nonce.as_str())),
            None => builder.nonce_supplier(RandomNonce),
        };
        builder = match &self.timestamp {
            Some(timestamp) => builder.timestamp_supplier(Fixed::new(timestamp.as_str())),
            None => builder.timestamp_supplier(UnixTimestamp),
        };
        Ok(builder)
    }
}

/// Parse a `KEY=VALUE` argument. The value may be empty or contain `=`.
fn parse_pair(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {arg:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {arg:?}"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
