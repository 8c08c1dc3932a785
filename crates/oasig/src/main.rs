//! oasig CLI - OAuth 1.0 request signing.
//!
//! Provides commands for:
//! - `base-string`: Print the signature base string of a request
//! - `sign`: Sign a request and print its protocol parameters

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BaseStringArgs, SignArgs};
use output::Output;

/// oasig - OAuth 1.0 (RFC 5849) request signing.
#[derive(Parser)]
#[command(name = "oasig", version, about)]
struct Cli {
    /// Enable debug logging and print the base string when signing.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the signature base string of a request.
    BaseString(BaseStringArgs),
    /// Sign a request and print the protocol parameters.
    Sign(SignArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::BaseString(args) => args.execute(&output),
        Commands::Sign(args) => args.execute(&output, cli.verbose),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
