//! `oasig base-string` command implementation.

use clap::Args;

use super::request::RequestArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the base-string command.
#[derive(Args)]
pub(crate) struct BaseStringArgs {
    #[command(flatten)]
    request: RequestArgs,
}

impl BaseStringArgs {
    /// Execute the base-string command.
    ///
    /// # Errors
    ///
    /// Returns an error if the request description is invalid.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let base_string = self.request.builder()?.build()?;
        output.result(base_string.as_str());
        Ok(())
    }
}
