//! `mxd to-matrix` command implementation.

use std::path::PathBuf;

use clap::Args;
use mxd_config::CliSettings;
use mxd_discord::{DiscordMessage, DiscordMessageParser};

use super::{CommonArgs, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the to-matrix command.
#[derive(Args)]
pub(crate) struct ToMatrixArgs {
    /// Chat message JSON file, or `-` for stdin.
    input: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToMatrixArgs {
    /// Execute the to-matrix command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, the fixture or the input cannot be
    /// loaded.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let config = self.common.load_config(&CliSettings::default())?;
        let directory = self.common.load_directory()?;
        let message: DiscordMessage = read_json(&self.input)?;

        let parser = DiscordMessageParser::new()
            .with_edit_inline_max_length(config.discord.edit_inline_max_length);
        let result = parser.format_message(&message, &directory).await;

        Output::new().result(&serde_json::to_string_pretty(&result)?)?;
        Ok(())
    }
}
