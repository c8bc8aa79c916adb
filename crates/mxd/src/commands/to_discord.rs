//! `mxd to-discord` command implementation.

use std::path::PathBuf;

use clap::Args;
use mxd_config::CliSettings;
use mxd_matrix::{MatrixMessage, MatrixMessageParser};

use super::{CommonArgs, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the to-discord command.
#[derive(Args)]
pub(crate) struct ToDiscordArgs {
    /// Matrix message content JSON file, or `-` for stdin.
    input: PathBuf,

    /// Sender displayname used for emote messages (overrides config).
    #[arg(long)]
    displayname: Option<String>,

    /// Guess the language of code blocks that do not declare one.
    #[arg(long)]
    detect_language: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ToDiscordArgs {
    /// Execute the to-discord command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, the fixture or the input cannot be
    /// loaded.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            determine_code_language: self.detect_language.then_some(true),
            displayname: self.displayname,
        };
        let config = self.common.load_config(&cli_settings)?;
        let directory = self.common.load_directory()?;
        let message: MatrixMessage = read_json(&self.input)?;

        let parser = MatrixMessageParser::from_config(&config.matrix);
        let text = parser
            .format_message(&message, &config.matrix.displayname, &directory)
            .await;

        Output::new().result(&text)?;
        Ok(())
    }
}
