//! `mxd edit` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mxd_config::CliSettings;
use mxd_discord::{DiscordMessage, DiscordMessageParser};

use super::{CommonArgs, STDIN_PATH, read_json};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the edit command.
#[derive(Args)]
pub(crate) struct EditArgs {
    /// Previous version of the message (JSON file, or `-` for stdin).
    old: PathBuf,

    /// New version of the message (JSON file, or `-` for stdin).
    new: PathBuf,

    /// Link to the original Matrix event, wrapped around the "edit:" label.
    #[arg(short, long)]
    link: Option<String>,

    /// Single-line edits longer than this use the stacked layout (overrides config).
    #[arg(long)]
    inline_max_length: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl EditArgs {
    /// Execute the edit command.
    ///
    /// # Errors
    ///
    /// Returns an error if both versions are read from stdin, or if
    /// configuration, the fixture or an input cannot be loaded.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let stdin = Path::new(STDIN_PATH);
        if self.old.as_path() == stdin && self.new.as_path() == stdin {
            return Err(CliError::Validation(
                "Only one of OLD and NEW can be read from stdin".to_owned(),
            ));
        }
        if self.inline_max_length == Some(0) {
            return Err(CliError::Validation(
                "--inline-max-length must be greater than 0".to_owned(),
            ));
        }

        let config = self.common.load_config(&CliSettings::default())?;
        let directory = self.common.load_directory()?;
        let old: DiscordMessage = read_json(&self.old)?;
        let new: DiscordMessage = read_json(&self.new)?;

        let max_length = self
            .inline_max_length
            .unwrap_or(config.discord.edit_inline_max_length);
        let parser = DiscordMessageParser::new().with_edit_inline_max_length(max_length);
        let result = parser
            .format_edit(&old, &new, self.link.as_deref(), &directory)
            .await;

        Output::new().result(&serde_json::to_string_pretty(&result)?)?;
        Ok(())
    }
}
