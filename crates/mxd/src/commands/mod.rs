//! CLI command implementations.

pub(crate) mod edit;
pub(crate) mod to_discord;
pub(crate) mod to_matrix;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;
use mxd_config::{CliSettings, Config};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::CliError;
use crate::fixture::FixtureDirectory;
use crate::output::Output;

pub(crate) use edit::EditArgs;
pub(crate) use to_discord::ToDiscordArgs;
pub(crate) use to_matrix::ToMatrixArgs;

/// Path that reads standard input instead of a file.
const STDIN_PATH: &str = "-";

/// Flags shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover mxd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON fixture answering user, channel, emoji and reply lookups.
    #[arg(short, long, env = "MXD_DIRECTORY")]
    directory: Option<PathBuf>,

    /// Enable verbose output (show lookup misses and skipped embeds).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration, applying command-line overrides.
    pub(crate) fn load_config(&self, cli_settings: &CliSettings) -> Result<Config, CliError> {
        let config = Config::load(self.config.as_deref(), Some(cli_settings))?;
        if let Some(path) = &config.config_path {
            info!("Loaded configuration from {}", path.display());
        }
        Ok(config)
    }

    /// Load the lookup fixture, or an empty directory when none is given.
    pub(crate) fn load_directory(&self) -> Result<FixtureDirectory, CliError> {
        if self.directory.is_none() {
            Output::new().warning("No --directory given: mentions and emoji stay unresolved");
        }
        FixtureDirectory::load(self.directory.as_deref())
    }
}

/// Read and deserialize a JSON document from a file or `-` for stdin.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let content = if path == Path::new(STDIN_PATH) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Input {
                path: path.to_path_buf(),
                source,
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::Input {
            path: path.to_path_buf(),
            source,
        })?
    };
    serde_json::from_str(&content).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}
