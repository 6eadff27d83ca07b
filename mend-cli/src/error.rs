//! Error types for the `mend` binary.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Everything that can stop the CLI.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The repair loop or the generator failed.
    #[error(transparent)]
    Mend(#[from] mend::Error),

    /// The configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The context file could not be read.
    #[error("failed to read context file {}: {source}", path.display())]
    ContextFile {
        /// Path given on the command line.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The result could not be rendered.
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Short label for the failure kind, used in the final log line.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Mend(e) => e.kind_label(),
            Self::Config(_) => "configuration",
            Self::ContextFile { .. } => "input",
            Self::Output(_) => "output",
        }
    }
}
