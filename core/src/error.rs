use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MinionErr>;

/// Failures at the edges of the engine. Message handling itself never fails;
/// unknown references and malformed payloads are logged and ignored instead.
#[derive(Error, Debug)]
pub enum MinionErr {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to parse config file {path}: {source}")]
    ConfigToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A transcript line was not a valid inbound envelope. `line` is 1-based.
    #[error("invalid transcript line {line}: {source}")]
    TranscriptLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not find home directory")]
    HomeDirNotFound,
}
