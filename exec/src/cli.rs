use clap::Parser;
use clap::ValueEnum;
use std::path::PathBuf;

/// Replays an NDJSON transcript of agent-protocol messages through the
/// tool-call engine.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// Print events to stdout as JSONL.
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,

    /// Session id for messages that do not name one. A random id is used
    /// when omitted.
    #[arg(long = "session", value_name = "ID")]
    pub session_id: Option<String>,

    /// Read configuration from FILE instead of `$MINION_HOME/config.toml`.
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Message shown for tool calls whose session terminated under them.
    #[arg(long = "orphaned-message", value_name = "TEXT")]
    pub orphaned_message: Option<String>,

    /// Specifies color settings for use in the output.
    #[arg(long = "color", value_enum, default_value_t = Color::Auto)]
    pub color: Color,

    /// Transcript to replay. If not provided or `-`, it is read from stdin.
    #[arg(value_name = "TRANSCRIPT")]
    pub transcript: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Color {
    Always,
    Never,
    #[default]
    Auto,
}
