use std::path::Path;
use std::path::PathBuf;

use dirs::home_dir;
use serde::Deserialize;

use crate::error::MinionErr;
use crate::error::Result;
use crate::summary::SummaryLimits;

/// Message attached to tool calls whose session ended before they finished.
pub const DEFAULT_ORPHANED_MESSAGE: &str = "Session was terminated";

/// Default `EnvFilter` directive for binaries when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "error";

const CONFIG_TOML_FILE: &str = "config.toml";

/// Engine configuration after merging `config.toml` with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub orphaned_message: String,
    pub summary: SummaryLimits,
    pub log_level: String,
    /// Directory the config was resolved from (`~/.minion` by default).
    pub minion_home: PathBuf,
}

/// Raw shape of `config.toml`. Every field is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ConfigToml {
    pub orphaned_message: Option<String>,
    pub log_level: Option<String>,
    #[serde(default)]
    pub summary: SummaryToml,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SummaryToml {
    pub single_value_max_chars: Option<usize>,
    pub multi_value_max_chars: Option<usize>,
    pub max_listed_params: Option<usize>,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub orphaned_message: Option<String>,
    pub log_level: Option<String>,
    /// Read this file instead of `<minion_home>/config.toml`.
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Loads `config.toml` from the minion home (or `overrides.config_file`)
    /// and applies `overrides` on top. A missing file yields defaults.
    pub fn load_with_overrides(overrides: ConfigOverrides) -> Result<Self> {
        let minion_home = find_minion_home()?;
        let config_path = overrides
            .config_file
            .clone()
            .unwrap_or_else(|| minion_home.join(CONFIG_TOML_FILE));
        let cfg = load_config_as_toml(&config_path)?;
        Ok(Self::load_from_base_config_with_overrides(
            cfg,
            overrides,
            minion_home,
        ))
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        minion_home: PathBuf,
    ) -> Self {
        let ConfigOverrides {
            orphaned_message,
            log_level,
            config_file: _,
        } = overrides;

        let defaults = SummaryLimits::default();
        let summary = SummaryLimits {
            single_value_max_chars: cfg
                .summary
                .single_value_max_chars
                .unwrap_or(defaults.single_value_max_chars),
            multi_value_max_chars: cfg
                .summary
                .multi_value_max_chars
                .unwrap_or(defaults.multi_value_max_chars),
            max_listed_params: cfg
                .summary
                .max_listed_params
                .unwrap_or(defaults.max_listed_params),
        };

        Self {
            orphaned_message: orphaned_message
                .or(cfg.orphaned_message)
                .unwrap_or_else(|| DEFAULT_ORPHANED_MESSAGE.to_string()),
            summary,
            log_level: log_level
                .or(cfg.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            minion_home,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orphaned_message: DEFAULT_ORPHANED_MESSAGE.to_string(),
            summary: SummaryLimits::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            minion_home: PathBuf::new(),
        }
    }
}

fn load_config_as_toml(path: &Path) -> Result<ConfigToml> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(|source| MinionErr::ConfigToml {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("{} not found, using defaults", path.display());
            Ok(ConfigToml::default())
        }
        Err(e) => {
            tracing::error!("Failed to read config.toml: {e}");
            Err(e.into())
        }
    }
}

/// Returns the minion home directory: `$MINION_HOME` when set and non-empty,
/// otherwise `~/.minion`. Does not verify that the directory exists.
pub fn find_minion_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("MINION_HOME")
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }

    let mut p = home_dir().ok_or(MinionErr::HomeDirNotFound)?;
    p.push(".minion");
    Ok(p)
}
