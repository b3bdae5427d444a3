//! `tango.toml` configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tango_core::{Level, Mode};

/// Top-level tango configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TangoConfig {
    /// Word feed (CSV with a header row).
    #[serde(default = "default_words")]
    pub words: PathBuf,
    /// Kanji feed (JSON keyed by glyph).
    #[serde(default = "default_kanji")]
    pub kanji: PathBuf,
    /// Directory holding burn, overlay, forbid and result files.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Default JLPT level.
    #[serde(default = "default_level")]
    pub level: u8,
    /// Default mode: words, kanji or both.
    #[serde(default = "default_mode")]
    pub mode: Mode,
}

fn default_words() -> PathBuf {
    PathBuf::from("all_hiragana.csv")
}
fn default_kanji() -> PathBuf {
    PathBuf::from("kanji.json")
}
fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_level() -> u8 {
    5
}
fn default_mode() -> Mode {
    Mode::Both
}

impl Default for TangoConfig {
    fn default() -> Self {
        Self {
            words: default_words(),
            kanji: default_kanji(),
            state_dir: default_state_dir(),
            level: default_level(),
            mode: default_mode(),
        }
    }
}

impl TangoConfig {
    pub fn level(&self) -> Result<Level> {
        self.level
            .to_string()
            .parse::<Level>()
            .map_err(|e| anyhow::anyhow!("{e}"))
    }

    /// Kanji feed path if the file exists. The kanji feed is optional for
    /// word-only drills.
    pub fn kanji_if_present(&self) -> Option<&Path> {
        self.kanji.exists().then_some(self.kanji.as_path())
    }
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `tango.toml` in the current directory
/// 2. `~/.config/tango/config.toml`
///
/// Environment variable overrides: `TANGO_STATE_DIR`, `TANGO_LEVEL`.
pub fn load_config_from(path: Option<&Path>) -> Result<TangoConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tango.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<TangoConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => TangoConfig::default(),
    };

    if let Ok(dir) = std::env::var("TANGO_STATE_DIR") {
        config.state_dir = PathBuf::from(dir);
    }
    if let Ok(level) = std::env::var("TANGO_LEVEL") {
        config.level = level
            .trim()
            .parse()
            .with_context(|| format!("invalid TANGO_LEVEL: '{level}'"))?;
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tango"))
}
