//! Configuration for the catalog engine
//!
//! Looked up as `./catalog.toml`, then `<config dir>/comic-catalog/config.toml`.

use crate::{CasingTable, ReferenceScope, TitleFormatter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "catalog.toml";
const APP_DIR: &str = "comic-catalog";
const USER_CONFIG_FILE: &str = "config.toml";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog root holding one directory per period
    pub data_dir: PathBuf,

    /// Spaces of indentation when writing JSON
    pub indent: usize,

    /// Store file names
    pub files: FileNames,

    /// Cross-reference checks
    pub validate: ValidateConfig,

    /// Title formatting
    pub titles: TitlesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            indent: 4,
            files: FileNames::default(),
            validate: ValidateConfig::default(),
            titles: TitlesConfig::default(),
        }
    }
}

/// File names of each store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub issues: String,
    pub events: String,
    pub editions: String,
    pub writers: String,
    pub pencillers: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            issues: "issues.json".to_string(),
            events: "events.json".to_string(),
            editions: "french_editions.json".to_string(),
            writers: "writers.json".to_string(),
            pencillers: "pencillers.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Where event references must resolve
    pub scope: ReferenceScope,

    /// Also report edition issue ids unknown to the whole catalog
    pub check_editions: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            scope: ReferenceScope::Period,
            check_editions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TitlesConfig {
    /// Extra canonical spellings, merged over the builtin table
    pub casing: BTreeMap<String, String>,
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
        if config.indent > 16 {
            return Err(crate::Error::Config(format!(
                "indent must be at most 16, got {}",
                config.indent
            )));
        }
        Ok(config)
    }

    /// Resolve the config to use and where it came from
    ///
    /// An explicit path must exist; otherwise the first existing candidate
    /// wins and defaults apply when there is none.
    pub fn discover(explicit: Option<&Path>) -> crate::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(crate::Error::MissingFile(path.to_path_buf()));
            }
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        for candidate in Self::candidates() {
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "using config");
                return Ok((Self::load(&candidate)?, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_DIR).join(USER_CONFIG_FILE));
        }
        paths
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Title formatter carrying the builtin casings plus configured ones
    pub fn title_formatter(&self) -> TitleFormatter {
        TitleFormatter::new(CasingTable::builtin().with_overrides(&self.titles.casing))
    }

    /// Generate a default config file with comments
    pub fn default_with_comments() -> String {
        r#"# comic catalog configuration

# Catalog root: one directory per period, plus the creator registries
data_dir = "data"

# Spaces of indentation used when writing JSON stores
indent = 4

[files]
issues = "issues.json"
events = "events.json"
editions = "french_editions.json"
writers = "writers.json"
pencillers = "pencillers.json"

[validate]
# Where event issue ids must resolve: "period" or "catalog"
scope = "period"

# Report edition issue ids that exist in no period
check_editions = true

[titles.casing]
# Extra canonical spellings used when formatting issue ids, matched case-insensitively
# "moon knight" = "Moon Knight"
"#
        .to_string()
    }
}
