use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use trellis_schema::{home_page, Breakpoint, Page};

pub const DEFAULT_CONFIG_NAME: &str = "trellis.config.json";

/// Trellis configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Seed page to start sessions from; the bundled home page when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,

    /// File holding the session preference blob
    #[serde(default = "default_preferences")]
    pub preferences: String,

    /// Breakpoint used when a command does not name one
    #[serde(default)]
    pub default_breakpoint: Breakpoint,
}

fn default_preferences() -> String {
    ".trellis/editor-state.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn preferences_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.preferences)
    }

    /// Page named on the command line, else the configured seed, else the
    /// bundled home page
    pub fn load_page(&self, cwd: &Path, explicit: Option<&Path>) -> anyhow::Result<Page> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| self.seed.as_ref().map(|seed| cwd.join(seed)));

        match path {
            Some(path) => {
                info!(path = %path.display(), "loading seed page");
                let source = std::fs::read_to_string(&path)?;
                Ok(Page::from_json(&source)?)
            }
            None => Ok(home_page()?),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            preferences: default_preferences(),
            default_breakpoint: Breakpoint::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "seed": "pages/home.page.json",
            "preferences": "state/prefs.json",
            "defaultBreakpoint": "desktop"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.seed.as_deref(), Some("pages/home.page.json"));
        assert_eq!(config.preferences, "state/prefs.json");
        assert_eq!(config.default_breakpoint, Breakpoint::Desktop);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_breakpoint, Breakpoint::Mobile);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());

        let page = config.load_page(dir.path(), None).unwrap();
        assert_eq!(page.page_id, "home");
    }
}
