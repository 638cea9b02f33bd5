//! Session preferences (active breakpoint and tool mode).
//!
//! Stored as a small versioned JSON blob:
//!
//! ```json
//! {"v": 1, "deviceMode": "mobile", "toolMode": "preview"}
//! ```
//!
//! Reading never fails. A missing or unusable blob yields the defaults, and
//! each field falls back on its own when only that field is bad.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;
use trellis_schema::Breakpoint;

use crate::errors::{EditorError, EditorResult};

pub const PREFERENCES_VERSION: u64 = 1;

/// Storage key used by collaborators that keep blobs in a key/value store
pub const PREFERENCES_KEY: &str = "builder.editorState";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    Select,
    #[default]
    Preview,
}

impl ToolMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolMode::Select => "select",
            ToolMode::Preview => "preview",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ToolMode::Select => ToolMode::Preview,
            ToolMode::Preview => ToolMode::Select,
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolMode {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(ToolMode::Select),
            "preview" => Ok(ToolMode::Preview),
            other => Err(EditorError::UnknownToolMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preferences {
    pub device_mode: Breakpoint,
    pub tool_mode: ToolMode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    v: u64,
    device_mode: Breakpoint,
    tool_mode: ToolMode,
}

impl Preferences {
    pub fn from_blob(blob: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(blob) {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "preference blob is not JSON, using defaults");
                return Self::default();
            }
        };

        let version = value.get("v").and_then(serde_json::Value::as_u64);
        if version != Some(PREFERENCES_VERSION) {
            warn!(?version, "unsupported preference blob version, using defaults");
            return Self::default();
        }

        let field = |name: &str| value.get(name).and_then(serde_json::Value::as_str);

        let device_mode = field("deviceMode")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                warn!(value = ?field("deviceMode"), "bad deviceMode in preferences");
                Breakpoint::default()
            });
        let tool_mode = field("toolMode")
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                warn!(value = ?field("toolMode"), "bad toolMode in preferences");
                ToolMode::default()
            });

        Self {
            device_mode,
            tool_mode,
        }
    }

    pub fn to_blob(&self) -> EditorResult<String> {
        let blob = Blob {
            v: PREFERENCES_VERSION,
            device_mode: self.device_mode,
            tool_mode: self.tool_mode,
        };
        Ok(serde_json::to_string(&blob)?)
    }
}

/// Where the preference blob lives between sessions
pub trait PreferenceStorage {
    fn read(&self) -> EditorResult<Option<String>>;
    fn write(&mut self, blob: &str) -> EditorResult<()>;

    /// Load preferences, treating a storage failure like a missing blob
    fn load(&self) -> Preferences {
        match self.read() {
            Ok(Some(blob)) => Preferences::from_blob(&blob),
            Ok(None) => Preferences::default(),
            Err(error) => {
                warn!(%error, "could not read preferences, using defaults");
                Preferences::default()
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blob: Option<String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn read(&self) -> EditorResult<Option<String>> {
        Ok(self.blob.clone())
    }

    fn write(&mut self, blob: &str) -> EditorResult<()> {
        self.blob = Some(blob.to_string());
        Ok(())
    }
}

/// Blob kept in a single file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStorage for FileStorage {
    fn read(&self) -> EditorResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }

    fn write(&mut self, blob: &str) -> EditorResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        std::fs::write(&self.path, blob)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.device_mode, Breakpoint::Mobile);
        assert_eq!(prefs.tool_mode, ToolMode::Preview);
    }

    #[test]
    fn test_blob_round_trip() {
        let prefs = Preferences {
            device_mode: Breakpoint::Desktop,
            tool_mode: ToolMode::Select,
        };
        let blob = prefs.to_blob().unwrap();
        assert_eq!(blob, r#"{"v":1,"deviceMode":"desktop","toolMode":"select"}"#);
        assert_eq!(Preferences::from_blob(&blob), prefs);
    }

    #[test]
    fn test_malformed_blobs_fall_back() {
        assert_eq!(Preferences::from_blob("{not json"), Preferences::default());
        assert_eq!(
            Preferences::from_blob(r#"{"deviceMode":"desktop","toolMode":"select"}"#),
            Preferences::default(),
            "unversioned"
        );
        assert_eq!(
            Preferences::from_blob(r#"{"v":2,"deviceMode":"desktop"}"#),
            Preferences::default()
        );
    }

    #[test]
    fn test_fields_fall_back_individually() {
        let prefs = Preferences::from_blob(r#"{"v":1,"deviceMode":"tablet","toolMode":"select"}"#);
        assert_eq!(prefs.device_mode, Breakpoint::Mobile);
        assert_eq!(prefs.tool_mode, ToolMode::Select);
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("state").join("prefs.json"));
        assert_eq!(storage.read().unwrap(), None);

        storage.write(r#"{"v":1}"#).unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some(r#"{"v":1}"#));

        let storage: Box<dyn PreferenceStorage> = Box::new(storage);
        assert_eq!(storage.load(), Preferences::default());
    }
}
