// Debugger settings
// Loaded from ~/.config/luadbg/settings.json

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Log verbosity for the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ORDER: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }

    /// Raise verbosity by `steps` (one per `-v`), saturating at trace.
    pub fn raised(self, steps: u8) -> Self {
        let index = Self::ORDER.iter().position(|l| *l == self).unwrap_or(2);
        let raised = (index + steps as usize).min(Self::ORDER.len() - 1);
        Self::ORDER[raised]
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    Serialize(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io { path, source } => {
                write!(f, "cannot access {}: {}", path.display(), source)
            }
            SettingsError::Parse { path, source } => {
                write!(f, "invalid settings in {}: {}", path.display(), source)
            }
            SettingsError::Serialize(e) => write!(f, "cannot serialize settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Prompt
    #[serde(rename = "prompt.text")]
    pub prompt_text: String,

    #[serde(rename = "prompt.color")]
    pub prompt_color: bool,

    // Breakpoint paths (None = platform default)
    #[serde(rename = "paths.caseInsensitive", skip_serializing_if = "Option::is_none")]
    pub case_insensitive_paths: Option<bool>,

    // Inspection
    #[serde(rename = "watch.defaultDepth")]
    pub watch_default_depth: u32,

    // Logging
    #[serde(rename = "log.level")]
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt_text: "?>".to_string(),
            prompt_color: true,
            case_insensitive_paths: None,
            watch_default_depth: 0,
            log_level: LogLevel::Warn,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("luadbg")
            .join("settings.json")
    }

    /// Load from the default location. A missing file means defaults.
    pub fn load() -> Result<Self, SettingsError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // Strip comments (lines starting with //)
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to an explicit file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(SettingsError::Serialize)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Case folding for breakpoint paths, honoring the override.
    pub fn case_insensitive_paths(&self) -> bool {
        self.case_insensitive_paths
            .unwrap_or(cfg!(any(windows, target_os = "macos")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.prompt_text, "?>");
        assert!(settings.prompt_color);
        assert_eq!(settings.watch_default_depth, 0);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
    // prompt shown while paused
    "prompt.text": "dbg>",
    "watch.defaultDepth": 2
}"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.prompt_text, "dbg>");
        assert_eq!(settings.watch_default_depth, 2);
        assert!(settings.prompt_color);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_case_override() {
        let settings: Settings =
            serde_json::from_str(r#"{ "paths.caseInsensitive": true }"#).unwrap();
        assert!(settings.case_insensitive_paths());

        let settings: Settings =
            serde_json::from_str(r#"{ "paths.caseInsensitive": false }"#).unwrap();
        assert!(!settings.case_insensitive_paths());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ \"prompt.text\": 5 }").unwrap();

        match Settings::load_from(&path) {
            Err(SettingsError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Settings::load_from(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(SettingsError::Io { .. })));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            prompt_text: ">>".to_string(),
            prompt_color: false,
            case_insensitive_paths: Some(true),
            watch_default_depth: 3,
            log_level: LogLevel::Debug,
        };
        settings.save_to(&path).unwrap();

        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_log_level_raised() {
        assert_eq!(LogLevel::Warn.raised(0), LogLevel::Warn);
        assert_eq!(LogLevel::Warn.raised(1), LogLevel::Info);
        assert_eq!(LogLevel::Warn.raised(2), LogLevel::Debug);
        assert_eq!(LogLevel::Warn.raised(9), LogLevel::Trace);
        assert_eq!(LogLevel::Off.raised(1), LogLevel::Error);
        assert_eq!(LogLevel::Info.filter(), log::LevelFilter::Info);
    }
}
