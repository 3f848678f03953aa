//! Runtime configuration: constants, the optional JSON settings file and the
//! per-run [`Context`] handed to every evaluator.

use crate::error::ConfigError;
use crate::processing::{ErrorPolicy, MembershipMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Longest accepted input line in bytes (1 GiB).
pub const MAX_LINE_LEN: usize = 1 << 30;

/// log4rs configuration picked up from the working directory when present.
pub const LOG_CONFIG_FILE: &str = "log4rs.yml";

pub const DEFAULT_MATCH_MODE: MembershipMode = MembershipMode::Overlap;
pub const DEFAULT_EXCLUDE_MODE: MembershipMode = MembershipMode::Encompass;

/// Settings shared by every command of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Context {
    pub policy: ErrorPolicy,
    pub verbose: bool,
}

impl Context {
    pub fn new(policy: ErrorPolicy, verbose: bool) -> Context {
        Context { policy, verbose }
    }
}

/// Defaults read from a `--config` file. Command-line flags take precedence.
///
/// ```json
/// { "err": "warn", "verbose": true, "match_mode": "encompass", "delimiter": "," }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub err: Option<ErrorPolicy>,
    pub verbose: Option<bool>,
    pub match_mode: Option<MembershipMode>,
    pub exclude_mode: Option<MembershipMode>,
    pub delimiter: Option<String>,
}

impl Settings {
    /// Parse settings from JSON text. Errors name the offending key path.
    pub fn from_json(text: &str) -> Result<Settings, String> {
        let deserializer = &mut serde_json::Deserializer::from_str(text);
        serde_path_to_error::deserialize(deserializer).map_err(|e| {
            let path = e.path().to_string();
            format!("{} (at {})", e.into_inner(), path)
        })
    }
}

/// Load a settings file.
///
/// # Arguments
/// * `path` - JSON file to read
///
/// # Returns
/// The parsed settings, or a [`ConfigError`] naming the file
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = Settings::from_json(&text).map_err(|message| ConfigError::Settings {
        path: path.to_path_buf(),
        message,
    })?;
    log::debug!("Loaded settings from {}: {:?}", path.display(), settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_full() {
        let settings = Settings::from_json(
            r#"{"err": "warn", "verbose": true, "match_mode": "encompass",
                "exclude_mode": "overlap", "delimiter": "\t"}"#,
        )
        .unwrap();
        assert_eq!(settings.err, Some(ErrorPolicy::Warn));
        assert_eq!(settings.verbose, Some(true));
        assert_eq!(settings.match_mode, Some(MembershipMode::Encompass));
        assert_eq!(settings.exclude_mode, Some(MembershipMode::Overlap));
        assert_eq!(settings.delimiter.as_deref(), Some("\t"));
    }

    #[test]
    fn test_settings_empty_object() {
        assert_eq!(Settings::from_json("{}").unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_error_names_path() {
        let err = Settings::from_json(r#"{"match_mode": "cover"}"#).unwrap_err();
        assert!(err.contains("match_mode"), "{err}");
        assert!(Settings::from_json(r#"{"colour": true}"#).is_err());
    }

    #[test]
    fn test_load_settings_missing_file() {
        let path = Path::new("does/not/exist.json");
        assert!(matches!(load_settings(path), Err(ConfigError::MissingFile(_))));
    }

    #[test]
    fn test_defaults() {
        let ctx = Context::default();
        assert_eq!(ctx.policy, ErrorPolicy::Abort);
        assert!(!ctx.verbose);
        assert_eq!(DEFAULT_MATCH_MODE, MembershipMode::Overlap);
        assert_eq!(DEFAULT_EXCLUDE_MODE, MembershipMode::Encompass);
    }
}
