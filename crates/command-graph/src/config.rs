//! On-disk configuration, loaded with defaults when absent (§4.10).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// The environment variable consulted before falling back to the XDG-style
/// default path.
pub const CONFIG_PATH_ENV: &str = "COMMAND_GRAPH_CONFIG";

fn default_crud_letters() -> ShortcutLetters {
    ShortcutLetters::default()
}

fn default_file_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_debug() -> bool {
    false
}

/// The CRUD letters a [`crate::shortcut::ShortcutNode`] dispatches on, remappable
/// per host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutLetters {
    pub add: String,
    pub delete: String,
    pub get: String,
    pub list: String,
    pub search: String,
}

impl Default for ShortcutLetters {
    fn default() -> Self {
        ShortcutLetters {
            add: "a".to_string(),
            delete: "d".to_string(),
            get: "g".to_string(),
            list: "l".to_string(),
            search: "s".to_string(),
        }
    }
}

/// Host-configurable knobs not baked into the node graph itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shortcut CRUD dispatch letters.
    #[serde(default = "default_crud_letters")]
    pub shortcut_letters: ShortcutLetters,
    /// Default base directory a [`crate::file_completer::FileCompleter`] resolves
    /// relative paths against when a host doesn't override it per-argument.
    #[serde(default = "default_file_base_dir")]
    pub file_completer_base_dir: PathBuf,
    /// Whether debug-level logging is on, absent an explicit `LEEP_FROG_DEBUG`
    /// override (§6).
    #[serde(default = "default_debug")]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shortcut_letters: ShortcutLetters::default(),
            file_completer_base_dir: default_file_base_dir(),
            debug: default_debug(),
        }
    }
}

impl Config {
    /// Parse `content` as TOML. Malformed content is a [`CommandError::Config`].
    pub fn from_str(content: &str) -> Result<Self, CommandError> {
        toml::from_str(content).map_err(|err| CommandError::Config(err.to_string()))
    }

    /// Read and parse the config file at `path`. Malformed content is an error;
    /// a missing file is not — it yields [`Config::default`].
    pub fn from_file(path: &Path) -> Result<Self, CommandError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Config::from_str(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(CommandError::Config(err.to_string())),
        }
    }

    /// Load from `COMMAND_GRAPH_CONFIG` if set, else `$XDG_CONFIG_HOME/command-graph/config.toml`
    /// (falling back to `~/.config/command-graph/config.toml`), treating "not found" as
    /// defaults either way.
    pub fn load(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, CommandError> {
        if let Some(path) = env(CONFIG_PATH_ENV) {
            return Config::from_file(Path::new(&path));
        }
        let base = env("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env("HOME").map(|home| PathBuf::from(home).join(".config")));
        match base {
            Some(base) => Config::from_file(&base.join("command-graph").join("config.toml")),
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults_without_erroring() {
        let config = Config::from_file(Path::new("/nonexistent/command-graph/config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_content_is_a_config_error() {
        let err = Config::from_str("not = [valid toml").unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
    }

    #[test]
    fn partial_toml_fills_remaining_fields_with_defaults() {
        let config = Config::from_str("debug = true\n").unwrap();
        assert!(config.debug);
        assert_eq!(config.shortcut_letters, ShortcutLetters::default());
    }

    #[test]
    fn remapped_shortcut_letters_round_trip() {
        let toml = "[shortcut_letters]\nadd = \"add\"\ndelete = \"rm\"\nget = \"g\"\nlist = \"l\"\nsearch = \"s\"\n";
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.shortcut_letters.add, "add");
        assert_eq!(config.shortcut_letters.delete, "rm");
    }

    #[test]
    fn load_prefers_explicit_env_var_over_xdg_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "debug = true\n").unwrap();
        let path_str = path.to_string_lossy().into_owned();
        let config = Config::load(&|key: &str| {
            if key == CONFIG_PATH_ENV { Some(path_str.clone()) } else { None }
        })
        .unwrap();
        assert!(config.debug);
    }
}
