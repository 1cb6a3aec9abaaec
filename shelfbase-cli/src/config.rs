// Configuration: defaults <- optional TOML file <- command-line flags

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use shelfbase_core::{BookLinking, LogLevel, SeedOptions};

/// Env var naming the config file when `--config` is not given
pub const CONFIG_ENV: &str = "SHELFBASE_CONFIG";

pub const DEFAULT_DB_PATH: &str = "library.shelf";

/// Contents of the optional config file. Every key may be omitted.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub reset: Option<bool>,
    pub resolve_by_title: Option<bool>,
}

/// Effective settings after merging
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    pub reset: bool,
    pub resolve_by_title: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: LogLevel::default(),
            reset: true,
            resolve_by_title: false,
        }
    }
}

/// Overrides taken from the command line
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<LogLevel>,
    pub keep_existing: bool,
    pub resolve_by_title: bool,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}

impl Config {
    /// Resolve the config file (explicit path, then `SHELFBASE_CONFIG`) and
    /// merge it with the flags
    pub fn resolve(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let file = match config_path.map(Path::to_path_buf).or(from_env) {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(file, overrides))
    }

    pub fn merge(file: FileConfig, overrides: Overrides) -> Self {
        let defaults = Config::default();
        Config {
            db_path: overrides
                .db_path
                .or(file.db_path)
                .unwrap_or(defaults.db_path),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            reset: !overrides.keep_existing && file.reset.unwrap_or(defaults.reset),
            resolve_by_title: overrides.resolve_by_title
                || file.resolve_by_title.unwrap_or(defaults.resolve_by_title),
        }
    }

    pub fn seed_options(&self) -> SeedOptions {
        SeedOptions {
            reset: self.reset,
            linking: if self.resolve_by_title {
                BookLinking::ResolveByTitle
            } else {
                BookLinking::Carried
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::merge(FileConfig::default(), Overrides::default());
        assert_eq!(config, Config::default());
        assert_eq!(config.seed_options(), SeedOptions::default());
    }

    #[test]
    fn test_file_values_apply() {
        let file: FileConfig = toml::from_str(
            r#"
            db_path = "/var/lib/shelfbase/library.shelf"
            log_level = "debug"
            reset = false
            resolve_by_title = true
            "#,
        )
        .unwrap();

        let config = Config::merge(file, Overrides::default());
        assert_eq!(config.db_path, PathBuf::from("/var/lib/shelfbase/library.shelf"));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.seed_options(),
            SeedOptions {
                reset: false,
                linking: BookLinking::ResolveByTitle
            }
        );
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            db_path: Some(PathBuf::from("from-file.shelf")),
            log_level: Some(LogLevel::Trace),
            reset: Some(true),
            resolve_by_title: None,
        };
        let overrides = Overrides {
            db_path: Some(PathBuf::from("from-flag.shelf")),
            log_level: Some(LogLevel::Error),
            keep_existing: true,
            resolve_by_title: false,
        };

        let config = Config::merge(file, overrides);
        assert_eq!(config.db_path, PathBuf::from("from-flag.shelf"));
        assert_eq!(config.log_level, LogLevel::Error);
        assert!(!config.reset);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(toml::from_str::<FileConfig>("dbpath = \"x\"").is_err());
    }

    // Only test touching CONFIG_ENV, so nothing races on the variable
    #[test]
    fn test_resolve_env_var_and_explicit_path() {
        let dir = TempDir::new().unwrap();
        let from_env = dir.path().join("env.toml");
        let explicit = dir.path().join("explicit.toml");
        fs::write(&from_env, "db_path = \"env.shelf\"\nlog_level = \"debug\"\n").unwrap();
        fs::write(&explicit, "log_level = \"trace\"\nreset = false\n").unwrap();

        std::env::set_var(CONFIG_ENV, &from_env);

        let config = Config::resolve(None, Overrides::default()).unwrap();
        assert_eq!(config.db_path, PathBuf::from("env.shelf"));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(config.reset);

        // --config wins over the env var entirely
        let config = Config::resolve(Some(explicit.as_path()), Overrides::default()).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.log_level, LogLevel::Trace);
        assert!(!config.reset);

        std::env::set_var(CONFIG_ENV, dir.path().join("missing.toml"));
        assert!(Config::resolve(None, Overrides::default()).is_err());

        std::env::remove_var(CONFIG_ENV);
        let config = Config::resolve(None, Overrides::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shelfbase.toml");
        fs::write(&path, "log_level = \"info\"\n").unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.log_level, Some(LogLevel::Info));
        assert!(FileConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
