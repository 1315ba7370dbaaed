use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an alternate config file
pub const CONFIG_ENV: &str = "FSND_CONFIG";

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/fsnd";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_FILE: &str = "error.log";

static VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("invalid variable regex")
});

/// The two web applications served by fsnd
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum App {
    Fyyur,
    Trivia,
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fyyur => f.write_str("fyyur"),
            Self::Trivia => f.write_str("trivia"),
        }
    }
}

/// Top-level configuration, read from ~/.fsnd/config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FsndConfig {
    /// Shared database URL, used unless an app section overrides it
    pub database_url: String,
    pub max_connections: u32,
    pub fyyur: AppConfig,
    pub trivia: AppConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub bind: SocketAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// File that `serve` also logs to unless `--debug` is given; "" disables it
    pub file: String,
}

impl LogConfig {
    /// Error log path, `None` when disabled
    pub fn file_path(&self) -> Option<PathBuf> {
        let file = self.file.trim();
        (!file.is_empty()).then(|| PathBuf::from(file))
    }
}

impl Default for FsndConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            fyyur: AppConfig {
                bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
                database_url: None,
            },
            trivia: AppConfig {
                bind: SocketAddr::from(([127, 0, 0, 1], 5001)),
                database_url: None,
            },
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl FsndConfig {
    /// Load config from `$FSND_CONFIG` or ~/.fsnd/config.toml.
    ///
    /// A missing file yields the defaults. Environment overrides
    /// (`DATABASE_URL`) are applied afterwards.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Read and parse a specific TOML file, expanding `${VAR}` references.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;
        let mut config = Self::from_toml_str(&content)?;
        config.expand_variables(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file (invalid TOML)")
    }

    /// Config file path: `$FSND_CONFIG` or ~/.fsnd/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".fsnd/config.toml")
    }

    /// Section for one application
    pub fn app(&self, app: App) -> &AppConfig {
        match app {
            App::Fyyur => &self.fyyur,
            App::Trivia => &self.trivia,
        }
    }

    /// Database URL for an application, falling back to the shared one
    pub fn database_url_for(&self, app: App) -> &str {
        self.app(app)
            .database_url
            .as_deref()
            .unwrap_or(&self.database_url)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.is_empty()) {
            self.database_url = url;
        }
        if let Some(level) = lookup("FSND_LOG").filter(|l| !l.is_empty()) {
            self.log.level = level;
        }
    }

    /// Expand `${VAR}` references in database URLs
    pub fn expand_variables<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.database_url = expand_string(&self.database_url, &lookup);
        for section in [&mut self.fyyur, &mut self.trivia] {
            if let Some(url) = section.database_url.as_mut() {
                *url = expand_string(url, &lookup);
            }
        }
    }

    /// Save config to the config path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)
            .context("Failed to serialize config to TOML")?;

        fs::write(&config_path, toml_str)
            .context(format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }
}

/// Replace `${VAR}` with the looked-up value; unknown variables become empty
fn expand_string<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    VAR_RE
        .replace_all(s, |caps: &regex::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_when_sections_missing() {
        let config = FsndConfig::from_toml_str("").unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.fyyur.bind.port(), 5000);
        assert_eq!(config.trivia.bind.port(), 5001);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.file_path(), Some(PathBuf::from("error.log")));
    }

    #[test]
    fn log_file_is_configurable_and_can_be_disabled() {
        let config = FsndConfig::from_toml_str("[log]\nfile = \"/var/log/fsnd/errors.log\"").unwrap();
        assert_eq!(config.log.level, "info");
        assert_eq!(
            config.log.file_path(),
            Some(PathBuf::from("/var/log/fsnd/errors.log"))
        );

        let config = FsndConfig::from_toml_str("[log]\nfile = \"  \"").unwrap();
        assert_eq!(config.log.file_path(), None);
    }

    #[test]
    fn app_section_overrides_database_url() {
        let config = FsndConfig::from_toml_str(
            r#"
            database_url = "postgres://db/shared"

            [fyyur]
            bind = "0.0.0.0:8080"

            [trivia]
            bind = "0.0.0.0:8081"
            database_url = "postgres://db/trivia"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_url_for(App::Fyyur), "postgres://db/shared");
        assert_eq!(config.database_url_for(App::Trivia), "postgres://db/trivia");
        assert_eq!(config.app(App::Fyyur).bind.port(), 8080);
    }

    #[test]
    fn expands_variables() {
        let env = vars(&[("DB_PASSWORD", "hunter2"), ("DB_HOST", "pg")]);
        let mut config = FsndConfig {
            database_url: "postgres://postgres:${DB_PASSWORD}@${DB_HOST}/fsnd".into(),
            ..FsndConfig::default()
        };
        config.trivia.database_url = Some("postgres://${DB_HOST}/${MISSING}trivia".into());

        config.expand_variables(|k| env.get(k).cloned());

        assert_eq!(config.database_url, "postgres://postgres:hunter2@pg/fsnd");
        assert_eq!(
            config.trivia.database_url.as_deref(),
            Some("postgres://pg/trivia")
        );
    }

    #[test]
    fn env_overrides_database_url() {
        let env = vars(&[("DATABASE_URL", "postgres://elsewhere/db")]);
        let mut config = FsndConfig::default();
        config.apply_overrides(|k| env.get(k).cloned());
        assert_eq!(config.database_url, "postgres://elsewhere/db");

        let empty = vars(&[("DATABASE_URL", "")]);
        let mut config = FsndConfig::default();
        config.apply_overrides(|k| empty.get(k).cloned());
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_connections = 12\n[log]\nlevel = \"debug\"").unwrap();

        let config = FsndConfig::load_from(file.path()).unwrap();
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn rejects_invalid_toml() {
        let err = FsndConfig::from_toml_str("database_url = [").unwrap_err();
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn roundtrips_through_toml() {
        let config = FsndConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = FsndConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.fyyur.bind, config.fyyur.bind);
        assert!(!text.contains("database_url = \"\""));
    }
}
