//! Process configuration: `config.toml` plus environment overrides.
//!
//! Resolution order, later wins: built-in defaults, the config file, then
//! non-empty `OPENAI_API_KEY` / `OPENAI_BASE_URL` / `CODEQUERY_MODEL`.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use codequery_types::ApiKey;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_MODEL: &str = "CODEQUERY_MODEL";

const APP_DIR: &str = "codequery";
const CONFIG_FILE: &str = "config.toml";
/// Earlier releases read JSON from this name; it is no longer loaded.
const LEGACY_CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// The on-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl FileConfig {
    /// Read and parse `path`. A missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "Failed to read config");
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "Failed to parse config");
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Layer `file` and then `env` over the defaults.
    ///
    /// Blank values at either layer are ignored. `${VAR}` references in
    /// file values are expanded through `env`.
    pub fn resolve(file: Option<FileConfig>, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(file) = file {
            if let Some(key) = file.api_key.map(|v| expand_env_vars(&v, &env)) {
                config.api_key = ApiKey::new(key).or(config.api_key);
            }
            if let Some(url) = non_blank(file.base_url.map(|v| expand_env_vars(&v, &env))) {
                config.base_url = url;
            }
            if let Some(model) = non_blank(file.model) {
                config.model = model;
            }
        }

        if let Some(key) = env(ENV_API_KEY).and_then(ApiKey::new) {
            config.api_key = Some(key);
        }
        if let Some(url) = non_blank(env(ENV_BASE_URL)) {
            config.base_url = url;
        }
        if let Some(model) = non_blank(env(ENV_MODEL)) {
            config.model = model;
        }
        config
    }

    /// Load from the default config path and the process environment.
    ///
    /// A malformed or unreadable file is returned alongside a configuration
    /// built from defaults and environment, so the caller can warn and go on.
    #[must_use]
    pub fn load() -> (Self, Option<ConfigError>) {
        let (file, error) = match config_path().map(|path| FileConfig::load_from(&path)) {
            Some(Ok(file)) => (file, None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        };
        (Self::resolve(file, |name| env::var(name).ok()), error)
    }
}

/// `$XDG_CONFIG_HOME/codequery`, or `~/.config/codequery` when unset.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(env::var_os("XDG_CONFIG_HOME").map(PathBuf::from), dirs::home_dir())
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// A leftover `config.json` in the config directory when no `config.toml`
/// sits next to it.
#[must_use]
pub fn legacy_config_path() -> Option<PathBuf> {
    config_dir().and_then(|dir| legacy_config_in(&dir))
}

fn legacy_config_in(dir: &Path) -> Option<PathBuf> {
    let legacy = dir.join(LEGACY_CONFIG_FILE);
    (legacy.is_file() && !dir.join(CONFIG_FILE).exists()).then_some(legacy)
}

fn config_dir_from(xdg: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    match xdg {
        Some(xdg) if !xdg.as_os_str().is_empty() => Some(xdg.join(APP_DIR)),
        _ => home.map(|home| home.join(".config").join(APP_DIR)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Expand `${VAR}` references. Unknown variables expand to nothing; `${}`
/// and an unterminated `${` are kept literally.
fn expand_env_vars(value: &str, env: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        if name.is_empty() {
            out.push_str("${}");
        } else if let Some(resolved) = env(name) {
            out.push_str(&resolved);
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}
