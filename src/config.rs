// JSON configuration for the Jira login flow.
//
// The file carries the server settings (`server`, `verify`) and may also
// carry default credentials (`user`, `password`):
//
//     { "server": "https://example.atlassian.net", "verify": true, "user": "alice" }
//
// By default the file is named after the running program
// (`<program>.json`) and lives next to the executable.

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::LoginError;

/// Directory name used under the user config dir
const APP_NAME: &str = "jira-login";

/// Stem used when the executable name can't be determined
const FALLBACK_STEM: &str = "jira-login";

/// The configuration file exactly as parsed.
///
/// Keeps every key so the credential resolver can read `user` and
/// `password` from it; client construction only sees [`ServerConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    values: Map<String, Value>,
}

/// Reduced configuration handed to the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerConfig {
    pub server: String,
    pub verify: bool,
}

impl RawConfig {
    /// Read and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, LoginError> {
        debug!(path = %path.display(), "loading configuration");
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                LoginError::MissingFile {
                    path: path.to_path_buf(),
                    source,
                }
            } else {
                LoginError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let value: Value = serde_json::from_str(&contents).map_err(|source| LoginError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(value)
    }

    /// Wrap an already parsed JSON document; the root must be an object.
    pub fn from_value(value: Value) -> Result<Self, LoginError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(LoginError::configuration(format!(
                "JSON configuration file must contain an object, found {}",
                json_type(&other)
            ))),
        }
    }

    /// Validate the `server` and `verify` keys and return only those two.
    pub fn server_config(&self) -> Result<ServerConfig, LoginError> {
        let server = self.values.get("server").ok_or_else(|| {
            LoginError::configuration("Missing \"server\" key in JSON configuration file")
        })?;
        let verify = self.values.get("verify").ok_or_else(|| {
            LoginError::configuration("Missing \"verify\" key in JSON configuration file")
        })?;

        let server = server.as_str().ok_or_else(|| {
            LoginError::configuration(format!(
                "\"server\" must be a string, found {}",
                json_type(server)
            ))
        })?;
        let verify = verify.as_bool().ok_or_else(|| {
            LoginError::configuration(format!(
                "\"verify\" must be a boolean, found {}",
                json_type(verify)
            ))
        })?;

        let server = server.trim();
        let url = Url::parse(server).map_err(|err| {
            LoginError::configuration(format!("\"server\" is not a valid URL ({server}): {err}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(LoginError::configuration(format!(
                "\"server\" must be an http or https URL, got {server}"
            )));
        }

        Ok(ServerConfig {
            server: server.to_string(),
            verify,
        })
    }

    /// Default username from the `user` key, if present.
    pub fn user(&self) -> Result<Option<&str>, LoginError> {
        self.optional_string("user")
    }

    /// Default password from the `password` key, if present.
    pub fn password(&self) -> Result<Option<&str>, LoginError> {
        self.optional_string("password")
    }

    fn optional_string(&self, key: &str) -> Result<Option<&str>, LoginError> {
        match self.values.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(LoginError::configuration(format!(
                "\"{key}\" must be a string, found {}",
                json_type(other)
            ))),
        }
    }
}

impl ServerConfig {
    /// Build an absolute URL for a REST path on this server.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Location of the configuration file when none is given explicitly.
///
/// Looks for `<program>.json` beside the executable, then under the
/// user config directory. When neither exists the executable-relative
/// path is returned so the resulting error names it.
pub fn default_config_path() -> PathBuf {
    let exe = std::env::current_exe().ok();
    let stem = exe
        .as_deref()
        .and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .unwrap_or(FALLBACK_STEM)
        .to_string();
    let file_name = format!("{stem}.json");

    let beside_exe = exe
        .as_deref()
        .and_then(Path::parent)
        .map(|dir| dir.join(&file_name))
        .unwrap_or_else(|| PathBuf::from(&file_name));
    if beside_exe.exists() {
        return beside_exe;
    }

    if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join(APP_NAME).join(&file_name);
        if candidate.exists() {
            return candidate;
        }
    }
    beside_exe
}
