// Credential resolution: explicit arguments first, then the configuration
// file, then an interactive prompt. The prompt is a trait so the chain can
// be driven without a terminal.

use std::fmt;

use tracing::{debug, warn};

use crate::config::RawConfig;
use crate::error::LoginError;

/// Username that selects unauthenticated access.
pub const ANONYMOUS: &str = "anonymous";

/// Warning shown when the password is taken from the configuration file.
pub const CONFIG_PASSWORD_WARNING: &str =
    "Received password from JSON file. This is a very bad idea.";

/// Username/password pair used for basic auth.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(ANONYMOUS, "")
    }

    pub fn is_anonymous(&self) -> bool {
        self.username == ANONYMOUS
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Explicit,
    ConfigFile,
    Prompt,
    /// Blank username prompt, or the empty password of an anonymous login.
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub credentials: Credentials,
    pub username_origin: Origin,
    pub password_origin: Origin,
}

/// Interactive side of credential resolution.
pub trait CredentialPrompt {
    /// Ask for a username; a blank answer means anonymous access.
    fn ask_username(&self) -> Result<String, LoginError>;

    /// Ask for a password without echoing it.
    fn ask_password(&self, username: &str) -> Result<String, LoginError>;

    /// Show a warning to the user.
    fn warn(&self, message: &str);
}

/// Resolves a username and password from the available sources.
pub struct CredentialResolver<'a> {
    explicit_user: Option<&'a str>,
    explicit_password: Option<&'a str>,
    config: &'a RawConfig,
    prompt: &'a dyn CredentialPrompt,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(config: &'a RawConfig, prompt: &'a dyn CredentialPrompt) -> Self {
        Self {
            explicit_user: None,
            explicit_password: None,
            config,
            prompt,
        }
    }

    pub fn user(mut self, user: Option<&'a str>) -> Self {
        self.explicit_user = user;
        self
    }

    pub fn password(mut self, password: Option<&'a str>) -> Self {
        self.explicit_password = password;
        self
    }

    pub fn resolve(&self) -> Result<ResolvedCredentials, LoginError> {
        let (username, username_origin) = self.resolve_username()?;
        let (password, password_origin) = self.resolve_password(&username)?;
        debug!(
            username = %username,
            ?username_origin,
            ?password_origin,
            "credentials resolved"
        );

        Ok(ResolvedCredentials {
            credentials: Credentials { username, password },
            username_origin,
            password_origin,
        })
    }

    fn resolve_username(&self) -> Result<(String, Origin), LoginError> {
        if let Some(user) = non_blank(self.explicit_user) {
            return Ok((user.to_string(), Origin::Explicit));
        }
        // A blank `user` is skipped; any other value is used as written.
        if let Some(user) = self.config.user()?.filter(|u| !u.trim().is_empty()) {
            return Ok((user.to_string(), Origin::ConfigFile));
        }

        let answer = self.prompt.ask_username()?;
        match non_blank(Some(&answer)) {
            Some(user) => Ok((user.to_string(), Origin::Prompt)),
            None => Ok((ANONYMOUS.to_string(), Origin::Anonymous)),
        }
    }

    fn resolve_password(&self, username: &str) -> Result<(String, Origin), LoginError> {
        if let Some(password) = self.explicit_password.map(str::trim) {
            return Ok((password.to_string(), Origin::Explicit));
        }
        if username == ANONYMOUS {
            return Ok((String::new(), Origin::Anonymous));
        }
        if let Some(password) = self.config.password()? {
            warn!("password read from the configuration file");
            self.prompt.warn(CONFIG_PASSWORD_WARNING);
            return Ok((password.to_string(), Origin::ConfigFile));
        }

        let answer = self.prompt.ask_password(username)?;
        Ok((answer.trim().to_string(), Origin::Prompt))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
