// Login flow: load the configuration, resolve credentials, connect.
// Each step runs once, in order; the first failure is returned as-is.

use std::path::PathBuf;

use tracing::debug;

use crate::api::JiraClient;
use crate::config::{default_config_path, RawConfig, ServerConfig};
use crate::credentials::{CredentialPrompt, CredentialResolver, ResolvedCredentials};
use crate::error::LoginError;

/// Call-time inputs to [`login`].
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    /// Configuration file; `None` uses [`default_config_path`].
    pub config_path: Option<PathBuf>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl LoginOptions {
    pub fn config_path(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }
}

/// Configuration and credentials ready for the network call.
#[derive(Debug, Clone)]
pub struct PreparedLogin {
    pub server: ServerConfig,
    pub resolved: ResolvedCredentials,
}

impl PreparedLogin {
    pub fn connect(&self) -> Result<JiraClient, LoginError> {
        JiraClient::connect(&self.server, &self.resolved.credentials)
    }
}

/// Load the configuration and resolve credentials without touching the network.
///
/// Configuration errors are returned before any prompt is shown.
pub fn prepare(
    options: &LoginOptions,
    prompt: &dyn CredentialPrompt,
) -> Result<PreparedLogin, LoginError> {
    let raw = RawConfig::load(&options.config_path())?;
    let server = raw.server_config()?;
    debug!(server = %server.server, verify = server.verify, "configuration loaded");

    let resolved = CredentialResolver::new(&raw, prompt)
        .user(options.user.as_deref())
        .password(options.password.as_deref())
        .resolve()?;

    Ok(PreparedLogin { server, resolved })
}

/// Log in to the Jira server named in the configuration file.
///
/// A rejected login comes back as [`LoginError::Authentication`].
pub fn login(options: &LoginOptions, prompt: &dyn CredentialPrompt) -> Result<JiraClient, LoginError> {
    prepare(options, prompt)?.connect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::tests::ScriptedPrompt;
    use crate::credentials::Credentials;
    use httpmock::prelude::*;
    use std::io::Write;

    const SERVER_INFO: &str =
        r#"{"baseUrl":"https://jira.test","version":"9.4.0","serverTitle":"Test Jira"}"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn options(file: &tempfile::NamedTempFile) -> LoginOptions {
        LoginOptions {
            config_path: Some(file.path().to_path_buf()),
            ..LoginOptions::default()
        }
    }

    #[test]
    fn malformed_config_stops_before_prompting() {
        let file = write_config("this is not json");
        let prompt = ScriptedPrompt::answering("alice", "secret");

        let err = login(&options(&file), &prompt).unwrap_err();

        assert!(matches!(err, LoginError::Parse { .. }));
        assert!(prompt.calls.borrow().is_empty());
    }

    #[test]
    fn missing_verify_stops_before_prompting() {
        let file = write_config(r#"{"server": "https://jira.test"}"#);
        let prompt = ScriptedPrompt::answering("alice", "secret");

        let err = login(&options(&file), &prompt).unwrap_err();

        assert!(err.to_string().contains("\"verify\""));
        assert!(prompt.calls.borrow().is_empty());
    }

    #[test]
    fn prepare_returns_reduced_config_and_credentials() {
        let file = write_config(
            r#"{"server": "https://example.atlassian.net", "verify": true, "user": "alice"}"#,
        );
        let prompt = ScriptedPrompt::answering("", "secret");

        let prepared = prepare(&options(&file), &prompt).unwrap();

        assert_eq!(
            prepared.server,
            ServerConfig {
                server: "https://example.atlassian.net".into(),
                verify: true,
            }
        );
        assert_eq!(prepared.resolved.credentials, Credentials::new("alice", "secret"));
    }

    #[test]
    fn prompted_credentials_reach_the_server() {
        let server = MockServer::start();
        let session = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/auth/1/session")
                .header("authorization", "Basic YWxpY2U6c2VjcmV0");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/rest/api/2/serverInfo");
            then.status(200)
                .header("content-type", "application/json")
                .body(SERVER_INFO);
        });
        let file = write_config(&format!(
            r#"{{"server": "{}", "verify": true}}"#,
            server.base_url()
        ));
        let prompt = ScriptedPrompt::answering(" alice ", "secret ");

        let client = login(&options(&file), &prompt).unwrap();

        session.assert();
        assert_eq!(client.username(), Some("alice"));
        assert_eq!(client.server_info().version, "9.4.0");
    }

    #[test]
    fn explicit_arguments_override_config_user() {
        let server = MockServer::start();
        let session = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/auth/1/session")
                .header("authorization", "Basic YWxpY2U6c2VjcmV0");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/rest/api/2/serverInfo");
            then.status(200)
                .header("content-type", "application/json")
                .body(SERVER_INFO);
        });
        let file = write_config(&format!(
            r#"{{"server": "{}", "verify": true, "user": "bob", "password": "pw"}}"#,
            server.base_url()
        ));
        let prompt = ScriptedPrompt::default();
        let opts = LoginOptions {
            user: Some("alice".into()),
            password: Some("secret".into()),
            ..options(&file)
        };

        let client = login(&opts, &prompt).unwrap();

        session.assert();
        assert_eq!(client.username(), Some("alice"));
        assert!(prompt.warnings.borrow().is_empty());
    }

    #[test]
    fn rejected_login_is_returned_to_the_caller() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/auth/1/session");
            then.status(401).body("bad credentials");
        });
        let file = write_config(&format!(
            r#"{{"server": "{}", "verify": true, "user": "alice", "password": "nope"}}"#,
            server.base_url()
        ));
        let prompt = ScriptedPrompt::default();

        let err = login(&options(&file), &prompt).unwrap_err();

        assert!(err.is_authentication());
        assert_eq!(prompt.warnings.borrow().len(), 1);
    }
}
