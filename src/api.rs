// API client module: a small blocking HTTP client for the Jira REST API.
// `JiraClient::connect` performs the login round-trip; the resulting value
// is the session handle handed back to callers.

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::credentials::Credentials;
use crate::error::LoginError;

const USER_AGENT: &str = concat!("jira-login/", env!("CARGO_PKG_VERSION"));

/// Endpoint that validates basic-auth credentials.
const SESSION_PATH: &str = "rest/auth/1/session";

/// Endpoint describing the server; readable anonymously.
const SERVER_INFO_PATH: &str = "rest/api/2/serverInfo";

/// Server details returned by `/rest/api/2/serverInfo`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub base_url: String,
    pub version: String,
    pub server_title: String,
    #[serde(default)]
    pub deployment_type: Option<String>,
}

/// Authenticated (or anonymous) connection to a Jira server.
pub struct JiraClient {
    client: Client,
    config: ServerConfig,
    auth: Option<Credentials>,
    server_info: ServerInfo,
}

impl std::fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiraClient")
            .field("server", &self.config.server)
            .field("username", &self.username())
            .field("server_info", &self.server_info)
            .finish()
    }
}

impl JiraClient {
    /// Log in to the server described by `config`.
    ///
    /// Anonymous credentials send no auth header. Any other credentials
    /// are sent as basic auth and checked against the session endpoint
    /// before the server info is fetched.
    pub fn connect(config: &ServerConfig, credentials: &Credentials) -> Result<Self, LoginError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if !config.verify {
            warn!(server = %config.server, "TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        let auth = (!credentials.is_anonymous()).then(|| credentials.clone());

        if auth.is_some() {
            debug!(username = %credentials.username, "validating credentials");
            let res = authorized_get(&client, config, auth.as_ref(), SESSION_PATH).send()?;
            check_status(res)?;
        }

        let res = authorized_get(&client, config, auth.as_ref(), SERVER_INFO_PATH).send()?;
        let server_info: ServerInfo = check_status(res)?
            .json()
            .map_err(|err| LoginError::InvalidResponse(format!("server info: {err}")))?;

        let jira = JiraClient {
            client,
            config: config.clone(),
            auth,
            server_info,
        };
        info!(
            server = %jira.config.server,
            username = jira.username().unwrap_or(crate::credentials::ANONYMOUS),
            version = %jira.server_info.version,
            "logged in to Jira"
        );
        Ok(jira)
    }

    /// Build a GET request for a REST path with this session's auth applied.
    pub fn get(&self, path: &str) -> RequestBuilder {
        authorized_get(&self.client, &self.config, self.auth.as_ref(), path)
    }

    pub fn server(&self) -> &ServerConfig {
        &self.config
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Logged-in username, or `None` for an anonymous session.
    pub fn username(&self) -> Option<&str> {
        self.auth.as_ref().map(|c| c.username.as_str())
    }

    pub fn is_anonymous(&self) -> bool {
        self.auth.is_none()
    }
}

fn authorized_get(
    client: &Client,
    config: &ServerConfig,
    auth: Option<&Credentials>,
    path: &str,
) -> RequestBuilder {
    let req = client.get(config.endpoint(path));
    match auth {
        Some(creds) => req.basic_auth(&creds.username, Some(&creds.password)),
        None => req,
    }
}

/// Turn a non-2xx response into an authentication error carrying the body.
fn check_status(res: Response) -> Result<Response, LoginError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    Err(LoginError::Authentication { status, body })
}
