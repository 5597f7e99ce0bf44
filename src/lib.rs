// Library root
// ------------
// Log in to a Jira server from the command line. The binary (`main.rs`)
// wraps `ui::interactive_login`; other tools can call `login::login`
// with their own `CredentialPrompt`.
//
// Module responsibilities:
// - `config`: reads the JSON configuration file and validates the
//   server settings.
// - `credentials`: picks the username and password from explicit
//   arguments, the configuration file or a prompt.
// - `api`: performs the login round-trip and owns the session handle.
// - `login`: runs the steps above in order.
// - `ui`: terminal prompts and the lines printed for the user.
pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod login;
pub mod ui;

pub use api::{JiraClient, ServerInfo};
pub use config::{default_config_path, RawConfig, ServerConfig};
pub use credentials::{CredentialPrompt, CredentialResolver, Credentials, ANONYMOUS};
pub use error::LoginError;
pub use login::{login, prepare, LoginOptions};
