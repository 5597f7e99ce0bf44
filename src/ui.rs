// UI layer: terminal prompts with `dialoguer`, a spinner while the login
// request runs, and the lines printed on success or failure.

use std::io::{self, Write};
use std::time::Duration;

use dialoguer::{Input, Password};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::JiraClient;
use crate::credentials::CredentialPrompt;
use crate::error::LoginError;
use crate::login::{prepare, LoginOptions};

/// Prompts on the controlling terminal.
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn ask_username(&self) -> Result<String, LoginError> {
        println!("Enter Jira username, or leave blank for anonymous access");
        // `allow_empty` so a bare Enter selects anonymous access.
        let username: String = Input::new()
            .with_prompt("Username")
            .allow_empty(true)
            .interact_text()?;
        Ok(username)
    }

    fn ask_password(&self, username: &str) -> Result<String, LoginError> {
        // `Password` hides input in terminal for passwords.
        let password = Password::new()
            .with_prompt(format!("Password for {username}"))
            .allow_empty_password(true)
            .interact()?;
        Ok(password)
    }

    fn warn(&self, message: &str) {
        eprintln!("[ WARNING ] {message}");
    }
}

/// Run the full login flow on the terminal and print the outcome line.
///
/// Errors are returned untouched; see [`report_failure`].
pub fn interactive_login(options: &LoginOptions) -> Result<JiraClient, LoginError> {
    let prepared = prepare(options, &TerminalPrompt)?;

    // indicatif's spinner covers the network round-trip only.
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Logging in...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = prepared.connect();
    spinner.finish_and_clear();

    let client = result?;
    println!("{}", success_message(&client));
    println!();
    Ok(client)
}

/// Print the diagnostic for a failed login on stderr.
pub fn report_failure(err: &LoginError) {
    let _ = write_failure(&mut io::stderr().lock(), err);
}

/// Write the diagnostic for a failed login: status line then response body
/// for a rejected login, a single `[ ERROR ]` line otherwise.
pub fn write_failure<W: Write>(out: &mut W, err: &LoginError) -> io::Result<()> {
    match err {
        LoginError::Authentication { status, body } => {
            writeln!(out, "[ ERROR ] Error logging in to Jira, {}", status.as_u16())?;
            writeln!(out, "{body}")
        }
        other => writeln!(out, "[ ERROR ] {other}"),
    }
}

pub fn success_message(client: &JiraClient) -> String {
    match client.username() {
        Some(username) => format!("Login successful as {username}"),
        None => "Anonymous login successful".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::credentials::Credentials;
    use httpmock::prelude::*;

    fn connect(credentials: Credentials) -> JiraClient {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/rest/auth/1/session");
            then.status(200);
        });
        server.mock(|when, then| {
            when.method(GET).path("/rest/api/2/serverInfo");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"baseUrl":"http://jira","version":"9.4.0","serverTitle":"Jira"}"#);
        });
        let config = ServerConfig {
            server: server.base_url(),
            verify: true,
        };
        JiraClient::connect(&config, &credentials).unwrap()
    }

    #[test]
    fn success_line_names_the_user() {
        let client = connect(Credentials::new("alice", "secret"));
        assert_eq!(success_message(&client), "Login successful as alice");
    }

    #[test]
    fn success_line_for_anonymous_access() {
        let client = connect(Credentials::anonymous());
        assert_eq!(success_message(&client), "Anonymous login successful");
    }

    #[test]
    fn rejected_login_prints_status_then_body() {
        let err = LoginError::Authentication {
            status: reqwest::StatusCode::UNAUTHORIZED,
            body: "<html>Unauthorized (401)</html>".into(),
        };
        let mut out = Vec::new();

        write_failure(&mut out, &err).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[ ERROR ] Error logging in to Jira, 401\n<html>Unauthorized (401)</html>\n"
        );
    }

    #[test]
    fn other_failures_print_a_single_error_line() {
        let err = LoginError::Configuration("Missing \"server\" key in JSON configuration file".into());
        let mut out = Vec::new();

        write_failure(&mut out, &err).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[ ERROR ] Missing \"server\" key in JSON configuration file\n"
        );
    }
}
