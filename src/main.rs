// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, log in, report the result.
// - A failed login exits the process with status 1.

use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use jira_login::{
    login::LoginOptions,
    ui::{interactive_login, report_failure},
};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log in to a Jira server using the JSON configuration beside this program.
#[derive(Debug, Parser)]
#[command(name = "jira-login", version)]
struct Cli {
    /// Configuration file (defaults to `<program>.json` beside the executable)
    #[arg(long, short, env = "JIRA_LOGIN_CONFIG")]
    config: Option<PathBuf>,

    /// Username; leave unset to use the configuration file or a prompt
    #[arg(long, short, env = "JIRA_USER")]
    user: Option<String>,

    /// Password; leave unset to be prompted
    #[arg(long, short, env = "JIRA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(long, short, action = ArgAction::Count)]
    verbose: u8,
}

/// Initialize the tracing subscriber for logging
fn init_tracing(verbose: u8) {
    // RUST_LOG wins; otherwise -v raises the default level.
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = LoginOptions {
        config_path: cli.config,
        user: cli.user,
        password: cli.password,
    };
    debug!(config = %options.config_path().display(), "starting login");

    match interactive_login(&options) {
        Ok(client) => {
            let info = client.server_info();
            println!("{} ({})", info.server_title, info.version);
            Ok(())
        }
        Err(err) => {
            report_failure(&err);
            std::process::exit(1);
        }
    }
}
