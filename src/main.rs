//! graytail - Terminal Tail Client for Graylog
//!
//! Follows one stream of a Graylog server in the terminal.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use env_logger::{Env, Target};
use graytail::config::{Config, Overrides};
use graytail::ui::TerminalUI;
use graytail::{Application, Engine, HttpBackend, PollScheduler};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn cli() -> Command {
    Command::new("graytail")
        .version(graytail::VERSION)
        .about("Tail a Graylog stream in the terminal")
        .long_about(
            "graytail polls a Graylog server for new messages in a selected stream and \
             shows them as they arrive. Settings are read from \
             <config dir>/graytail/config.toml unless --config is given.",
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new("baseurl")
                .long("baseurl")
                .value_name("URL")
                .help("Base URL of the Graylog REST API"),
        )
        .arg(
            Arg::new("username")
                .long("username")
                .short('u')
                .help("User for basic authentication"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .env("GRAYTAIL_PASSWORD")
                .hide_env_values(true)
                .help("Password for basic authentication"),
        )
}

fn overrides(matches: &ArgMatches) -> Overrides {
    Overrides {
        config_path: matches.get_one::<String>("config").map(PathBuf::from),
        baseurl: matches.get_one::<String>("baseurl").cloned(),
        username: matches.get_one::<String>("username").cloned(),
        password: matches.get_one::<String>("password").cloned(),
    }
}

/// Logs go to the configured file when there is one; the TUI owns the terminal.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let mut builder = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
            builder.target(Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(Env::default().default_filter_or("warn")),
    };
    builder.try_init().context("cannot initialize logging")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let config = Config::load(&overrides(&matches)).context("cannot load configuration")?;
    init_logging(config.log_file.as_deref())?;

    let backend = HttpBackend::new(
        config.baseurl.clone(),
        config.username.clone(),
        config.password.clone(),
        config.request_timeout,
    )
    .context("cannot create backend client")?;

    let scheduler = PollScheduler::new(Arc::new(backend), Engine::new(), config.poll_settings());
    let ui_renderer = Box::new(TerminalUI::new()?);
    let mut app = Application::new(scheduler, ui_renderer);

    app.run().await?;

    Ok(())
}
