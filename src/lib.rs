pub mod cli;
pub mod commands;
pub mod config;
pub mod database;
pub mod docs;
pub mod editor;
pub mod export;
pub mod logging;

use clap::Parser;
use std::io::{self, IsTerminal};
use tracing::Level;

use cli::{Cli, LogFormatArg, LogLevelArg};
use commands::{execute, open_session, CommandError};
use config::EditorConfig;
use logging::{init_logging, LogConfig, LogFormat};

/// Entry point for the `rich-editor` binary. Returns the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();

    let log_config = log_config_from_cli(&cli);
    if let Err(e) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {e}");
        return 1;
    }

    match run_cli(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_cli(cli: Cli) -> Result<(), CommandError> {
    let config = EditorConfig::resolve()?
        .with_database_path(cli.database)
        .with_slot_key(cli.slot)
        .with_locale(cli.locale.as_deref());

    let mut session = open_session(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&mut session, cli.command, &mut out)
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::from_verbosity(cli.verbose);
    if let Some(level) = cli.log_level {
        config = config.with_level(match level {
            LogLevelArg::Error => Level::ERROR,
            LogLevelArg::Warn => Level::WARN,
            LogLevelArg::Info => Level::INFO,
            LogLevelArg::Debug => Level::DEBUG,
            LogLevelArg::Trace => Level::TRACE,
        });
    }

    config
        .with_format(match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        })
        .with_ansi(io::stderr().is_terminal())
        .with_log_file(cli.log_file.clone())
}
