mod config;
mod engine;
mod game;
mod term;
mod snake;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use config::Config;

pub type TermInt = u16;
pub type Coords = (u16, u16);

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;
    init_logging(&config)?;
    info!("starting with {:?}", config);

    let mut game = game::SnakeGame::new(config)?;
    game.initialize()?;
    let res = game.run();

    // Leave the alternate screen before any error gets printed
    finish(res, game.restore())
}

/// The game's own error comes first; a failed restore only surfaces when the
/// game itself ended cleanly.
fn finish(res: Result<()>, restored: Result<()>) -> Result<()> {
    match (res, restored) {
        (Err(e), Err(restore_err)) => {
            error!("restoring terminal: {:#}", restore_err);
            eprintln!("warning: could not restore terminal: {:#}", restore_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), restored) => restored,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LogSink<'a> {
    File(&'a Path),
    /// Nothing is logged. `env_ignored` is set when RUST_LOG asked for logs
    /// that would otherwise land on the game screen.
    Off { env_ignored: bool },
}

/// Stderr shares the terminal with the board, so logs only ever go to a file.
fn log_sink(config: &Config, rust_log_set: bool) -> LogSink<'_> {
    match &config.log_file {
        Some(path) => LogSink::File(path),
        None => LogSink::Off { env_ignored: rust_log_set },
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let path = match log_sink(config, std::env::var_os("RUST_LOG").is_some()) {
        LogSink::File(path) => path,
        LogSink::Off { env_ignored } => {
            if env_ignored {
                eprintln!("warning: RUST_LOG is ignored without --log-file, logs would garble the board");
            }
            return Ok(());
        }
    };

    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("initializing logger")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn game_error_wins_over_restore_error() {
        let res = finish(Err(anyhow!("reading key")), Err(anyhow!("leaving alternate screen")));
        assert_eq!(res.unwrap_err().to_string(), "reading key");
    }

    #[test]
    fn restore_error_reported_after_clean_game() {
        let res = finish(Ok(()), Err(anyhow!("leaving alternate screen")));
        assert_eq!(res.unwrap_err().to_string(), "leaving alternate screen");

        assert!(finish(Ok(()), Ok(())).is_ok());
    }

    #[test]
    fn logs_never_go_to_the_terminal() {
        let config = Config::default();
        assert_eq!(log_sink(&config, true), LogSink::Off { env_ignored: true });
        assert_eq!(log_sink(&config, false), LogSink::Off { env_ignored: false });

        let config = Config { log_file: Some("snake.log".into()), ..Config::default() };
        assert_eq!(log_sink(&config, true), LogSink::File(Path::new("snake.log")));
    }
}
