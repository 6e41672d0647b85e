use std::env;
use std::path::PathBuf;
use clap::Parser;
use crate::gui::application::run_application;
use crate::error::AppRunError;

pub mod belt;
pub mod config;
pub mod error;
pub mod gui;
pub mod reconciler;

#[derive(Parser, Debug)]
#[command(author, version)]
#[command(about = "Controls a haptic navigation belt.", long_about = None)]
pub struct Args {
    /// Use this config file instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Also write the log to this file. Defaults to the LOG_FILE environment variable
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log debug messages, such as every command sent to the belt
    #[arg(long)]
    pub verbose: bool,
}

pub fn init_logging(verbose: bool, log_file: Option<PathBuf>) -> Result<(), fern::InitError> {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                humantime::format_rfc3339(std::time::SystemTime::now()),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        // iced and its windowing stack are chatty at debug level
        .level_for("iced_winit", log::LevelFilter::Warn)
        .level_for("winit", log::LevelFilter::Warn)
        .chain(std::io::stderr());

    let log_file = log_file.or_else(|| env::var_os("LOG_FILE").map(PathBuf::from));
    if let Some(log_file) = log_file {
        dispatch = dispatch.chain(fern::log_file(log_file)?);
    }

    dispatch.apply()?;
    Ok(())
}

pub fn run(args: Args) -> Result<(), AppRunError> {
    run_application(args.config)?;
    Ok(())
}
