use clap::Parser;
use log::info;
use msgbox::IconType;
use belt_navigator::{init_logging, run, Args};
use belt_navigator::error::{error_msgbox, AppRunError, ConfigError};

fn main() -> Result<(), AppRunError> {
    let args = Args::parse();

    if let Err(err) = init_logging(args.verbose, args.log_file.clone()) {
        // keep going, the application is usable without a log
        eprintln!("Failed to initialize logging: {}", err);
    }
    info!(concat!("Belt Navigator ", env!("CARGO_PKG_VERSION")));

    match run(args) {
        Err(AppRunError::ConfigError { source: ConfigError::CanNotLock { .. } }) => {
            if let Err(err) = msgbox::create(
                concat!("Belt Navigator ", env!("CARGO_PKG_VERSION")),
                "This application has already been started",
                IconType::Error,
            ) {
                eprintln!("Failed to create msgbox: {:?}", err);
            }
            Ok(())
        },
        Err(err) => {
            error_msgbox("Unexpected error", &err);
            Err(err)
        }
        Ok(_) => Ok(())
    }
}
