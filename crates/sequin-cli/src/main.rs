//! Sequin CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use sequin_cli::{Args, error_adapter::reports};

fn main() {
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = match LevelFilter::from_str(&args.log_level) {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "Invalid log level: {}. Expected one of: off, error, warn, info, debug, trace.",
                args.log_level
            );
            process::exit(2);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:? = log_level; "Starting Sequin");
    debug!(args:? = args; "Parsed arguments");

    if let Err(err) = sequin_cli::run(&args) {
        let reporter = miette::GraphicalReportHandler::new();

        // Render each diagnostic independently
        for report in reports(&err) {
            let mut writer = String::new();
            reporter
                .render_report(&mut writer, &report)
                .expect("Writing to String buffer is infallible");

            error!("{writer}");
        }

        process::exit(1);
    }

    info!("Completed successfully");
}
