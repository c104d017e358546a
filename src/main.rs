use std::{any::Any, panic, process::ExitCode};

use anyhow::{Context, Error};
use clap::Parser;
use log::error;

use chkuuid::{audit::Classification, cli::Cli, report::Presenter, AuditError};

fn setup_logging(args: &Cli) -> Result<(), Error> {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(args.verbosity)
        .try_init()
        .context("Logger already registered")
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => (*message).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

fn run_audit(args: &Cli) -> Result<Vec<Classification>, AuditError> {
    match panic::catch_unwind(|| chkuuid::run(args)) {
        Err(e) => Err(AuditError::Panic(panic_message(e))),
        Ok(r) => r,
    }
}

fn main() -> ExitCode {
    // Parse args
    let args = Cli::parse();

    if let Err(e) = setup_logging(&args) {
        eprintln!("Failed to initialize logging: {e:?}");
        return ExitCode::from(1);
    }

    let classifications = match run_audit(&args) {
        Ok(classifications) => classifications,
        Err(e) => {
            error!("chkuuid failed: {:?}", Error::from(e));
            return ExitCode::from(2);
        }
    };

    let presenter = Presenter::new(args.output, !args.no_color);
    if let Err(e) = presenter.render(&classifications, &mut anstream::stdout()) {
        error!("{e:?}");
        return ExitCode::from(2);
    }

    ExitCode::SUCCESS
}
