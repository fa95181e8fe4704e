//! Gridflat - flatten the formula in a spreadsheet cell into one expression

mod cli;
mod config;
mod console;
mod error;

use anyhow::{Context, Result};
use gridflat_core::{Document, Presenter};
use log::{info, warn};
use std::env;
use std::io;

use cli::{Args, Command};
use console::ConsolePresenter;

fn main() {
    let command = match cli::parse_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_usage();
            std::process::exit(2);
        }
    };

    let args = match command {
        Command::Help => {
            cli::print_usage();
            return;
        }
        Command::Flatten(args) => args,
    };

    init_logging(args.verbose);

    let mut presenter = ConsolePresenter::new(io::stdout().lock(), io::stderr().lock(), args.quiet);
    if let Err(e) = run(&args, &mut presenter) {
        let _ = presenter.show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(args: &Args, presenter: &mut impl Presenter) -> Result<()> {
    let config = config::load_config(args.config.as_deref())?;

    let mut options = config.options;
    if args.keep_values {
        options.substitute_values = false;
    }
    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }

    let mut document = Document::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    if let Some(sheet) = &args.sheet {
        document.set_active_sheet(sheet)?;
    } else if let Some(sheet) = &config.default_sheet {
        if let Err(e) = document.set_active_sheet(sheet) {
            warn!("default_sheet from config not used: {}", e);
        }
    }

    document.select(&args.cell)?;
    info!("flattening {}", document.selection());

    let report = document.flatten_selection(&options)?;
    presenter
        .show_report(&report)
        .context("failed to write result")?;
    Ok(())
}
