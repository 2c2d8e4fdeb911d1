// CLI binary entry point for id3forge

use clap::Parser;
use log::LevelFilter;
use std::process;

mod cli;

use cli::{Config, OutputFormatter};

fn init_logging(config: &Config) {
    let level = if config.verbose {
        LevelFilter::Debug
    } else if config.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    // RUST_LOG takes precedence over the flags
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let config = Config::parse();
    init_logging(&config);

    let formatter = OutputFormatter::new(config.format, config.quiet);
    if let Err(e) = cli::commands::run(&config, &formatter) {
        formatter.print_error(&format!("{:#}", e));
        process::exit(1);
    }
}
