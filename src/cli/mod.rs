// CLI module for id3forge
//
// Command-line front end over the library: argument parsing, command
// implementations and output formatting.

pub mod commands;
pub mod config;
pub mod output;

pub use config::Config;
pub use output::OutputFormatter;
