//! CLI argument parsing module.

mod args;
mod commands;
mod input;

pub use args::Cli;
pub use commands::execute;
