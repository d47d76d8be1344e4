//! CLI module for qadesk - command-line interface and subcommands.
//!
//! Commands are defined in `commands`; `handlers` runs them against a
//! `DomainStore`.

pub mod commands;
pub mod handlers;

pub use commands::Cli;
