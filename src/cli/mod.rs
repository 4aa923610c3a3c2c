//! CLI module - argument parsing, log backend and log-forwarding sink

mod args;
pub mod logging;
mod sink;

pub use args::Cli;
pub use sink::{Language, LogSink};
