//! User-facing surface: command-line arguments.

mod cli;

pub use cli::Args;
