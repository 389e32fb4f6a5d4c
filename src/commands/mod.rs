//! Command line handling
//!
//! [`parser`] defines the clap interface; the other modules run the one-shot
//! subcommands and write their output to any `io::Write`.

pub mod backup;
pub mod config;
pub mod parser;
pub mod process;
pub mod shortcuts;

pub use parser::*;
