//! pagehint CLI library
//!
//! Argument parsing, command handlers and output rendering for the `pagehint` binary.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
