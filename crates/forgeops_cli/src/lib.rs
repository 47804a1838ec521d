//! ForgeOps CLI library exports for integration testing.
//!
//! `main` only parses arguments and wires these modules together.

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod logging;
pub mod output;
pub mod prompt;
