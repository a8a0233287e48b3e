//! CLI module for jobpvc

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, LogFormat};
