//! Command-line interface
//!
//! Argument definitions and command handlers for the `crispr-lab` binary.

pub mod args;
pub mod commands;
