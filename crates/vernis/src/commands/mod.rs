//! Subcommands.

pub mod lint;
