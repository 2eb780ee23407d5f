//! CLI subcommands.

pub mod build;
pub mod bump;
pub mod keys;
pub mod serve;
pub mod verify;
