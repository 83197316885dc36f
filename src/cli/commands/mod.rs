//! Subcommands of the `campfire` binary

pub mod generate;
pub mod solve;
