//! CLI infrastructure for the campfire toolkit
//!
//! This module provides the command-line interface for generating state
//! spaces and solving decision processes.

pub mod commands;
pub mod config;
pub mod output;
