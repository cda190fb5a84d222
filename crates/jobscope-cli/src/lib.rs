//! Jobscope CLI - Command-line interface for the job advertisement analytics
//!
//! This crate provides the `jobscope` binary that ties the snapshot download,
//! the snapshot reader and the core aggregations together.

pub mod config;
pub mod render;

pub use config::{Command, Config, FilterArgs, OutputFormat, TermsAction};
