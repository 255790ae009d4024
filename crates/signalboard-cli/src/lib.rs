//! # signalboard-cli
//!
//! Command-line front end for the dashboard synthesizer.
//!
//! Provides commands for:
//! - Classifying individual metric or attribute names
//! - Analyzing a discovery snapshot
//! - Building, validating and deploying a dashboard
//!
//! # Architecture
//!
//! All synthesis happens in `signalboard-core`. This crate loads files,
//! renders output and supplies the live [`client::NerdGraphClient`] as the
//! core's backend collaborator.
//!
//! ```text
//! ┌──────────────────┐  snapshot   ┌──────────────────┐  GraphQL  ┌───────────┐
//! │ signalboard-cli  │────────────►│ signalboard-core │◄─────────►│ NerdGraph │
//! └──────────────────┘             └──────────────────┘ (via cli) └───────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, Region};
pub use client::NerdGraphClient;
pub use error::CliError;
pub use output::OutputFormat;
