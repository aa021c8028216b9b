//! Process transport layer wrapping tokio::process.
//!
//! This module provides the low-level child process management,
//! handling helper spawn, line traffic over the pipes, and teardown.

pub mod config;
mod process;

pub use config::ShellConfig;
pub use process::ProcessTransport;
