//! Error types for rootline.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Main error type for rootline operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Child process spawn errors
    #[error("Spawn error: {0}")]
    Spawn(#[from] SpawnError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Shell-level errors
    #[error("Shell error: {0}")]
    Shell(#[from] ShellError),
}

/// Spawn layer errors (launching the elevation helper).
///
/// Always fatal to construction: a shell is never handed to the caller
/// with a dead or half-wired child behind it.
#[derive(Error, Debug)]
pub enum SpawnError {
    /// The helper binary could not be launched
    #[error("Failed to spawn elevation helper '{helper}': {source}")]
    Spawn {
        helper: String,
        #[source]
        source: io::Error,
    },

    /// A piped standard stream handle was not available on the child
    #[error("Child process is missing its {stream} handle")]
    Stdio { stream: &'static str },

    /// The helper launched but exited during startup, before the shell
    /// became ready. Typically the OS or the user refused elevation.
    #[error("Elevation helper exited during startup: {status}")]
    Refused { status: std::process::ExitStatus },
}

/// Channel layer errors (line traffic over the child's standard streams).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Write, flush, or read on a process stream failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The child's stdout reached end-of-stream before a full line arrived,
    /// or its stdin pipe broke mid-write. The process is gone.
    #[error("Channel closed")]
    Closed,

    /// No output line arrived within the deadline
    #[error("No output line within {0:?}")]
    ReadTimeout(Duration),
}

/// Shell layer errors (lifecycle misuse).
#[derive(Error, Debug)]
pub enum ShellError {
    /// Operation on a shell that has been closed
    #[error("Shell not open - close() was already called")]
    NotOpen,
}

/// Result type alias using rootline's Error.
pub type Result<T> = std::result::Result<T, Error>;
