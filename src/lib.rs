//! # Rootline
//!
//! Async privileged shell channel for long-lived elevated command execution.
//!
//! Rootline spawns one elevated shell process through an external elevation
//! helper (`su` by default) and keeps it alive, so any number of commands can
//! be sent over the same channel without re-spawning the privileged process
//! per command, with no repeated permission prompts and no per-command
//! process-creation cost.
//!
//! ## Features
//!
//! - Single spawn, many commands: shell state persists across calls
//! - Newline-delimited request/response protocol over the child's pipes
//! - Deadline-bounded reads: a hung command never stalls the caller forever
//! - Typed errors: "printed nothing" is never conflated with "channel died"
//! - Scoped teardown: `close()` reaps the child, drop kills it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rootline::{Shell, ShellBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), rootline::Error> {
//!     let mut shell = ShellBuilder::new().spawn().await?;
//!
//!     let response = shell.run("id -u").await?;
//!     println!("{}", response.result);
//!
//!     shell.run_no_output("mount -o remount,rw /system").await?;
//!
//!     shell.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod shell;
pub mod transport;

// Re-export main types for convenience
pub use error::Error;
pub use shell::{ElevatedShell, Response, Shell, ShellBuilder};
pub use transport::ShellConfig;
