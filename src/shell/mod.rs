//! High-level shell channel API.
//!
//! The shell layer provides the main API for sending command lines to
//! the elevated process and reading response lines back.

mod builder;
pub(crate) mod response;
mod session;

pub use builder::ShellBuilder;
pub use response::Response;
pub use session::ElevatedShell;

use std::future::Future;
use std::process::ExitStatus;

use crate::error::Result;

/// Trait for shell channels.
pub trait Shell: Send {
    /// Send a command line and read exactly one response line.
    ///
    /// One line per call is a hard contract: a command that emits more than
    /// one line leaves the surplus in the stream for the next call to
    /// misread. Use [`run_drained`](Self::run_drained) for multi-line
    /// commands.
    fn run(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send a command line without reading any response.
    ///
    /// Returns as soon as the line is written and flushed; never waits for
    /// output.
    fn run_no_output(&mut self, command: &str) -> impl Future<Output = Result<()>> + Send;

    /// Send a command line and read response lines until the command's
    /// output is exhausted.
    ///
    /// A sentinel `echo` is issued after the command; everything up to the
    /// sentinel becomes the result. The whole drain shares one deadline.
    /// The command's output must end with a newline, or the sentinel fuses
    /// onto its last line and the drain runs into the deadline.
    fn run_drained(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send multiple commands sequentially, one response line each.
    fn run_batch(
        &mut self,
        commands: &[&str],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send {
        async move {
            let mut responses = Vec::with_capacity(commands.len());
            for cmd in commands {
                responses.push(self.run(cmd).await?);
            }
            Ok(responses)
        }
    }

    /// Close the channel: tear down the streams and reap the child.
    fn close(&mut self) -> impl Future<Output = Result<ExitStatus>> + Send;

    /// Check if the channel is open (not yet closed).
    fn is_open(&self) -> bool;

    /// Check if the channel is open and its child process is still running.
    ///
    /// A `false` from a previously-open shell means the child exited on its
    /// own; the next operation will fail with a channel error.
    fn is_alive(&mut self) -> bool;
}
