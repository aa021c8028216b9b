//! Child-process transport wrapping tokio::process.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::{debug, trace, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::Instant;

use super::config::ShellConfig;
use crate::channel::LineBuffer;
use crate::error::{ChannelError, Result, SpawnError};

/// Size of a single pipe read.
const READ_CHUNK: usize = 4096;

/// Transport over one elevated child process and its standard streams.
///
/// Owns all three stream handles exclusively. Stdout is framed into lines
/// through a [`LineBuffer`]; stderr is held open but never drained here.
/// The application can take the handle and drain it on its own task.
pub struct ProcessTransport {
    /// The child process handle.
    child: Child,

    /// The child's stdin, commands are written here.
    stdin: ChildStdin,

    /// The child's stdout, read in chunks into the line buffer.
    stdout: ChildStdout,

    /// The child's stderr, held open until taken or closed.
    stderr: Option<ChildStderr>,

    /// Line framer over stdout bytes.
    buffer: LineBuffer,
}

impl ProcessTransport {
    /// Spawn the elevation helper with all three standard streams piped.
    ///
    /// The child is configured with `kill_on_drop` so an early drop of the
    /// transport cannot leave an orphaned privileged process behind.
    pub fn spawn(config: &ShellConfig) -> Result<Self> {
        debug!("spawning elevation helper: {}", config.command_line());

        let mut child = Command::new(&config.helper)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| SpawnError::Spawn {
                helper: config.helper.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or(SpawnError::Stdio { stream: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(SpawnError::Stdio { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(SpawnError::Stdio { stream: "stderr" })?;

        Ok(Self {
            child,
            stdin,
            stdout,
            stderr: Some(stderr),
            buffer: LineBuffer::new(),
        })
    }

    /// Write one command line to the child's stdin and flush.
    ///
    /// Exactly one newline is appended. A broken pipe means the child is
    /// gone and is reported as [`ChannelError::Closed`].
    pub async fn send(&mut self, line: &str) -> Result<()> {
        trace!("send: {:?}", line);

        let io = async {
            self.stdin.write_all(line.as_bytes()).await?;
            self.stdin.write_all(b"\n").await?;
            self.stdin.flush().await
        }
        .await;

        io.map_err(|e| {
            if e.kind() == io::ErrorKind::BrokenPipe {
                ChannelError::Closed
            } else {
                ChannelError::Io(e)
            }
        })?;

        Ok(())
    }

    /// Read one line from the child's stdout, bounded by `timeout`.
    pub async fn read_line(&mut self, timeout: Duration) -> Result<String> {
        self.read_line_until(Instant::now() + timeout, timeout).await
    }

    /// Read one line from the child's stdout, bounded by an absolute deadline.
    ///
    /// Used directly when several reads share one deadline (draining until a
    /// sentinel). Returns [`ChannelError::ReadTimeout`] when the deadline
    /// passes and [`ChannelError::Closed`] on end-of-stream before a full
    /// line arrived.
    pub async fn read_line_until(
        &mut self,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<String> {
        loop {
            if let Some(line) = self.buffer.pop_line() {
                trace!("recv: {:?}", line);
                return Ok(line);
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = tokio::time::timeout_at(deadline, self.stdout.read(&mut chunk))
                .await
                .map_err(|_| ChannelError::ReadTimeout(timeout))?
                .map_err(ChannelError::Io)?;

            if n == 0 {
                // EOF with no complete line buffered: the child closed stdout.
                return Err(ChannelError::Closed.into());
            }

            self.buffer.extend(&chunk[..n]);
        }
    }

    /// Take the child's stderr handle, leaving it to the caller to drain.
    ///
    /// Returns `None` if it was already taken.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Check whether the child process is still running.
    pub fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// The child's exit status if it has already terminated.
    pub fn exit_status(&mut self) -> Option<ExitStatus> {
        self.child.try_wait().ok().flatten()
    }

    /// Close the transport: signal EOF on stdin, wait for the child to exit
    /// within `grace`, and kill it on overrun.
    pub async fn close(self, grace: Duration) -> Result<ExitStatus> {
        let Self {
            mut child, stdin, ..
        } = self;

        // Closing stdin is the exit signal for an interactive shell.
        drop(stdin);

        match tokio::time::timeout(grace, child.wait()).await {
            Ok(status) => {
                let status = status.map_err(ChannelError::Io)?;
                debug!("child exited: {}", status);
                Ok(status)
            }
            Err(_) => {
                warn!("child did not exit within {:?}, killing", grace);
                child.kill().await.map_err(ChannelError::Io)?;
                Ok(child.wait().await.map_err(ChannelError::Io)?)
            }
        }
    }
}
