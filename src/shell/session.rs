//! The elevated shell channel.

use std::process::ExitStatus;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use tokio::process::ChildStderr;

use super::Shell;
use super::response::Response;
use crate::error::{Result, ShellError, SpawnError};
use crate::transport::{ProcessTransport, ShellConfig};

/// Sentinel echoed through the new shell to confirm it came up.
const READY_MARKER: &str = "__rootline_ready__";

/// Prefix for per-command drain sentinels.
const MARKER_PREFIX: &str = "__rootline_";

/// A long-lived channel to one elevated shell process.
///
/// Spawned once via the elevation helper; every command issued through the
/// same instance executes sequentially in that single process, so shell
/// state (working directory, exported variables) persists across calls.
///
/// All operations take `&mut self`: the exclusive borrow is the concurrency
/// guard, so two in-flight conversations over the same pipes cannot compile.
/// Wrap the shell in a `tokio::sync::Mutex` to share it across tasks.
///
/// Dropping the shell without [`close`](Shell::close) kills the child; an
/// orphaned privileged process is never left behind.
pub struct ElevatedShell {
    /// Configuration the child was spawned with.
    config: ShellConfig,

    /// Process transport (None once closed).
    transport: Option<ProcessTransport>,

    /// Deadline for read operations.
    timeout: Duration,

    /// Sequence number for drain sentinels.
    marker_seq: u64,
}

impl ElevatedShell {
    /// Spawn with the default configuration (`su`, no arguments).
    pub async fn spawn() -> Result<Self> {
        Self::open(ShellConfig::default()).await
    }

    /// Spawn with an explicit configuration.
    pub async fn spawn_with(config: ShellConfig) -> Result<Self> {
        Self::open(config).await
    }

    pub(crate) async fn open(config: ShellConfig) -> Result<Self> {
        let mut transport = ProcessTransport::spawn(&config)?;

        if config.probe {
            Self::await_ready(&mut transport, config.timeout).await?;
        }

        Ok(Self {
            timeout: config.timeout,
            transport: Some(transport),
            marker_seq: 0,
            config,
        })
    }

    /// Echo a sentinel through the freshly spawned shell and wait for it.
    ///
    /// Confirms the helper produced a live shell before the channel is
    /// handed to the caller. Startup banner lines ahead of the sentinel are
    /// discarded. A helper that exits before answering (elevation refused
    /// at the OS level, or by the user) is reported as a spawn failure
    /// carrying the exit status, not as a channel fault.
    async fn await_ready(transport: &mut ProcessTransport, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;

        let outcome = match transport.send(&format!("echo {READY_MARKER}")).await {
            Ok(()) => loop {
                match transport.read_line_until(deadline, timeout).await {
                    Ok(line) if line == READY_MARKER => break Ok(()),
                    Ok(banner) => trace!("startup banner: {:?}", banner),
                    Err(err) => break Err(err),
                }
            },
            Err(err) => Err(err),
        };

        outcome.map_err(|err| match transport.exit_status() {
            Some(status) => SpawnError::Refused { status }.into(),
            None => err,
        })?;

        debug!("elevated shell ready");
        Ok(())
    }

    /// Get the read deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set the read deadline for subsequent operations.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Get the configuration the child was spawned with.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Take the child's stderr handle to drain on an application task.
    ///
    /// The core holds stderr open but never reads it; `None` once taken or
    /// after close.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.transport.as_mut()?.take_stderr()
    }

    fn next_marker(&mut self) -> String {
        self.marker_seq += 1;
        format!("{}{}__", MARKER_PREFIX, self.marker_seq)
    }
}

impl Shell for ElevatedShell {
    async fn run(&mut self, command: &str) -> Result<Response> {
        let timeout = self.timeout;
        let transport = self.transport.as_mut().ok_or(ShellError::NotOpen)?;

        let start = Instant::now();
        transport.send(command).await?;
        let line = transport.read_line(timeout).await?;

        Ok(Response::new(command, line, start.elapsed()))
    }

    async fn run_no_output(&mut self, command: &str) -> Result<()> {
        let transport = self.transport.as_mut().ok_or(ShellError::NotOpen)?;
        transport.send(command).await
    }

    async fn run_drained(&mut self, command: &str) -> Result<Response> {
        let timeout = self.timeout;
        let marker = self.next_marker();
        let transport = self.transport.as_mut().ok_or(ShellError::NotOpen)?;

        let start = Instant::now();
        transport.send(command).await?;
        transport.send(&format!("echo {marker}")).await?;

        // One deadline covers the whole drain, not each line.
        let deadline = tokio::time::Instant::now() + timeout;
        let mut lines = Vec::new();
        loop {
            let line = transport.read_line_until(deadline, timeout).await?;
            if line == marker {
                break;
            }
            lines.push(line);
        }

        Ok(Response::new(command, lines.join("\n"), start.elapsed()))
    }

    async fn close(&mut self) -> Result<ExitStatus> {
        let mut transport = self.transport.take().ok_or(ShellError::NotOpen)?;

        // Ask the shell to exit; stdin EOF inside close() is the fallback.
        if let Err(err) = transport.send("exit").await {
            debug!("exit command not delivered: {err}");
        }

        transport.close(self.timeout).await
    }

    fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    fn is_alive(&mut self) -> bool {
        match self.transport.as_mut() {
            Some(transport) => transport.is_alive(),
            None => false,
        }
    }
}

impl Drop for ElevatedShell {
    fn drop(&mut self) {
        if self.transport.is_some() {
            warn!(
                "ElevatedShell for {:?} dropped without close(); child will be killed",
                self.config.helper
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ChannelError, Error};
    use crate::shell::ShellBuilder;

    /// A plain `sh` stands in for the elevation helper: same pipes, same
    /// line protocol, no privileges needed.
    async fn sh_shell() -> ElevatedShell {
        ShellBuilder::new()
            .helper("sh")
            .timeout(Duration::from_secs(5))
            .spawn()
            .await
            .expect("spawn sh")
    }

    /// A scripted test double that is not a shell (readiness probe off).
    async fn double(script: &str) -> ElevatedShell {
        ShellBuilder::new()
            .helper("sh")
            .args(["-c", script])
            .timeout(Duration::from_secs(5))
            .ready_probe(false)
            .spawn()
            .await
            .expect("spawn double")
    }

    #[tokio::test]
    async fn test_missing_helper_propagates_spawn_error() {
        let err = ShellBuilder::new()
            .helper("rootline-no-such-helper")
            .spawn()
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, Error::Spawn(SpawnError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_refusing_helper_is_never_usable() {
        let err = ShellBuilder::new()
            .helper("sh")
            .args(["-c", "exit 7"])
            .timeout(Duration::from_secs(5))
            .spawn()
            .await
            .map(|_| ())
            .unwrap_err();

        match err {
            Error::Spawn(SpawnError::Refused { status }) => {
                assert_eq!(status.code(), Some(7));
            }
            other => panic!("expected Refused, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_echo_double_one_line_per_call() {
        let mut shell =
            double("while IFS= read -r l; do echo \"mark:$l\"; done").await;

        let first = shell.run("x").await.unwrap();
        assert_eq!(first.result, "mark:x");

        // Never a stale or duplicated line.
        let second = shell.run("y").await.unwrap();
        assert_eq!(second.result, "mark:y");
    }

    #[tokio::test]
    async fn test_run_no_output_never_blocks() {
        let mut shell = double("while IFS= read -r l; do :; done").await;

        tokio::time::timeout(Duration::from_secs(1), shell.run_no_output("anything"))
            .await
            .expect("run_no_output must not wait for output")
            .unwrap();
    }

    #[tokio::test]
    async fn test_state_persists_across_calls() {
        let mut shell = sh_shell().await;

        shell.run_no_output("STATE=probe42").await.unwrap();
        let response = shell.run("echo $STATE").await.unwrap();
        assert_eq!(response.result, "probe42");

        shell.run_no_output("cd /").await.unwrap();
        let response = shell.run("pwd").await.unwrap();
        assert_eq!(response.result, "/");
    }

    #[tokio::test]
    async fn test_round_trip_echo() {
        let mut shell = sh_shell().await;
        let response = shell.run("echo probe123").await.unwrap();
        assert_eq!(response.result, "probe123");
    }

    #[tokio::test]
    async fn test_child_exit_between_calls_is_typed() {
        let mut shell = sh_shell().await;

        let first = shell.run("echo one").await.unwrap();
        assert_eq!(first.result, "one");

        shell.run_no_output("exit 0").await.unwrap();

        let err = shell.run("echo two").await.unwrap_err();
        assert!(matches!(err, Error::Channel(ChannelError::Closed)));
        assert!(!shell.is_alive());
        assert!(shell.is_open());
    }

    #[tokio::test]
    async fn test_silent_command_times_out() {
        let mut shell = sh_shell().await;
        shell.set_timeout(Duration::from_millis(100));

        let err = shell.run("true").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Channel(ChannelError::ReadTimeout(_))
        ));
    }

    #[tokio::test]
    async fn test_run_drained_consumes_all_lines() {
        let mut shell = sh_shell().await;

        let response = shell.run_drained("printf 'a\\nb\\nc\\n'").await.unwrap();
        assert_eq!(response.result, "a\nb\nc");
        assert_eq!(response.lines().count(), 3);

        // Nothing left in the stream to misattribute to the next call.
        let after = shell.run("echo after").await.unwrap();
        assert_eq!(after.result, "after");
    }

    #[tokio::test]
    async fn test_run_drained_empty_output() {
        let mut shell = sh_shell().await;
        let response = shell.run_drained("true").await.unwrap();
        assert_eq!(response.result, "");
    }

    #[tokio::test]
    async fn test_run_batch_sequential() {
        let mut shell = sh_shell().await;
        let responses = shell
            .run_batch(&["echo one", "echo two"])
            .await
            .unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].result, "one");
        assert_eq!(responses[1].result, "two");
    }

    #[tokio::test]
    async fn test_close_reaps_child_and_marks_not_open() {
        let mut shell = sh_shell().await;

        let status = shell.close().await.unwrap();
        assert!(status.success());
        assert!(!shell.is_open());
        assert!(!shell.is_alive());

        let err = shell.run("echo late").await.unwrap_err();
        assert!(matches!(err, Error::Shell(ShellError::NotOpen)));
    }

    #[tokio::test]
    async fn test_take_stderr_once() {
        let mut shell = sh_shell().await;
        assert!(shell.take_stderr().is_some());
        assert!(shell.take_stderr().is_none());
    }
}
