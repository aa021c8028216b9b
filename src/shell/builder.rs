//! Builder for creating shell channels.

use std::time::Duration;

use super::session::ElevatedShell;
use crate::error::Result;
use crate::transport::ShellConfig;

/// Builder for constructing an [`ElevatedShell`].
///
/// # Example
///
/// ```rust,no_run
/// use rootline::ShellBuilder;
///
/// # async fn example() -> Result<(), rootline::Error> {
/// let shell = ShellBuilder::new()
///     .helper("sudo")
///     .arg("-s")
///     .timeout(std::time::Duration::from_secs(10))
///     .spawn()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ShellBuilder {
    config: ShellConfig,
}

impl ShellBuilder {
    /// Create a new builder with the default helper (`su`, no arguments).
    pub fn new() -> Self {
        Self {
            config: ShellConfig::default(),
        }
    }

    /// Set the elevation helper binary.
    pub fn helper(mut self, helper: impl Into<String>) -> Self {
        self.config.helper = helper.into();
        self
    }

    /// Append one argument for the helper.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.config.args.push(arg.into());
        self
    }

    /// Append several arguments for the helper.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the read deadline (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Enable or disable the readiness handshake (default: enabled).
    ///
    /// Disable when the helper does not start a POSIX shell and so cannot
    /// answer the sentinel `echo`.
    pub fn ready_probe(mut self, probe: bool) -> Self {
        self.config.probe = probe;
        self
    }

    /// Spawn the elevated shell process and wait for it to become ready.
    pub async fn spawn(self) -> Result<ElevatedShell> {
        ElevatedShell::open(self.config).await
    }
}

impl Default for ShellBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_config() {
        let builder = ShellBuilder::new()
            .helper("sudo")
            .arg("-n")
            .args(["-u", "root"])
            .timeout(Duration::from_secs(3))
            .ready_probe(false);

        assert_eq!(builder.config.helper, "sudo");
        assert_eq!(builder.config.args, vec!["-n", "-u", "root"]);
        assert_eq!(builder.config.timeout, Duration::from_secs(3));
        assert!(!builder.config.probe);
    }
}
