//! Elevation helper configuration.

use std::time::Duration;

/// Configuration for spawning the elevated shell process.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Elevation helper binary (default: `su`).
    pub helper: String,

    /// Arguments passed to the helper.
    pub args: Vec<String>,

    /// Deadline for read operations, including the readiness probe at spawn.
    pub timeout: Duration,

    /// Whether to run the readiness handshake after spawning.
    ///
    /// The handshake echoes a sentinel through the new shell and waits for
    /// it to come back, which confirms the helper actually produced a live
    /// shell (and surfaces an immediate elevation refusal as a spawn
    /// failure). Disable only when the helper does not start a POSIX shell.
    pub probe: bool,
}

impl ShellConfig {
    /// Create a configuration for the given helper binary with no arguments.
    pub fn new(helper: impl Into<String>) -> Self {
        Self {
            helper: helper.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(30),
            probe: true,
        }
    }

    /// The full command line, for diagnostics.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.helper.clone()
        } else {
            format!("{} {}", self.helper, self.args.join(" "))
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::new("su")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_helper_is_su() {
        let config = ShellConfig::default();
        assert_eq!(config.helper, "su");
        assert!(config.args.is_empty());
    }

    #[test]
    fn test_command_line_joins_args() {
        let mut config = ShellConfig::new("sudo");
        config.args = vec!["-s".into()];
        assert_eq!(config.command_line(), "sudo -s");
    }
}
