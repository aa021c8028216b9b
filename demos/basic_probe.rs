//! Basic example: open an elevated shell and probe it
//!
//! This example demonstrates the basic usage of rootline to obtain a
//! privileged shell once and issue several commands through it.
//!
//! # Prerequisites
//!
//! - An elevation helper on PATH (`su` by default)
//!
//! # Usage
//!
//! ```bash
//! cargo run --example basic_probe
//! cargo run --example basic_probe -- sudo -s
//! # No privileges needed to try it out:
//! cargo run --example basic_probe -- sh
//! ```

use std::env;
use std::time::Duration;

use rootline::{Shell, ShellBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (set RUST_LOG=trace to watch the line traffic)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // First CLI argument overrides the helper, the rest are its arguments
    let mut argv = env::args().skip(1);
    let helper = argv.next().unwrap_or_else(|| "su".to_string());

    println!("Spawning elevated shell via {helper}...");

    let mut shell = ShellBuilder::new()
        .helper(&helper)
        .args(argv)
        .timeout(Duration::from_secs(10))
        .spawn()
        .await?;

    let response = shell.run("id -u").await?;
    println!("uid: {} ({:?})", response.result, response.elapsed);

    // Shell state persists across calls over the same channel
    shell.run_no_output("cd /").await?;
    let response = shell.run("pwd").await?;
    println!("cwd: {}", response.result);

    let status = shell.close().await?;
    println!("shell exited: {status}");

    Ok(())
}
