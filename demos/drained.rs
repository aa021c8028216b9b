//! Multi-line output example: drain a command's full output
//!
//! `run` reads exactly one response line per command. For commands that
//! emit several lines, `run_drained` issues a sentinel after the command
//! and collects everything up to it.
//!
//! # Usage
//!
//! ```bash
//! # No privileges needed to try it out:
//! cargo run --example drained -- sh
//! ```

use std::env;
use std::time::Duration;

use rootline::{Shell, ShellBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let helper = env::args().nth(1).unwrap_or_else(|| "su".to_string());

    let mut shell = ShellBuilder::new()
        .helper(&helper)
        .timeout(Duration::from_secs(10))
        .spawn()
        .await?;

    let response = shell.run_drained("ls -1 /").await?;
    println!("{} entries under /:", response.lines().count());
    for line in response.lines() {
        println!("  {line}");
    }

    shell.close().await?;
    Ok(())
}
