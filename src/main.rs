//! anifetch
//!
//! Plays a video as terminal art next to your system information.
//!
//! # Usage
//!
//! ```bash
//! anifetch -f video.mp4 -W 40 -H 20 -r 10
//! anifetch -f video.mp4 --sound --force-render
//! anifetch -f video.mp4 --inspect
//! ```

use anyhow::Result;
use clap::Parser;

use anifetch::cli::{commands, Cli};

/// Main entry point for the anifetch CLI application
fn main() -> Result<()> {
    let cli = Cli::parse();
    commands::run(cli)
}
