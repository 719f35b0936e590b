//! briefwright CLI: turn a request into a vetted, renderer-agnostic content package.
//!
//! Sources are searched, vetted and harvested until the request is backed
//! well enough; the outline is normalized into bounded slides and only
//! meaningful charts are kept.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
