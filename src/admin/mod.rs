mod commands;
mod panel;

pub use commands::Command;

use crate::config::Config;
use anyhow::Result;
use panel::Panel;

pub async fn run(command: Command, config: &Config) -> Result<()> {
    let panel = Panel::open(config).await?;
    panel.handle(command).await
}
