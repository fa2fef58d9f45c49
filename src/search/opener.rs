//! Opening result links with an external command

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Something that can open a result link
#[async_trait]
pub trait Opener: Send + Sync {
    async fn open(&self, link: &str) -> Result<()>;
}

/// Opens links by running `<command> <link>`, discarding its output
#[derive(Debug, Clone)]
pub struct CommandOpener {
    command: String,
}

impl CommandOpener {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for CommandOpener {
    fn default() -> Self {
        Self::new(crate::config::default_goto_command())
    }
}

#[async_trait]
impl Opener for CommandOpener {
    async fn open(&self, link: &str) -> Result<()> {
        debug!("Opening {} with {}", link, self.command);

        let status = Command::new(&self.command)
            .arg(link)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            bail!("{}", status);
        }
        Ok(())
    }
}
