//! Archiver backed by an external `zip` command.

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use super::{Archiver, ArchiverError};
use crate::process::{describe_exit, StreamingChild, ToolCommand};
use crate::progress::ProgressReporter;

/// Runs `<program> <args...> <archive> .` inside the source directory.
pub struct CommandArchiver {
    command: ToolCommand,
}

impl CommandArchiver {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl Archiver for CommandArchiver {
    fn name(&self) -> &str {
        "command"
    }

    async fn archive(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        reporter: &mut ProgressReporter,
    ) -> Result<(), ArchiverError> {
        let program = self.command.display_name();
        let mut command = self.command.command();
        command.arg(archive_path).arg(".").current_dir(source_dir);

        info!("Archiving {} with {}", source_dir.display(), program);
        let mut child = StreamingChild::spawn(command).map_err(|source| ArchiverError::Spawn {
            program: program.clone(),
            source,
        })?;

        while let Some(line) = child.next_line().await {
            debug!("{}: {}", program, line.text);
            reporter.log(line.text).await;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(ArchiverError::Failed {
                program,
                status: describe_exit(&status),
            });
        }
        Ok(())
    }
}
