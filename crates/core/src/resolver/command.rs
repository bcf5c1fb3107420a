//! Resolver backed by an external command.

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use super::config::ResolverConfig;
use super::{count_identifiers, ResolvedList, Resolver, ResolverError};
use crate::process::{describe_exit, StreamingChild};
use crate::progress::ProgressReporter;
use crate::workarea::WorkingArea;

/// Runs the configured resolver with the working area as current directory.
pub struct CommandResolver {
    config: ResolverConfig,
}

impl CommandResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ResolverConfig::default())
    }
}

#[async_trait]
impl Resolver for CommandResolver {
    fn name(&self) -> &str {
        "command"
    }

    async fn resolve(
        &self,
        input: &Path,
        queries: usize,
        area: &WorkingArea,
        reporter: &mut ProgressReporter,
    ) -> Result<ResolvedList, ResolverError> {
        let program = self.config.command.display_name();
        let mut command = self.config.command.command();
        command.arg(input).current_dir(area.root());

        info!("Resolving {} songs with {}", queries, program);
        let mut child = StreamingChild::spawn(command).map_err(|source| ResolverError::Spawn {
            program: program.clone(),
            source,
        })?;

        while let Some(line) = child.next_line().await {
            debug!("{}: {}", program, line.text);
            reporter.log(line.text).await;
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(ResolverError::Failed {
                program,
                status: describe_exit(&status),
            });
        }

        let path = area.root().join(&self.config.output_file);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ResolverError::MissingOutput {
                path: path.clone(),
                source,
            })?;

        let (identifiers, not_found) = count_identifiers(&contents);
        if identifiers == 0 {
            return Err(ResolverError::NoIdentifiers { queries });
        }

        info!(
            "Resolved {} identifiers ({} not found) from {} songs",
            identifiers, not_found, queries
        );
        Ok(ResolvedList {
            path,
            identifiers,
            not_found,
        })
    }
}
