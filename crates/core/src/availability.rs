//! Memoized check that the external tools are installed.
//!
//! Probing walks `PATH` for every tool, so the last report is cached and
//! only refreshed once it is older than the configured freshness window.
//! The walk itself runs on the blocking pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::archiver::ArchiverBackend;
use crate::config::Config;

/// Locates a program, returning its resolved path when installed.
pub type ToolProbe = Arc<dyn Fn(&Path) -> Option<PathBuf> + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityConfig {
    /// Freshness window for the cached report, in seconds.
    #[serde(default = "default_cache_secs")]
    pub cache_secs: u64,
}

fn default_cache_secs() -> u64 {
    30
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            cache_secs: default_cache_secs(),
        }
    }
}

/// Availability of one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    /// Pipeline role, e.g. "acquisition".
    pub role: String,
    pub program: PathBuf,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub all_available: bool,
    pub tools: Vec<ToolStatus>,
    pub checked_at: DateTime<Utc>,
}

struct CachedReport {
    at: Instant,
    report: AvailabilityReport,
}

/// Cached availability of the pipeline's external tools.
pub struct ToolAvailability {
    tools: Vec<(String, PathBuf)>,
    probe: ToolProbe,
    freshness: Duration,
    cache: Mutex<Option<CachedReport>>,
}

impl ToolAvailability {
    /// `tools` are (role, program) pairs.
    pub fn new(tools: Vec<(String, PathBuf)>, freshness: Duration) -> Self {
        Self::with_probe(
            tools,
            freshness,
            Arc::new(|program: &Path| which::which(program).ok()),
        )
    }

    pub fn with_probe(tools: Vec<(String, PathBuf)>, freshness: Duration, probe: ToolProbe) -> Self {
        Self {
            tools,
            probe,
            freshness,
            cache: Mutex::new(None),
        }
    }

    /// Checks every tool the configured pipeline will invoke.
    pub fn from_config(config: &Config) -> Self {
        let mut tools = vec![
            (
                "resolver".to_string(),
                config.resolver.command.program.clone(),
            ),
            (
                "acquisition".to_string(),
                config.acquisition.command.program.clone(),
            ),
            (
                "transcoder".to_string(),
                config.transcoder.ffmpeg_path.clone(),
            ),
        ];
        if config.archiver.backend == ArchiverBackend::Command {
            tools.push((
                "archiver".to_string(),
                config.archiver.command.program.clone(),
            ));
        }
        Self::new(tools, Duration::from_secs(config.availability.cache_secs))
    }

    /// Whether every tool is installed, using the cached report when fresh.
    pub async fn is_available(&self) -> bool {
        self.report().await.all_available
    }

    /// Current report, re-probing only when the cached one is stale.
    ///
    /// Concurrent callers queue on the cache lock, so a stale report is
    /// probed once.
    pub async fn report(&self) -> AvailabilityReport {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.at.elapsed() < self.freshness {
                return cached.report.clone();
            }
        }

        let tools = self.tools.clone();
        let probe = Arc::clone(&self.probe);
        let report = match tokio::task::spawn_blocking(move || probe_tools(&tools, &probe)).await {
            Ok(report) => report,
            Err(e) => {
                error!("Tool availability check failed: {}", e);
                return unavailable_report(&self.tools);
            }
        };

        *cache = Some(CachedReport {
            at: Instant::now(),
            report: report.clone(),
        });
        report
    }
}

fn probe_tools(tools: &[(String, PathBuf)], probe: &ToolProbe) -> AvailabilityReport {
    let tools: Vec<ToolStatus> = tools
        .iter()
        .map(|(role, program)| {
            let resolved_path = probe(program);
            if resolved_path.is_none() {
                warn!("{} tool {} is not installed", role, program.display());
            }
            ToolStatus {
                role: role.clone(),
                program: program.clone(),
                available: resolved_path.is_some(),
                resolved_path,
            }
        })
        .collect();

    let all_available = tools.iter().all(|t| t.available);
    debug!("Probed {} tools, all available: {}", tools.len(), all_available);
    AvailabilityReport {
        all_available,
        tools,
        checked_at: Utc::now(),
    }
}

/// Report used when the check itself could not run. Not cached.
fn unavailable_report(tools: &[(String, PathBuf)]) -> AvailabilityReport {
    AvailabilityReport {
        all_available: false,
        tools: tools
            .iter()
            .map(|(role, program)| ToolStatus {
                role: role.clone(),
                program: program.clone(),
                available: false,
                resolved_path: None,
            })
            .collect(),
        checked_at: Utc::now(),
    }
}
