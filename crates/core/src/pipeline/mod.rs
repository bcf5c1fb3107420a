//! Download-and-package pipeline.
//!
//! Sequences the stages of one request:
//!
//! ```text
//! INIT -> (RESOLVE)? -> ACQUIRE -> TRANSCODE -> ARCHIVE -> COMPLETE
//! ```
//!
//! Any stage failure short-circuits to a single terminal error event. The
//! working area is released on every path before the terminal event is sent.

mod config;
mod error;
mod runner;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use runner::{archive_filename, DownloadPipeline, PipelineOutcome};
