pub mod acquisition;
pub mod archiver;
pub mod availability;
pub mod config;
pub mod converter;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod request;
pub mod resolver;
pub mod testing;
pub mod transcode;
pub mod workarea;

pub use acquisition::{
    AcquisitionConfig, AcquisitionError, AcquisitionSummary, AcquisitionTracker, Acquirer,
    CommandAcquirer, CompletionCounter, LineClassifier, LineKind, MarkerClassifier,
};
pub use archiver::{
    Archiver, ArchiverBackend, ArchiverConfig, ArchiverError, BuiltinArchiver, CommandArchiver,
};
pub use availability::{AvailabilityConfig, AvailabilityReport, ToolAvailability, ToolStatus};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    ServerConfig,
};
pub use converter::{
    AudioFormat, ConversionJob, ConversionResult, Converter, ConverterConfig, ConverterError,
    FfmpegConverter,
};
pub use pipeline::{DownloadPipeline, PipelineConfig, PipelineError, PipelineOutcome};
pub use process::{OutputLine, OutputSource, StreamingChild, ToolCommand};
pub use progress::{progress_channel, ProgressEvent, ProgressReporter, Stage};
pub use request::{DownloadRequest, InputError, SongList};
pub use resolver::{CommandResolver, ResolvedList, Resolver, ResolverConfig, ResolverError};
pub use transcode::{TranscodeError, TranscodeSummary, TranscodeTarget};
pub use workarea::{WorkAreaError, WorkingArea};
