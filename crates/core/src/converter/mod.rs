//! Audio transcoding.
//!
//! This module provides the `Converter` trait and an FFmpeg-backed
//! implementation that re-encodes one audio file into the requested target
//! format.
//!
//! # Example
//!
//! ```ignore
//! use songbundle_core::converter::{AudioFormat, ConversionJob, Converter, FfmpegConverter};
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let job = ConversionJob::new("/work/downloads/a.m4a", "/work/output/a.mp3", AudioFormat::Mp3);
//! let result = converter.convert(job).await?;
//! println!("Converted in {} ms", result.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{AudioFormat, ConversionJob, ConversionResult};
