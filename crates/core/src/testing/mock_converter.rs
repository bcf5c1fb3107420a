//! Mock converter for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::converter::{ConversionJob, ConversionResult, Converter, ConverterError};

/// A recorded conversion job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConversion {
    /// The job that was submitted.
    pub job: ConversionJob,
    /// Whether the conversion succeeded.
    pub success: bool,
}

/// Mock implementation of the Converter trait.
///
/// Successful conversions write a small placeholder file at the job's
/// output path so later stages find real files.
///
/// # Example
///
/// ```rust,ignore
/// use songbundle_core::testing::MockConverter;
///
/// let converter = MockConverter::new();
/// converter.fail_on_call(3).await;
///
/// let conversions = converter.recorded_conversions().await;
/// assert!(!conversions[2].success);
/// ```
#[derive(Debug, Clone)]
pub struct MockConverter {
    /// Recorded conversions.
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// 1-based call number that fails.
    fail_on_call: Arc<RwLock<Option<usize>>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            fail_on_call: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded conversions.
    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    /// Jobs submitted so far, failed ones included.
    pub async fn jobs(&self) -> Vec<ConversionJob> {
        self.conversions
            .read()
            .await
            .iter()
            .map(|r| r.job.clone())
            .collect()
    }

    /// Get the number of conversions attempted.
    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make the `n`-th conversion (1-based) fail.
    pub async fn fail_on_call(&self, n: usize) {
        *self.fail_on_call.write().await = Some(n);
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<ConverterError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn convert(&self, job: ConversionJob) -> Result<ConversionResult, ConverterError> {
        let call = self.conversions.read().await.len() + 1;
        let fail_now = *self.fail_on_call.read().await == Some(call);
        let error = match self.take_error().await {
            Some(err) => Some(err),
            None if fail_now => Some(ConverterError::conversion_failed(
                "mock conversion failure",
                None,
            )),
            None => None,
        };

        if let Some(err) = error {
            self.conversions.write().await.push(RecordedConversion {
                job,
                success: false,
            });
            return Err(err);
        }

        let contents = format!("converted:{}", job.input_path.display());
        tokio::fs::write(&job.output_path, contents.as_bytes()).await?;

        self.conversions.write().await.push(RecordedConversion {
            job: job.clone(),
            success: true,
        });

        Ok(ConversionResult {
            output_path: job.output_path,
            output_size_bytes: contents.len() as u64,
            duration_ms: 0,
            input_format: job
                .input_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("unknown")
                .to_string(),
            output_format: job.format,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::AudioFormat;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_basic_conversion() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        let job = ConversionJob::new(
            dir.path().join("in.m4a"),
            dir.path().join("out.mp3"),
            AudioFormat::Mp3,
        );

        let result = converter.convert(job).await.unwrap();
        assert_eq!(result.output_format, AudioFormat::Mp3);
        assert_eq!(result.input_format, "m4a");
        assert!(dir.path().join("out.mp3").exists());
        assert_eq!(converter.conversion_count().await, 1);
    }

    #[tokio::test]
    async fn test_fail_on_call() {
        let dir = TempDir::new().unwrap();
        let converter = MockConverter::new();
        converter.fail_on_call(2).await;

        for i in 0..3 {
            let job = ConversionJob::new(
                dir.path().join(format!("{}.m4a", i)),
                dir.path().join(format!("{}.mp3", i)),
                AudioFormat::Mp3,
            );
            let result = converter.convert(job).await;
            assert_eq!(result.is_ok(), i != 1);
        }

        let recorded = converter.recorded_conversions().await;
        assert_eq!(
            recorded.iter().map(|r| r.success).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }

    #[tokio::test]
    async fn test_next_error_is_consumed() {
        let converter = MockConverter::new();
        converter
            .set_next_error(ConverterError::Timeout { timeout_secs: 1 })
            .await;
        assert!(converter.validate().await.is_err());
        assert!(converter.validate().await.is_ok());
    }
}
