//! The batch conversion driver.
//!
//! Processes discovered files strictly sequentially: one file at a time,
//! one request in flight. Each file gets exactly one attempt per run; a
//! failure is recorded in the run log and the batch moves on. Only errors
//! outside the per-file loop (directory access, configuration) are fatal,
//! and those never reach this module.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::discovery::DiscoveredFile;
use crate::error::{ConfigError, ConvertError};
use crate::llm::{ImageInput, VisionProvider, VisionRequest};
use crate::runlog::RunLog;

/// Settings for one batch run, assembled from config and CLI flags.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// System instructions sent with every request
    pub system_prompt: String,
    /// User-turn instruction accompanying each image
    pub user_prompt: String,
    /// Maximum tokens per completion
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum source file size in megabytes
    pub max_file_size_mb: u64,
    /// Redirect Markdown output here instead of the source directory
    pub output_dir: Option<PathBuf>,
}

impl ConvertOptions {
    /// Build options from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            system_prompt: config.system_prompt()?,
            user_prompt: crate::prompt::USER_PROMPT.to_string(),
            max_tokens: config.prompt.max_tokens,
            temperature: config.prompt.temperature,
            timeout_ms: config.limits.request_timeout_ms,
            max_file_size_mb: config.limits.max_file_size_mb,
            output_dir: config.output_dir(),
        })
    }
}

/// Outcome of one file's conversion attempt.
#[derive(Debug)]
pub enum FileOutcome {
    /// Markdown written to the given path
    Succeeded { output: PathBuf, latency_ms: u64 },
    /// Attempt failed; the batch continued
    Failed(ConvertError),
}

/// Counters for one batch run.
///
/// Invariant: `discovered == succeeded + failed` once the run completes.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    /// Files matching the allow-list at batch start
    pub discovered: usize,
    /// Files whose Markdown was written
    pub succeeded: usize,
    /// Files whose single attempt failed
    pub failed: usize,
    /// Wall-clock duration of the batch
    pub duration: Duration,
}

impl RunSummary {
    /// True when at least one file was attempted and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.discovered > 0 && self.succeeded == 0
    }
}

/// Destination path for a source image's Markdown: same base name with the
/// `.md` extension, in the source directory unless redirected.
pub fn output_path(source: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = source.with_extension("md");
    match output_dir {
        Some(dir) => dir.join(file_name.file_name().unwrap_or(file_name.as_os_str())),
        None => file_name,
    }
}

/// Convert a batch of discovered files, one at a time.
///
/// Per file: read bytes, encode, send a single request bounded by the
/// configured timeout, persist the response as `<basename>.md`
/// (overwriting any previous output), and append the outcome to the run
/// log. `on_outcome` fires after each file so the CLI can advance its
/// progress display.
pub async fn convert_files<F>(
    files: &[DiscoveredFile],
    provider: &dyn VisionProvider,
    options: &ConvertOptions,
    log: &mut RunLog,
    mut on_outcome: F,
) -> RunSummary
where
    F: FnMut(&Path, &FileOutcome),
{
    let start = Instant::now();
    let mut succeeded = 0usize;
    let mut failed = 0usize;

    log.note(&format!(
        "Run started: {} file(s) via {}",
        files.len(),
        provider.name()
    ));

    for file in files {
        tracing::info!("Processing {:?}", file.path);

        let outcome = match convert_single(file, provider, options).await {
            Ok((output, latency_ms)) => {
                succeeded += 1;
                log.success(&file.path, &output, latency_ms);
                FileOutcome::Succeeded { output, latency_ms }
            }
            Err(e) => {
                failed += 1;
                tracing::error!("Failed: {:?} - {e}", file.path);
                log.failure(&file.path, &e);
                FileOutcome::Failed(e)
            }
        };

        on_outcome(&file.path, &outcome);
    }

    let summary = RunSummary {
        discovered: files.len(),
        succeeded,
        failed,
        duration: start.elapsed(),
    };

    log.note(&format!(
        "Run finished: {} succeeded, {} failed, {:.1}s",
        summary.succeeded,
        summary.failed,
        summary.duration.as_secs_f64()
    ));

    summary
}

/// One file, one attempt: read, encode, request, persist.
async fn convert_single(
    file: &DiscoveredFile,
    provider: &dyn VisionProvider,
    options: &ConvertOptions,
) -> Result<(PathBuf, u64), ConvertError> {
    let size_mb = file.size / 1_000_000;
    if size_mb > options.max_file_size_mb {
        return Err(ConvertError::FileTooLarge {
            path: file.path.clone(),
            size_mb,
            max_mb: options.max_file_size_mb,
        });
    }

    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| ConvertError::Read {
            path: file.path.clone(),
            message: e.to_string(),
        })?;

    let extension = file
        .path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let request = VisionRequest {
        image: ImageInput::from_bytes(&bytes, extension),
        system: options.system_prompt.clone(),
        user: options.user_prompt.clone(),
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    };

    let response = match tokio::time::timeout(
        Duration::from_millis(options.timeout_ms),
        provider.generate(&request),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(ConvertError::Timeout {
                path: file.path.clone(),
                timeout_ms: options.timeout_ms,
            });
        }
    };

    let output = output_path(&file.path, options.output_dir.as_deref());
    tokio::fs::write(&output, response.text.as_bytes())
        .await
        .map_err(|e| ConvertError::Write {
            path: output.clone(),
            message: e.to_string(),
        })?;

    tracing::debug!(
        "Wrote {:?} ({} tokens, {} ms)",
        output,
        response
            .tokens_used
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string()),
        response.latency_ms
    );

    Ok((output, response.latency_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::VisionResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// A configurable mock provider.
    ///
    /// Each call to `generate()` invokes the response factory with the
    /// current call index, so tests can fail specific files in a batch.
    struct MockProvider {
        response_fn: Box<dyn Fn(u32) -> Result<VisionResponse, ConvertError> + Send + Sync>,
        call_count: Arc<AtomicU32>,
        delay: Option<Duration>,
    }

    impl MockProvider {
        fn success(text: &str) -> Self {
            let text = text.to_string();
            Self {
                response_fn: Box::new(move |_| {
                    Ok(VisionResponse {
                        text: text.clone(),
                        model: "mock-v1".to_string(),
                        tokens_used: Some(42),
                        latency_ms: 10,
                    })
                }),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }

        /// Fails the call at `fail_index`, succeeds otherwise.
        fn failing_nth(fail_index: u32, error_fn: impl Fn() -> ConvertError + Send + Sync + 'static) -> Self {
            Self {
                response_fn: Box::new(move |idx| {
                    if idx == fail_index {
                        Err(error_fn())
                    } else {
                        Ok(VisionResponse {
                            text: "# Converted".to_string(),
                            model: "mock-v1".to_string(),
                            tokens_used: None,
                            latency_ms: 5,
                        })
                    }
                }),
                call_count: Arc::new(AtomicU32::new(0)),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn call_count_handle(&self) -> Arc<AtomicU32> {
            self.call_count.clone()
        }
    }

    #[async_trait]
    impl VisionProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn generate(&self, _request: &VisionRequest) -> Result<VisionResponse, ConvertError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.response_fn)(idx)
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    fn options() -> ConvertOptions {
        ConvertOptions {
            system_prompt: "convert".to_string(),
            user_prompt: "describe".to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            timeout_ms: 5000,
            max_file_size_mb: 20,
            output_dir: None,
        }
    }

    fn write_images(dir: &Path, names: &[&str]) -> Vec<DiscoveredFile> {
        let mut files = Vec::new();
        for name in names {
            let path = dir.join(name);
            std::fs::write(&path, b"fake image bytes").unwrap();
            files.push(DiscoveredFile {
                path,
                size: 16,
            });
        }
        files
    }

    fn test_log(dir: &Path) -> RunLog {
        RunLog::create_at(dir.join("run.log")).unwrap()
    }

    #[tokio::test]
    async fn batch_writes_one_markdown_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_images(dir.path(), &["chart1.png", "table1.jpg"]);
        let provider = MockProvider::success("# Chart\n\n| a | b |");
        let mut log = test_log(dir.path());

        let summary = convert_files(&files, &provider, &options(), &mut log, |_, _| {}).await;

        assert_eq!(summary.discovered, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        for name in ["chart1.md", "table1.md"] {
            let content = std::fs::read_to_string(dir.path().join(name)).unwrap();
            assert_eq!(content, "# Chart\n\n| a | b |");
        }
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        // Lexicographic order: a_chart processed first, b_table second
        let files = write_images(dir.path(), &["a_chart.png", "b_table.jpg"]);
        let provider = MockProvider::failing_nth(0, || ConvertError::Auth {
            provider: "mock".to_string(),
            message: "HTTP 401: bad key".to_string(),
        });
        let mut log = test_log(dir.path());

        let summary = convert_files(&files, &provider, &options(), &mut log, |_, _| {}).await;

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(!dir.path().join("a_chart.md").exists());
        assert!(dir.path().join("b_table.md").exists());

        let log_content = std::fs::read_to_string(dir.path().join("run.log")).unwrap();
        assert!(log_content.contains("ERROR - a_chart.png"));
        assert!(log_content.contains("b_table.jpg -> b_table.md"));
    }

    #[tokio::test]
    async fn rerun_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_images(dir.path(), &["chart1.png"]);
        let mut log = test_log(dir.path());

        let first = MockProvider::success("first version");
        convert_files(&files, &first, &options(), &mut log, |_, _| {}).await;

        let second = MockProvider::success("second version");
        convert_files(&files, &second, &options(), &mut log, |_, _| {}).await;

        let content = std::fs::read_to_string(dir.path().join("chart1.md")).unwrap();
        assert_eq!(content, "second version");
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let files = write_images(dir.path(), &["chart1.png"]);
        let provider = MockProvider::success("too slow").with_delay(Duration::from_secs(5));
        let mut opts = options();
        opts.timeout_ms = 50;
        let mut log = test_log(dir.path());

        let mut outcomes = Vec::new();
        let summary = convert_files(&files, &provider, &opts, &mut log, |_, o| {
            outcomes.push(matches!(o, FileOutcome::Failed(ConvertError::Timeout { .. })));
        })
        .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(outcomes, vec![true]);
        assert!(!dir.path().join("chart1.md").exists());
    }

    #[tokio::test]
    async fn oversized_file_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = write_images(dir.path(), &["huge.png"]);
        files[0].size = 50_000_000; // 50 MB against a 20 MB limit
        let provider = MockProvider::success("unreached");
        let calls = provider.call_count_handle();
        let mut log = test_log(dir.path());

        let summary = convert_files(&files, &provider, &options(), &mut log, |_, _| {}).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreadable_file_fails_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![DiscoveredFile {
            path: dir.path().join("ghost.png"),
            size: 10,
        }];
        let provider = MockProvider::success("unreached");
        let calls = provider.call_count_handle();
        let mut log = test_log(dir.path());

        let summary = convert_files(&files, &provider, &options(), &mut log, |_, _| {}).await;

        assert_eq!(summary.failed, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let log_content = std::fs::read_to_string(dir.path().join("run.log")).unwrap();
        assert!(log_content.contains("ERROR - ghost.png"));
    }

    #[tokio::test]
    async fn empty_batch_is_a_graceful_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider::success("unreached");
        let mut log = test_log(dir.path());

        let summary = convert_files(&[], &provider, &options(), &mut log, |_, _| {}).await;

        assert_eq!(summary.discovered, 0);
        assert_eq!(summary.succeeded, 0);
        assert!(!summary.all_failed());
    }

    #[tokio::test]
    async fn output_dir_redirects_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("converted");
        std::fs::create_dir(&out).unwrap();
        let files = write_images(dir.path(), &["chart1.png"]);
        let mut opts = options();
        opts.output_dir = Some(out.clone());
        let provider = MockProvider::success("# Chart");
        let mut log = test_log(dir.path());

        let summary = convert_files(&files, &provider, &opts, &mut log, |_, _| {}).await;

        assert_eq!(summary.succeeded, 1);
        assert!(out.join("chart1.md").exists());
        assert!(!dir.path().join("chart1.md").exists());
    }

    #[test]
    fn output_path_swaps_extension_in_place() {
        let path = output_path(Path::new("/work/chart1.png"), None);
        assert_eq!(path, Path::new("/work/chart1.md"));
    }

    #[test]
    fn output_path_honours_redirect() {
        let path = output_path(Path::new("/work/chart1.png"), Some(Path::new("/out")));
        assert_eq!(path, Path::new("/out/chart1.md"));
    }

    #[test]
    fn all_failed_requires_attempts() {
        let summary = RunSummary {
            discovered: 2,
            succeeded: 0,
            failed: 2,
            duration: Duration::from_secs(1),
        };
        assert!(summary.all_failed());

        let empty = RunSummary {
            discovered: 0,
            succeeded: 0,
            failed: 0,
            duration: Duration::ZERO,
        };
        assert!(!empty.all_failed());
    }
}
