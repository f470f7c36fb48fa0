//! Directory batch processing for definition files
//!
//! Discovers `.expr`, `.trigger` and `.rules` files and runs each one through
//! the pipeline, either sequentially or on worker threads. Events land in the
//! global error collector under each file's context.

use crate::config::compile_time::batch_processing::{MAX_FILES_PER_BATCH, MAX_WORKER_THREADS};
use crate::config::compile_time::security::MAX_PROCESSING_TIME_SECONDS;
use crate::config::RuntimeConfig;
use crate::file_processor::SourceKind;
use crate::logging::{codes, Code};
use crate::pipeline::{self, PipelineError, PipelineResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    /// Preferences handed to every pipeline run
    pub runtime: RuntimeConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: thread::available_parallelism()
                .map(|n| n.get().min(8))
                .unwrap_or(4)
                .min(MAX_WORKER_THREADS),
            recursive: true,
            max_files: None,
            progress_reporting: true,
            fail_fast: false,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Worker count clamped to the compile-time ceiling
    pub fn effective_threads(&self) -> usize {
        self.max_threads.clamp(1, MAX_WORKER_THREADS)
    }

    /// File limit clamped to the compile-time ceiling
    pub fn effective_max_files(&self) -> usize {
        self.max_files
            .unwrap_or(MAX_FILES_PER_BATCH)
            .min(MAX_FILES_PER_BATCH)
    }
}

#[derive(Debug)]
pub struct BatchResults {
    pub successful_files: Vec<(PathBuf, PipelineResult)>,
    pub failed_files: Vec<(PathBuf, PipelineError)>,
    pub processing_duration: Duration,
    pub files_processed: usize,
    pub files_discovered: usize,
}

impl BatchResults {
    pub fn new() -> Self {
        Self {
            successful_files: Vec::new(),
            failed_files: Vec::new(),
            processing_duration: Duration::new(0, 0),
            files_processed: 0,
            files_discovered: 0,
        }
    }

    pub fn success_count(&self) -> usize {
        self.successful_files.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed_files.len()
    }

    pub fn success_rate(&self) -> f64 {
        if self.files_processed == 0 {
            0.0
        } else {
            self.successful_files.len() as f64 / self.files_processed as f64
        }
    }

    pub fn add_success(&mut self, file_path: PathBuf, result: PipelineResult) {
        self.successful_files.push((file_path, result));
        self.files_processed += 1;
    }

    pub fn add_failure(&mut self, file_path: PathBuf, error: PipelineError) {
        self.failed_files.push((file_path, error));
        self.files_processed += 1;
    }

    pub fn merge(&mut self, other: BatchResults) {
        self.successful_files.extend(other.successful_files);
        self.failed_files.extend(other.failed_files);
        self.files_processed += other.files_processed;
    }

    /// Restore discovery order after parallel runs
    fn sort(&mut self) {
        self.successful_files.sort_by(|a, b| a.0.cmp(&b.0));
        self.failed_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch processing completed: {} files processed, {} successful ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

impl Default for BatchResults {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No definition files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("IO error during directory traversal: {error}")]
    IoError { error: String },

    #[error("Thread pool error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::NoFilesFound { .. } | BatchError::ThreadError { .. } => {
                codes::pipeline::BATCH_FAILURE
            }
        }
    }

    pub fn severity(&self) -> codes::Severity {
        codes::get_severity(self.error_code().as_str())
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.error_code().as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

pub type BatchResult<T> = Result<T, BatchError>;

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Definition files under `dir_path`, sorted
pub fn discover_definition_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> BatchResult<Vec<PathBuf>> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        let error = BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        };
        crate::log_error!(error.error_code(), "Batch directory not found",
            "directory" => dir_path.display());
        return Err(error);
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    crate::log_success!(
        codes::success::FILE_DISCOVERY_COMPLETE,
        "File discovery completed",
        "files_found" => files.len(),
        "directory" => dir_path.display()
    );

    Ok(files)
}

/// Collect definition files; returns `false` once the file limit is reached
fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    config: &BatchConfig,
) -> BatchResult<bool> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir_path)
        .map_err(|e| BatchError::IoError {
            error: format!("{}: {}", dir_path.display(), e),
        })?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(|e| BatchError::IoError {
            error: e.to_string(),
        })?;
    entries.sort();

    let max_files = config.effective_max_files();
    for path in entries {
        if path.is_dir() {
            if config.recursive && !visit_directory(&path, files, config)? {
                return Ok(false);
            }
        } else if is_definition_file(&path) {
            files.push(path);

            if files.len() >= max_files {
                crate::log_warning!(
                    "Reached maximum file limit",
                    "files_found" => files.len(),
                    "limit" => max_files
                );
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn is_definition_file(path: &Path) -> bool {
    path.is_file() && SourceKind::from_path(path).is_some()
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> BatchResult<BatchResults> {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch processing",
        "directory" => dir_path.display()
    );

    let files = discover_definition_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Processing file {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        match process_one(file_path, file_id, &config.runtime) {
            Ok(result) => results.add_success(file_path.clone(), result),
            Err(error) => {
                results.add_failure(file_path.clone(), error);
                if config.fail_fast {
                    crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
                    break;
                }
            }
        }
    }

    results.processing_duration = start_time.elapsed();
    log_completion("Sequential batch processing completed", &results, 1);

    Ok(results)
}

pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> BatchResult<BatchResults> {
    let start_time = Instant::now();
    let threads = config.effective_threads();

    crate::log_info!("Starting parallel batch processing",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let files = discover_definition_files(dir_path, config)?;
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(&files, threads);
    crate::log_debug!("Parallel processing configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    let mut first_id = 0;
    for chunk in files.chunks(chunk_size) {
        results.merge(process_chunk_parallel(chunk, first_id, threads, &config.runtime)?);
        first_id += chunk.len();

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch processing");
            break;
        }
    }

    results.sort();
    results.processing_duration = start_time.elapsed();
    log_completion("Parallel batch processing completed", &results, threads);

    Ok(results)
}

fn process_chunk_parallel(
    files: &[PathBuf],
    first_id: usize,
    threads: usize,
    runtime: &RuntimeConfig,
) -> BatchResult<BatchResults> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files_per_worker(files.len(), threads);

    let mut handles = Vec::new();
    for (thread_index, thread_files) in files.chunks(files_per_thread).enumerate() {
        let thread_files = thread_files.to_vec();
        let base_id = first_id + thread_index * files_per_thread;
        let results = Arc::clone(&results);
        let runtime = runtime.clone();

        handles.push(thread::spawn(move || {
            for (offset, file_path) in thread_files.into_iter().enumerate() {
                let outcome = process_one(&file_path, base_id + offset, &runtime);
                let mut guard = results.lock().unwrap_or_else(|p| p.into_inner());
                match outcome {
                    Ok(result) => guard.add_success(file_path, result),
                    Err(error) => guard.add_failure(file_path, error),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "Thread panicked during processing".to_string(),
        })?;
    }

    Arc::try_unwrap(results)
        .map_err(|_| BatchError::ThreadError {
            message: "Failed to extract results from worker threads".to_string(),
        })
        .map(|mutex| mutex.into_inner().unwrap_or_else(|p| p.into_inner()))
}

fn process_one(
    file_path: &Path,
    file_id: usize,
    runtime: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let started = Instant::now();
    let result = pipeline::process_file_with_id(&file_path.to_string_lossy(), file_id, runtime);

    let elapsed = started.elapsed();
    if elapsed > Duration::from_secs(MAX_PROCESSING_TIME_SECONDS) {
        crate::log_warning!(
            code = codes::pipeline::SLOW_FILE,
            "File exceeded processing time limit",
            "file" => file_path.display(),
            "elapsed_s" => format!("{:.1}", elapsed.as_secs_f64()),
            "limit_s" => MAX_PROCESSING_TIME_SECONDS
        );
    }

    result
}

fn log_completion(message: &str, results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::OPERATION_COMPLETED_SUCCESSFULLY,
        message,
        "files_processed" => results.files_processed,
        "successful" => results.success_count(),
        "failed" => results.failure_count(),
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

/// Files handed to one worker thread within a chunk
fn files_per_worker(chunk_len: usize, threads: usize) -> usize {
    chunk_len.div_ceil(threads.max(1)).max(1)
}

/// Files processed per round, split across up to `max_threads` workers
fn calculate_chunk_size(files: &[PathBuf], max_threads: usize) -> usize {
    const MAX_FILES_PER_WORKER: usize = 50;

    let threads = max_threads.max(1);
    files_per_worker(files.len(), threads).min(MAX_FILES_PER_WORKER) * threads
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Process a directory with default configuration
pub fn process_directory(dir_path: &Path) -> BatchResult<BatchResults> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> BatchResult<BatchResults> {
    if config.effective_threads() == 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn quiet_config() -> BatchConfig {
        BatchConfig {
            progress_reporting: false,
            ..BatchConfig::default()
        }
    }

    fn write_tree(root: &Path) {
        fs::write(root.join("cpu.expr"), "{web:system.cpu.load.avg(5m)}>5\n").unwrap();
        fs::write(root.join("host.rules"), "required|not_empty\n").unwrap();
        fs::write(root.join("broken.rules"), "id|id\n").unwrap();
        fs::write(root.join("notes.txt"), "not a definition").unwrap();
        fs::create_dir(root.join("nested")).unwrap();
        fs::write(root.join("nested").join("net.trigger"), "{r:icmpping.last()}=0\n").unwrap();
    }

    #[test]
    fn test_file_discovery() {
        let dir = tempdir().unwrap();
        write_tree(dir.path());

        let files = discover_definition_files(dir.path(), &quiet_config()).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|f| SourceKind::from_path(f).is_some()));

        let flat = BatchConfig {
            recursive: false,
            ..quiet_config()
        };
        assert_eq!(discover_definition_files(dir.path(), &flat).unwrap().len(), 3);

        let limited = BatchConfig {
            max_files: Some(2),
            ..quiet_config()
        };
        assert_eq!(discover_definition_files(dir.path(), &limited).unwrap().len(), 2);
    }

    #[test]
    fn test_discovery_errors() {
        let dir = tempdir().unwrap();
        assert_matches!(
            discover_definition_files(dir.path(), &quiet_config()),
            Err(BatchError::NoFilesFound { .. })
        );
        assert_matches!(
            discover_definition_files(&dir.path().join("missing"), &quiet_config()),
            Err(BatchError::DirectoryNotFound { .. })
        );
    }

    #[test]
    fn test_sequential_processing() {
        let dir = tempdir().unwrap();
        write_tree(dir.path());

        let config = BatchConfig {
            max_threads: 1,
            ..quiet_config()
        };
        let results = process_directory_with_config(dir.path(), &config).unwrap();

        assert_eq!(results.files_discovered, 4);
        assert_eq!(results.files_processed, 4);
        assert_eq!(results.failure_count(), 1);
        assert!(results.failed_files[0].0.ends_with("broken.rules"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = tempdir().unwrap();
        write_tree(dir.path());

        let config = BatchConfig {
            max_threads: 3,
            ..quiet_config()
        };
        let results = process_directory_parallel(dir.path(), &config).unwrap();

        assert_eq!(results.success_count(), 3);
        assert_eq!(results.failure_count(), 1);
        let names: Vec<_> = results.successful_files.iter().map(|(p, _)| p.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_fail_fast() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rules"), "bogus\n").unwrap();
        fs::write(dir.path().join("b.rules"), "required\n").unwrap();

        let config = BatchConfig {
            max_threads: 1,
            fail_fast: true,
            ..quiet_config()
        };
        let results = process_directory_sequential(dir.path(), &config).unwrap();
        assert_eq!(results.files_processed, 1);
        assert_eq!(results.failure_count(), 1);
    }

    #[test]
    fn test_chunk_size_calculation() {
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 100], 4), 100);
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 10], 4), 12);
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 1], 4), 4);
        assert_eq!(calculate_chunk_size(&vec![PathBuf::new(); 1000], 4), 200);
    }

    #[test]
    fn test_every_thread_gets_work() {
        let workers = |files: usize, threads: usize| {
            let chunk = calculate_chunk_size(&vec![PathBuf::new(); files], threads);
            let first_round = chunk.min(files);
            first_round.div_ceil(files_per_worker(first_round, threads))
        };

        assert_eq!(workers(16, 8), 8);
        assert_eq!(workers(100, 4), 4);
        assert_eq!(workers(1000, 16), 16);
        assert_eq!(workers(3, 8), 3);

        let chunk = calculate_chunk_size(&vec![PathBuf::new(); 16], 8);
        assert_eq!(chunk, 16);
        assert_eq!(files_per_worker(chunk, 8), 2);
    }

    #[test]
    fn test_batch_config_limits() {
        let config = BatchConfig {
            max_threads: 0,
            max_files: Some(usize::MAX),
            ..BatchConfig::default()
        };
        assert_eq!(config.effective_threads(), 1);
        assert_eq!(config.effective_max_files(), MAX_FILES_PER_BATCH);
        assert!(BatchConfig::default().recursive);
    }

    #[test]
    fn test_batch_error_classification() {
        let error = BatchError::ThreadError {
            message: "worker panicked".to_string(),
        };
        assert_eq!(error.error_code().as_str(), "E062");
        assert_eq!(error.category(), "Pipeline");
        assert_eq!(error.severity(), codes::Severity::High);
        assert!(!error.is_recoverable());
        assert!(error.requires_halt());

        let error = BatchError::DirectoryNotFound {
            path: "defs".to_string(),
        };
        assert_eq!(error.category(), "FileProcessing");
    }

    #[test]
    fn test_batch_results_summary() {
        let results = BatchResults::new();
        assert_eq!(results.success_rate(), 0.0);
        assert!(results.summary().contains("0 files processed"));
    }
}
