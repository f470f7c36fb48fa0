//! Per-file pipeline: read a definition file, then analyze every line as a
//! trigger expression or a validation rule string

mod analyze;
mod error;
mod info;
pub mod output;
mod result;
mod validation;

pub use analyze::analyze_source;
pub use error::PipelineError;
pub use info::{get_pipeline_info, PipelineInfo};
pub use output::{render_failures, PipelineOutput};
pub use result::{ExpressionReport, LineFailure, PipelineResult, RuleReport, SourceAnalysis};
pub use validation::validate_pipeline;

use crate::config::RuntimeConfig;
use crate::file_processor::{FileProcessor, SourceKind};
use crate::logging::{self, codes};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Process a single file with preferences from the environment
pub fn process_file(file_path: &str) -> Result<PipelineResult, PipelineError> {
    process_file_with_config(file_path, &RuntimeConfig::default())
}

/// Process a single file. Any failed line fails the whole file with
/// [`PipelineError::InvalidLines`].
pub fn process_file_with_config(
    file_path: &str,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    process_file_with_id(file_path, 0, config)
}

pub(crate) fn process_file_with_id(
    file_path: &str,
    file_id: usize,
    config: &RuntimeConfig,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(file_path), file_id, || {
        crate::log_info!("Starting definition file pipeline", "file" => file_path);

        if SourceKind::from_path(Path::new(file_path)).is_none() {
            let error = PipelineError::UnsupportedSource {
                path: file_path.to_string(),
            };
            crate::log_error!(error.error_code(), "Unsupported definition file", "file" => file_path);
            return Err(error);
        }

        let processor = FileProcessor::from_preferences(&config.file_processor);
        let file_result = processor.process_file(file_path)?;

        let analysis_start = Instant::now();
        let analysis = analyze_source(file_result.kind(), &file_result.source, config);
        crate::log_performance!(
            codes::success::PIPELINE_COMPLETE,
            "Source analysis timing",
            duration = analysis_start.elapsed(),
            "lines" => analysis.total_lines
        );

        if !analysis.is_valid() {
            return Err(PipelineError::InvalidLines {
                path: file_path.to_string(),
                failed: analysis.failures.len(),
                total: analysis.item_lines(),
                failures: analysis.failures,
            });
        }

        let result = PipelineResult::new(file_result.metadata, analysis, start_time.elapsed());
        result.log_success(file_path);

        Ok(result)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_pipeline() {
        let _ = crate::logging::init_global_logging();
        assert!(validate_pipeline().is_ok());
    }

    #[test]
    fn test_process_rule_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("host.rules");
        fs::write(&path, "required|not_empty\nid|db hosts.hostid\n").unwrap();

        let result = process_file(path.to_str().unwrap()).unwrap();
        assert_eq!(result.analysis.kind, SourceKind::Rules);
        assert_eq!(result.analysis.rules.len(), 2);
        assert_eq!(result.file_metadata.line_count, 2);
    }

    #[test]
    fn test_invalid_lines_fail_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cpu.trigger");
        fs::write(&path, "{a:b.last()}>0\n{broken:key.last(}\n").unwrap();

        let error = process_file(path.to_str().unwrap()).unwrap_err();
        assert_matches!(
            &error,
            PipelineError::InvalidLines { failed: 1, total: 2, .. }
        );
        assert_eq!(error.failures()[0].line, 2);
        assert_eq!(error.error_code().as_str(), "E061");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_unsupported_and_missing_files() {
        assert_matches!(
            process_file("notes.txt"),
            Err(PipelineError::UnsupportedSource { .. })
        );

        let error = process_file("missing.rules").unwrap_err();
        assert_matches!(error, PipelineError::FileProcessing(_));
        assert_eq!(error.error_code().as_str(), "E005");
    }

    #[test]
    fn test_pipeline_info() {
        let info = get_pipeline_info();
        assert_eq!(info.supported_extensions, vec![".expr", ".trigger", ".rules"]);
        assert!(info.report().contains("Max Rule Length"));
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(error, PipelineError::Pipeline { ref message } if message == "Test error");
        assert!(error.failures().is_empty());
    }
}
