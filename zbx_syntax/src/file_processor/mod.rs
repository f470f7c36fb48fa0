//! Definition file reading
//!
//! Size and line limits are compile-time constants; the remaining behavior
//! comes from [`FileProcessorPreferences`].

mod processor;

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT_FOR_ANALYSIS,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::log_debug;
use crate::logging::codes;
pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, FileProcessorResult,
    SourceKind,
};

/// Read a file with default settings
pub fn process_file(file_path: &str) -> FileProcessorResult<FileProcessingResult> {
    FileProcessor::new().process_file(file_path)
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

pub fn should_halt_on_error(error: &FileProcessorError) -> bool {
    error.requires_halt()
}

/// Compile-time maximum file size
pub fn get_max_file_size() -> u64 {
    MAX_FILE_SIZE
}

/// Check that every file processing code is registered (system startup)
pub fn init_file_processor_logging() -> Result<(), String> {
    let file_codes = [
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_processing::INVALID_EXTENSION,
        codes::file_processing::FILE_TOO_LARGE,
        codes::file_processing::EMPTY_FILE,
        codes::file_processing::PERMISSION_DENIED,
        codes::file_processing::INVALID_ENCODING,
        codes::file_processing::IO_ERROR,
        codes::file_processing::INVALID_PATH,
    ];

    for code in &file_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "File processor error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    log_debug!("File processor compile-time configuration loaded",
        "max_file_size" => MAX_FILE_SIZE,
        "large_file_threshold" => LARGE_FILE_THRESHOLD,
        "max_line_count" => MAX_LINE_COUNT_FOR_ANALYSIS);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_module_api() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("field.rules");
        fs::write(&file_path, "required|not_empty\n").unwrap();

        let result = process_file(file_path.to_str().unwrap()).unwrap();
        assert_eq!(result.kind(), SourceKind::Rules);
    }

    #[test]
    fn test_create_processor_from_preferences() {
        let prefs = FileProcessorPreferences {
            enable_performance_logging: false,
            allow_comment_lines: true,
        };
        let processor = create_processor_from_preferences(&prefs);
        assert!(!processor.enable_performance_logging);
    }

    #[test]
    fn test_limits() {
        assert_eq!(get_max_file_size(), FileProcessor::max_file_size());
        assert!(LARGE_FILE_THRESHOLD <= get_max_file_size());
        assert!(should_halt_on_error(&FileProcessorError::FileNotFound {
            path: "x.expr".to_string()
        }));
    }

    #[test]
    fn test_init_logging() {
        assert!(init_file_processor_logging().is_ok());
    }
}
