use super::result::LineFailure;
use crate::file_processor::FileProcessorError;
use crate::logging::{codes, Code};

#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Cannot tell what kind of definitions {path} holds")]
    UnsupportedSource { path: String },

    #[error("{failed} of {total} lines in {path} failed to parse")]
    InvalidLines {
        path: String,
        failed: usize,
        total: usize,
        failures: Vec<LineFailure>,
    },

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::FileProcessing(error) => error.error_code(),
            PipelineError::UnsupportedSource { .. } => codes::pipeline::UNSUPPORTED_SOURCE,
            PipelineError::InvalidLines { .. } => codes::pipeline::INVALID_LINES,
            PipelineError::Pipeline { .. } => codes::system::INTERNAL_ERROR,
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

    /// Line failures carried by the error, if any
    pub fn failures(&self) -> &[LineFailure] {
        match self {
            PipelineError::InvalidLines { failures, .. } => failures,
            _ => &[],
        }
    }
}
