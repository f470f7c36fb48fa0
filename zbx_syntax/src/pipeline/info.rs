use crate::config::compile_time::{expression, file_processing, rules};
use crate::file_processor::SourceKind;

/// Information about pipeline capabilities
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub supported_extensions: Vec<String>,
    pub max_file_size: u64,
    pub max_expression_length: usize,
    pub max_macros_per_expression: usize,
    pub max_rule_length: usize,
    pub max_in_values: usize,
    pub global_logging_enabled: bool,
    pub cargo_style_output: bool,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "Definition Processing Pipeline:\n\
             - Supported Extensions: {}\n\
             - Max File Size: {} MB\n\
             - Max Expression Length: {} bytes\n\
             - Max Macros per Expression: {}\n\
             - Max Rule Length: {} bytes\n\
             - Max 'in' Values: {}\n\
             - Global Logging: {}\n\
             - Cargo-style Output: {}",
            self.supported_extensions.join(", "),
            self.max_file_size / (1024 * 1024),
            self.max_expression_length,
            self.max_macros_per_expression,
            self.max_rule_length,
            self.max_in_values,
            self.global_logging_enabled,
            self.cargo_style_output
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "Trigger expression and validation rule checker for {} files",
            self.supported_extensions.join(", ")
        )
    }
}

pub fn get_pipeline_info() -> PipelineInfo {
    PipelineInfo {
        supported_extensions: SourceKind::EXTENSIONS
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect(),
        max_file_size: file_processing::MAX_FILE_SIZE,
        max_expression_length: expression::MAX_EXPRESSION_LENGTH,
        max_macros_per_expression: expression::MAX_MACROS_PER_EXPRESSION,
        max_rule_length: rules::MAX_RULE_LENGTH,
        max_in_values: rules::MAX_IN_VALUES,
        global_logging_enabled: crate::logging::is_initialized(),
        cargo_style_output: crate::logging::config::use_cargo_style_output(),
    }
}
