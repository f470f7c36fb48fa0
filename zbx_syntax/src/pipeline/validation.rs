use crate::logging::codes;

/// Validate that the pipeline is properly configured
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating pipeline configuration");

    crate::file_processor::init_file_processor_logging()?;

    let stage_codes = [
        codes::function_macro::EXPECTED_CHARACTER,
        codes::function_macro::UNTERMINATED_FUNCTION_PARAMETERS,
        codes::expression::EXPRESSION_TOO_LONG,
        codes::expression::NO_FUNCTION_MACROS,
        codes::rules::SYNTAX_ERROR,
        codes::rules::DUPLICATE_RULE,
        codes::pipeline::INVALID_LINES,
    ];
    for code in stage_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Pipeline code {} is not registered", code));
        }
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "codes_checked" => stage_codes.len()
    );

    Ok(())
}
