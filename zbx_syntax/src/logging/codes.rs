//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for error, warning and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl serde::Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Function macro grammar error codes
pub mod function_macro {
    use super::Code;

    pub const EXPECTED_CHARACTER: Code = Code::new("E020");
    pub const EMPTY_HOST: Code = Code::new("E021");
    pub const EMPTY_ITEM_KEY: Code = Code::new("E022");
    pub const INVALID_ITEM_KEY: Code = Code::new("E023");
    pub const EMPTY_FUNCTION_NAME: Code = Code::new("E024");
    pub const UNTERMINATED_ITEM_PARAMETERS: Code = Code::new("E025");
    pub const UNTERMINATED_FUNCTION_PARAMETERS: Code = Code::new("E026");
    pub const UNEXPECTED_CHARACTER: Code = Code::new("E027");
    pub const POSITION_OUT_OF_RANGE: Code = Code::new("E028");
}

/// Trigger expression error and warning codes
pub mod expression {
    use super::Code;

    pub const EXPRESSION_TOO_LONG: Code = Code::new("E030");
    pub const TOO_MANY_MACROS: Code = Code::new("E031");
    pub const NO_FUNCTION_MACROS: Code = Code::new("W030");
}

/// Validation rule error codes
pub mod rules {
    use super::Code;

    pub const SYNTAX_ERROR: Code = Code::new("E040");
    pub const DUPLICATE_RULE: Code = Code::new("E041");
    pub const INVALID_INTEGER: Code = Code::new("E042");
    pub const RULE_TOO_LONG: Code = Code::new("E043");
    pub const TOO_MANY_VALUES: Code = Code::new("E044");
}

/// Pipeline error codes
pub mod pipeline {
    use super::Code;

    pub const UNSUPPORTED_SOURCE: Code = Code::new("E060");
    pub const INVALID_LINES: Code = Code::new("E061");
    pub const BATCH_FAILURE: Code = Code::new("E062");
    pub const SLOW_FILE: Code = Code::new("W060");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    // General success codes
    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    // File processing success codes
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_DISCOVERY_COMPLETE: Code = Code::new("I007");

    // Expression success codes
    pub const MACRO_SCAN_COMPLETE: Code = Code::new("I020");
    pub const HOST_REPLACEMENT_COMPLETE: Code = Code::new("I021");

    // Rule success codes
    pub const RULE_PARSING_COMPLETE: Code = Code::new("I040");

    // Pipeline success codes
    pub const PIPELINE_COMPLETE: Code = Code::new("I060");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

/// Initialize and get the error registry
fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System errors
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal system error",
                "Contact system administrator or file bug report",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "System initialization failure",
                "Check logging configuration and restart",
            ),
            ErrorMetadata::new(
                "ERR003",
                "System",
                Severity::High,
                false,
                true,
                "Runtime configuration could not be loaded",
                "Fix the preferences file or unset ZBX_* overrides",
            ),
            // File processing errors
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Input file not found",
                "Check the file path",
            ),
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Unsupported definition file extension",
                "Use .expr, .trigger or .rules files",
            ),
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "File exceeds the compile-time size or line limit",
                "Split the file into smaller files",
            ),
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File is empty",
                "Add expressions or rules to the file",
            ),
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "Permission denied reading file",
                "Check file permissions",
            ),
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File is not valid UTF-8",
                "Re-encode the file as UTF-8",
            ),
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::High,
                false,
                true,
                "I/O error while reading file",
                "Check storage and retry",
            ),
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid file path",
                "Provide a path to a regular file",
            ),
            // Function macro errors
            ErrorMetadata::new(
                "E020",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Expected delimiter missing in function macro",
                "Use the form {host:key.function(params)}",
            ),
            ErrorMetadata::new(
                "E021",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Function macro has an empty host name",
                "Put a host name between '{' and ':'",
            ),
            ErrorMetadata::new(
                "E022",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Function macro has an empty item key",
                "Put an item key between ':' and the function",
            ),
            ErrorMetadata::new(
                "E023",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Item key cannot be separated from the function name",
                "Separate the item key and function with '.'",
            ),
            ErrorMetadata::new(
                "E024",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Function macro has an empty function name",
                "Use a lowercase function name such as last or avg",
            ),
            ErrorMetadata::new(
                "E025",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Item key parameters are not closed",
                "Balance '[' and ']' in the item key",
            ),
            ErrorMetadata::new(
                "E026",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Function parameters are not closed",
                "Close the function call with ')'",
            ),
            ErrorMetadata::new(
                "E027",
                "FunctionMacro",
                Severity::Medium,
                true,
                false,
                "Unexpected character after a quoted parameter",
                "Follow a quoted parameter with ',' or the closing delimiter",
            ),
            ErrorMetadata::new(
                "E028",
                "FunctionMacro",
                Severity::Low,
                true,
                false,
                "Parse position is outside of the source",
                "Pass an offset within the source string",
            ),
            // Expression errors
            ErrorMetadata::new(
                "E030",
                "Expression",
                Severity::Medium,
                true,
                false,
                "Trigger expression exceeds the maximum length",
                "Shorten the expression",
            ),
            ErrorMetadata::new(
                "E031",
                "Expression",
                Severity::Medium,
                true,
                false,
                "Trigger expression contains too many function macros",
                "Split the expression",
            ),
            ErrorMetadata::new(
                "W030",
                "Expression",
                Severity::Low,
                true,
                false,
                "Trigger expression has no function macro",
                "Reference at least one item with {host:key.function()}",
            ),
            // Validation rule errors
            ErrorMetadata::new(
                "E040",
                "ValidationRule",
                Severity::Medium,
                true,
                false,
                "Validation rule syntax error",
                "Check rule keywords and '|' separators",
            ),
            ErrorMetadata::new(
                "E041",
                "ValidationRule",
                Severity::Medium,
                true,
                false,
                "Validation rule keyword repeated",
                "Keep one occurrence of each keyword",
            ),
            ErrorMetadata::new(
                "E042",
                "ValidationRule",
                Severity::Medium,
                true,
                false,
                "Bound is not a 32-bit integer",
                "Use a value between -2147483648 and 2147483647",
            ),
            ErrorMetadata::new(
                "E043",
                "ValidationRule",
                Severity::Medium,
                true,
                false,
                "Validation rule string exceeds the maximum length",
                "Shorten the rule string",
            ),
            ErrorMetadata::new(
                "E044",
                "ValidationRule",
                Severity::Medium,
                true,
                false,
                "Too many values in an 'in' rule",
                "Reduce the number of allowed values",
            ),
            // Pipeline errors
            ErrorMetadata::new(
                "E060",
                "Pipeline",
                Severity::Medium,
                false,
                true,
                "File kind cannot be determined",
                "Use .expr, .trigger or .rules files",
            ),
            ErrorMetadata::new(
                "E061",
                "Pipeline",
                Severity::Medium,
                true,
                false,
                "One or more lines failed to parse",
                "Fix the reported lines",
            ),
            ErrorMetadata::new(
                "E062",
                "Pipeline",
                Severity::High,
                false,
                true,
                "Batch processing failed",
                "Check the directory and worker configuration",
            ),
            ErrorMetadata::new(
                "W060",
                "Pipeline",
                Severity::Low,
                true,
                false,
                "File took longer than the processing time limit",
                "Split the file or raise max_processing_time_seconds",
            ),
        ];

        entries.into_iter().map(|meta| (meta.code, meta)).collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for error code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for error code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get error category from error code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
