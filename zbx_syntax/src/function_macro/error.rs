//! Function macro parse failures

use crate::logging::codes::{self, Code};

pub type MacroResult<T> = Result<T, MacroError>;

/// Why a `{host:key.function(params)}` construct was not recognized.
/// Positions are byte offsets into the source passed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacroError {
    #[error("Expected '{expected}' at position {position}")]
    ExpectedCharacter { expected: char, position: usize },

    #[error("Empty host name at position {position}")]
    EmptyHost { position: usize },

    #[error("Empty item key at position {position}")]
    EmptyItemKey { position: usize },

    #[error("Item key at position {position} has no '.' before the function name")]
    InvalidItemKey { position: usize },

    #[error("Empty function name at position {position}")]
    EmptyFunctionName { position: usize },

    #[error("Item key parameters opened at position {position} are not closed")]
    UnterminatedBrackets { position: usize },

    #[error("Function parameters opened at position {position} are not closed")]
    UnterminatedParameters { position: usize },

    #[error("Unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: char, position: usize },

    #[error("Start position {position} is beyond the end of a {length}-byte source")]
    OutOfRange { position: usize, length: usize },
}

impl MacroError {
    /// Byte offset the failure was detected at
    pub fn position(&self) -> usize {
        match self {
            Self::ExpectedCharacter { position, .. }
            | Self::EmptyHost { position }
            | Self::EmptyItemKey { position }
            | Self::InvalidItemKey { position }
            | Self::EmptyFunctionName { position }
            | Self::UnterminatedBrackets { position }
            | Self::UnterminatedParameters { position }
            | Self::UnexpectedCharacter { position, .. }
            | Self::OutOfRange { position, .. } => *position,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::ExpectedCharacter { .. } => codes::function_macro::EXPECTED_CHARACTER,
            Self::EmptyHost { .. } => codes::function_macro::EMPTY_HOST,
            Self::EmptyItemKey { .. } => codes::function_macro::EMPTY_ITEM_KEY,
            Self::InvalidItemKey { .. } => codes::function_macro::INVALID_ITEM_KEY,
            Self::EmptyFunctionName { .. } => codes::function_macro::EMPTY_FUNCTION_NAME,
            Self::UnterminatedBrackets { .. } => {
                codes::function_macro::UNTERMINATED_ITEM_PARAMETERS
            }
            Self::UnterminatedParameters { .. } => {
                codes::function_macro::UNTERMINATED_FUNCTION_PARAMETERS
            }
            Self::UnexpectedCharacter { .. } => codes::function_macro::UNEXPECTED_CHARACTER,
            Self::OutOfRange { .. } => codes::function_macro::POSITION_OUT_OF_RANGE,
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
