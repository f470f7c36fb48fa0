//! Validation rule parse failures

use crate::logging::codes::{self, Code};

pub type RuleResult<T> = Result<T, RuleError>;

/// Why a validation rule string was rejected. Positions are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("Cannot parse validation rules \"{rule}\" near \"{near}\" at position {position}.")]
    SyntaxError {
        rule: String,
        near: String,
        position: usize,
    },

    #[error("Validation rule \"{keyword}\" already exists.")]
    DuplicateRule { keyword: String, position: usize },

    #[error("Invalid integer \"{value}\" in validation rule \"{keyword}\".")]
    InvalidInteger {
        keyword: String,
        value: String,
        position: usize,
    },
}

impl RuleError {
    pub fn syntax_error(rule: &str, position: usize) -> Self {
        Self::SyntaxError {
            rule: rule.to_string(),
            near: rule.get(position..).unwrap_or_default().to_string(),
            position,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Self::SyntaxError { position, .. }
            | Self::DuplicateRule { position, .. }
            | Self::InvalidInteger { position, .. } => *position,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::SyntaxError { .. } => codes::rules::SYNTAX_ERROR,
            Self::DuplicateRule { .. } => codes::rules::DUPLICATE_RULE,
            Self::InvalidInteger { .. } => codes::rules::INVALID_INTEGER,
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
