//! Field validation rule strings

pub mod error;
pub mod parser;
pub mod types;

pub use error::{RuleError, RuleResult};
pub use parser::parse_validation_rule;
pub use types::{RuleArgument, RuleKind, RuleValue, ValidationRuleSet};
