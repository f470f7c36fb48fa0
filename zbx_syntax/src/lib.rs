// Internal modules
pub mod batch;
pub mod config;
pub mod expression;
pub mod file_processor;
pub mod function_macro;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod rules;
pub mod scanner;
pub mod utils;

// Re-export the parsers for library consumers
pub use expression::{
    collect_hosts, distinct_hosts, replace_host, scan_expression, scan_function_macros,
};
pub use function_macro::{parse_function_macro, FunctionMacroMatch, MacroError, ParseStatus};
pub use rules::{parse_validation_rule, RuleError, RuleKind, RuleValue, ValidationRuleSet};

pub use batch::{BatchConfig, BatchError, BatchResults};
pub use pipeline::{PipelineError, PipelineResult};

// Re-export pipeline output for JSON consumers
pub use pipeline::output::PipelineOutput;
