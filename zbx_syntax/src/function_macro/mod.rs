//! Trigger function macros: `{host:key.function(params)}`

pub mod error;
pub mod params;
pub mod parser;
pub mod result;

pub use error::{MacroError, MacroResult};
pub use params::ParamState;
pub use parser::parse_function_macro;
pub use result::{FunctionMacroMatch, ParseStatus};
