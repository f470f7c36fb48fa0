use crate::utils::Span;
use serde::Serialize;

/// Whether a successful parse reached the end of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    /// The macro ends exactly at the end of the source
    Success,
    /// More text follows the macro
    SuccessCont,
}

/// A recognized `{host:key.function(params)}` macro
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionMacroMatch {
    #[serde(skip)]
    pub source: String,
    pub match_text: String,
    pub position: usize,
    pub length: usize,
    pub host: String,
    pub item: String,
    pub function: String,
    pub function_name: String,
    pub function_param: String,
    pub function_param_list: Vec<String>,
}

impl FunctionMacroMatch {
    /// Byte offset just past the closing `}`
    pub fn end(&self) -> usize {
        self.position + self.length
    }

    pub fn status(&self) -> ParseStatus {
        if self.end() == self.source.len() {
            ParseStatus::Success
        } else {
            ParseStatus::SuccessCont
        }
    }

    /// Byte span of the match within its source
    pub fn span(&self) -> Span {
        Span::from_offsets(self.position, self.end())
    }

    /// Rebuild the macro text around another host name
    pub fn with_host(&self, host: &str) -> String {
        format!("{{{}:{}.{}}}", host, self.item, self.function)
    }
}
