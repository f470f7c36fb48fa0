use crate::file_processor::{FileMetadata, SourceKind};
use crate::function_macro::FunctionMacroMatch;
use crate::logging::{codes, Code};
use crate::rules::ValidationRuleSet;
use crate::utils::Span;
use serde::Serialize;
use std::time::Duration;

/// Function macros found on one expression line
#[derive(Debug, Clone, Serialize)]
pub struct ExpressionReport {
    /// 1-based line number
    pub line: u32,
    pub expression: String,
    pub macros: Vec<FunctionMacroMatch>,
    pub hosts: Vec<String>,
}

/// Rule set parsed from one rule line
#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub line: u32,
    pub rule: String,
    pub rules: ValidationRuleSet,
}

/// A failed or suspicious line, located in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineFailure {
    pub line: u32,
    pub column: u32,
    pub code: Code,
    pub message: String,
    #[serde(skip)]
    pub span: Span,
}

impl LineFailure {
    pub fn new(code: Code, message: impl Into<String>, span: Span) -> Self {
        Self {
            line: span.start.line,
            column: span.start.column,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }
}

/// Everything found in one definition source
#[derive(Debug, Clone, Serialize)]
pub struct SourceAnalysis {
    pub kind: SourceKind,
    pub total_lines: usize,
    /// Blank and comment lines
    pub skipped_lines: usize,
    pub expressions: Vec<ExpressionReport>,
    pub rules: Vec<RuleReport>,
    pub failures: Vec<LineFailure>,
    pub warnings: Vec<LineFailure>,
}

impl SourceAnalysis {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            total_lines: 0,
            skipped_lines: 0,
            expressions: Vec::new(),
            rules: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Lines that held an expression or rule string
    pub fn item_lines(&self) -> usize {
        self.total_lines - self.skipped_lines
    }

    pub fn macro_count(&self) -> usize {
        self.expressions.iter().map(|report| report.macros.len()).sum()
    }

    /// Distinct hosts across all expressions, in order of first use
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = Vec::new();
        for host in self.expressions.iter().flat_map(|report| &report.hosts) {
            if !hosts.contains(&host.as_str()) {
                hosts.push(host);
            }
        }
        hosts
    }
}

/// Result of running one file through the pipeline
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub file_metadata: FileMetadata,
    pub analysis: SourceAnalysis,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        file_metadata: FileMetadata,
        analysis: SourceAnalysis,
        processing_duration: Duration,
    ) -> Self {
        Self {
            file_metadata,
            analysis,
            processing_duration,
        }
    }

    pub fn log_success(&self, file_path: &str) {
        crate::log_success!(
            codes::success::PIPELINE_COMPLETE,
            "Definition file processed",
            "file" => file_path,
            "kind" => self.analysis.kind.as_str(),
            "lines" => self.analysis.item_lines(),
            "warnings" => self.analysis.warnings.len(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
