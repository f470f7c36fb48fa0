//! Line-by-line analysis of definition sources
//!
//! Length and count limits are enforced here, so the parsers themselves stay
//! free of configuration.

use super::result::{ExpressionReport, LineFailure, RuleReport, SourceAnalysis};
use crate::config::compile_time::{expression, rules as rule_limits};
use crate::config::RuntimeConfig;
use crate::expression::{distinct_hosts, scan_expression};
use crate::file_processor::SourceKind;
use crate::logging::codes;
use crate::rules::{parse_validation_rule, RuleError, RuleKind};
use crate::utils::SourceMap;
use crate::{log_error, log_success, log_warning};

/// Analyze every line of `source` as `kind`
pub fn analyze_source(kind: SourceKind, source: &str, config: &RuntimeConfig) -> SourceAnalysis {
    let source_map = SourceMap::new(source.to_string());
    let mut analysis = SourceAnalysis::new(kind);

    for (index, line) in source.lines().enumerate() {
        let line_no = (index + 1) as u32;
        analysis.total_lines += 1;

        let trimmed = line.trim();
        if trimmed.is_empty()
            || (config.file_processor.allow_comment_lines && trimmed.starts_with('#'))
        {
            analysis.skipped_lines += 1;
            continue;
        }

        let line = LineSource {
            map: &source_map,
            line_no,
            text: line,
        };
        match kind {
            SourceKind::Expression => analyze_expression(&line, config, &mut analysis),
            SourceKind::Rules => analyze_rule(&line, config, &mut analysis),
        }
    }

    for failure in &analysis.failures {
        log_error!(
            failure.code,
            &failure.message,
            span = failure.span,
            "line" => failure.line
        );
    }
    for warning in &analysis.warnings {
        log_warning!(
            code = warning.code,
            &warning.message,
            span = warning.span,
            "line" => warning.line
        );
    }

    match kind {
        SourceKind::Expression => log_success!(
            codes::success::MACRO_SCAN_COMPLETE,
            "Expression scan complete",
            "expressions" => analysis.expressions.len(),
            "macros" => analysis.macro_count(),
            "failures" => analysis.failures.len()
        ),
        SourceKind::Rules => log_success!(
            codes::success::RULE_PARSING_COMPLETE,
            "Rule parsing complete",
            "rule_lines" => analysis.rules.len(),
            "failures" => analysis.failures.len()
        ),
    }

    analysis
}

struct LineSource<'a> {
    map: &'a SourceMap,
    line_no: u32,
    text: &'a str,
}

impl LineSource<'_> {
    /// Failure located `offset` bytes into the line
    fn failure(
        &self,
        code: codes::Code,
        message: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> LineFailure {
        let span = self.map.span_in_line(self.line_no, offset, len);
        LineFailure::new(code, message, span)
    }

    /// First non-space byte of the line
    fn content_offset(&self) -> usize {
        self.text.len() - self.text.trim_start().len()
    }
}

fn analyze_expression(
    line: &LineSource<'_>,
    config: &RuntimeConfig,
    analysis: &mut SourceAnalysis,
) {
    let text = line.text;
    let start = line.content_offset();

    if text.len() > expression::MAX_EXPRESSION_LENGTH {
        analysis.failures.push(line.failure(
            codes::expression::EXPRESSION_TOO_LONG,
            format!(
                "Expression is {} bytes long (max: {})",
                text.len(),
                expression::MAX_EXPRESSION_LENGTH
            ),
            start,
            1,
        ));
        return;
    }

    let scan = scan_expression(text, config.expression.skip_other_macros);

    for error in &scan.malformed {
        analysis.failures.push(line.failure(
            error.error_code(),
            error.to_string(),
            error.position(),
            1,
        ));
    }

    if scan.macros.len() > expression::MAX_MACROS_PER_EXPRESSION {
        analysis.failures.push(line.failure(
            codes::expression::TOO_MANY_MACROS,
            format!(
                "Expression holds {} function macros (max: {})",
                scan.macros.len(),
                expression::MAX_MACROS_PER_EXPRESSION
            ),
            start,
            1,
        ));
        return;
    }

    if scan.macros.is_empty()
        && scan.malformed.is_empty()
        && config.expression.warn_on_missing_macros
    {
        analysis.warnings.push(line.failure(
            codes::expression::NO_FUNCTION_MACROS,
            "Expression contains no function macros",
            start,
            text.trim().len(),
        ));
    }

    analysis.expressions.push(ExpressionReport {
        line: line.line_no,
        expression: text.to_string(),
        hosts: distinct_hosts(&scan.macros),
        macros: scan.macros,
    });
}

fn analyze_rule(line: &LineSource<'_>, config: &RuntimeConfig, analysis: &mut SourceAnalysis) {
    let text = line.text;

    if text.len() > rule_limits::MAX_RULE_LENGTH {
        analysis.failures.push(line.failure(
            codes::rules::RULE_TOO_LONG,
            format!(
                "Rule string is {} bytes long (max: {})",
                text.len(),
                rule_limits::MAX_RULE_LENGTH
            ),
            line.content_offset(),
            1,
        ));
        return;
    }

    let rules = match parse_validation_rule(text) {
        Ok(rules) => rules,
        Err(error) => {
            let message = if config.rules.include_source_in_errors {
                error.to_string()
            } else {
                rule_error_summary(&error)
            };
            analysis
                .failures
                .push(line.failure(error.error_code(), message, error.position(), 1));
            return;
        }
    };

    if let Some(values) = rules.get(RuleKind::In).and_then(|value| value.as_list()) {
        if values.len() > rule_limits::MAX_IN_VALUES {
            analysis.failures.push(line.failure(
                codes::rules::TOO_MANY_VALUES,
                format!(
                    "Rule \"in\" lists {} values (max: {})",
                    values.len(),
                    rule_limits::MAX_IN_VALUES
                ),
                line.content_offset(),
                1,
            ));
            return;
        }
    }

    analysis.rules.push(RuleReport {
        line: line.line_no,
        rule: text.to_string(),
        rules,
    });
}

/// Error text without the rule string itself
fn rule_error_summary(error: &RuleError) -> String {
    match error {
        RuleError::SyntaxError { position, .. } => {
            format!("Cannot parse validation rules at position {}.", position)
        }
        other => other.to_string(),
    }
}
