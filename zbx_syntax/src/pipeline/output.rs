use super::result::{ExpressionReport, LineFailure, RuleReport, SourceAnalysis};
use crate::file_processor::SourceKind;
use crate::utils::SourceMap;
use serde::Serialize;

/// JSON view of one analyzed source
#[derive(Debug, Serialize)]
pub struct PipelineOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<&'a str>,
    pub kind: SourceKind,
    pub valid: bool,
    pub total_lines: usize,
    pub skipped_lines: usize,
    pub expressions: &'a [ExpressionReport],
    pub rules: &'a [RuleReport],
    pub failures: &'a [LineFailure],
    pub warnings: &'a [LineFailure],
}

impl<'a> PipelineOutput<'a> {
    pub fn new(file: Option<&'a str>, analysis: &'a SourceAnalysis) -> Self {
        Self {
            file,
            kind: analysis.kind,
            valid: analysis.is_valid(),
            total_lines: analysis.total_lines,
            skipped_lines: analysis.skipped_lines,
            expressions: &analysis.expressions,
            rules: &analysis.rules,
            failures: &analysis.failures,
            warnings: &analysis.warnings,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Render failures against the source they came from, one snippet each
pub fn render_failures(source: &str, failures: &[LineFailure]) -> String {
    let map = SourceMap::new(source.to_string());
    failures
        .iter()
        .map(|failure| {
            map.format_error(
                &failure.span,
                &format!("[{}] {}", failure.code, failure.message),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::pipeline::analyze_source;

    #[test]
    fn test_expression_output_shape() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        let analysis = analyze_source(
            SourceKind::Expression,
            "{srv:net.tcp.port[,80].last()}=0\n",
            &config,
        );
        let json = serde_json::to_value(PipelineOutput::new(Some("a.expr"), &analysis)).unwrap();

        assert_eq!(json["file"], "a.expr");
        assert_eq!(json["kind"], "expression");
        assert_eq!(json["valid"], true);
        assert_eq!(json["rules"], serde_json::json!([]));

        let found = &json["expressions"][0]["macros"][0];
        assert_eq!(found["host"], "srv");
        assert_eq!(found["item"], "net.tcp.port[,80]");
        assert_eq!(found["function_name"], "last");
        assert!(found.get("source").is_none());
    }

    #[test]
    fn test_rule_output_shape() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        let analysis = analyze_source(SourceKind::Rules, "required|in a,b\nid|id\n", &config);
        let json = serde_json::to_value(PipelineOutput::new(None, &analysis)).unwrap();

        assert!(json.get("file").is_none());
        assert_eq!(json["valid"], false);
        assert_eq!(json["rules"][0]["rules"]["in"], serde_json::json!(["a", "b"]));
        assert_eq!(json["failures"][0]["code"], "E041");
        assert_eq!(json["failures"][0]["line"], 2);
    }

    #[test]
    fn test_render_failures_points_at_column() {
        let config = RuntimeConfig::from_toml_str("").unwrap();
        let source = "required\nnot_empty|le5\n";
        let analysis = analyze_source(SourceKind::Rules, source, &config);

        let rendered = render_failures(source, &analysis.failures);
        assert!(rendered.contains("Error: [E040]"));
        assert!(rendered.contains("--> 2:11"));
        assert!(rendered.contains("2 | not_empty|le5"));
        assert!(rendered.contains("  | ") && rendered.contains("^"));
        assert!(render_failures(source, &[]).is_empty());
    }
}
