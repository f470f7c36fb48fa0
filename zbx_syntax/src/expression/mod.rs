//! Trigger expression helpers built on the function macro parser
//!
//! The parser only recognizes a macro at a given offset. Finding every macro in
//! an expression, and rewriting them, is done here by walking the expression
//! and retrying at each `{`.

use crate::function_macro::{parse_function_macro, FunctionMacroMatch, MacroError};
use crate::scanner::Cursor;

/// Built-in macro that may appear in trigger expressions
const TRIGGER_VALUE_MACRO: &str = "{TRIGGER.VALUE}";

/// Function macros found in an expression, plus the `{` that started neither
/// a function macro nor any other known macro
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionScan {
    pub macros: Vec<FunctionMacroMatch>,
    pub malformed: Vec<MacroError>,
}

/// Every function macro in `expression`, in order, skipping user, LLD and
/// built-in macros as whole units
pub fn scan_function_macros(expression: &str) -> Vec<FunctionMacroMatch> {
    scan_expression(expression, true).macros
}

/// Like [`scan_function_macros`]; with `skip_other_macros` off, the inside of
/// other macros (for example a user macro context) is scanned too
pub fn scan_function_macros_with(
    expression: &str,
    skip_other_macros: bool,
) -> Vec<FunctionMacroMatch> {
    scan_expression(expression, skip_other_macros).macros
}

/// Scan for function macros and collect parse failures.
///
/// Failures are only collected when other macros are skipped, since otherwise
/// a user macro cannot be told apart from a broken function macro. A `{`
/// inside text already covered by an earlier failure is not reported again.
pub fn scan_expression(expression: &str, skip_other_macros: bool) -> ExpressionScan {
    let mut scan = ExpressionScan::default();
    let mut pos = 0;
    let mut reported_until = 0;

    while let Some(offset) = expression[pos..].find('{') {
        let at = pos + offset;
        match parse_function_macro(expression, at) {
            Ok(found) => {
                pos = found.end();
                scan.macros.push(found);
            }
            Err(error) => {
                if !skip_other_macros {
                    pos = at + 1;
                    continue;
                }

                pos = match skip_other_macro(expression, at) {
                    Some(end) => end,
                    None => {
                        if at >= reported_until {
                            reported_until = error.position().max(at + 1);
                            scan.malformed.push(error);
                        }
                        at + 1
                    }
                };
            }
        }
    }

    scan
}

/// Replace the host of every function macro whose host is exactly `src_host`
pub fn replace_host(expression: &str, src_host: &str, dst_host: &str) -> String {
    let mut output = String::with_capacity(expression.len());
    let mut copied = 0;

    for found in scan_function_macros(expression) {
        output.push_str(&expression[copied..found.position]);
        if found.host == src_host {
            output.push_str(&found.with_host(dst_host));
        } else {
            output.push_str(&found.match_text);
        }
        copied = found.end();
    }

    output.push_str(&expression[copied..]);
    output
}

/// Distinct host names referenced by the expression, in order of first use
pub fn collect_hosts(expression: &str) -> Vec<String> {
    distinct_hosts(&scan_function_macros(expression))
}

/// Distinct host names of already scanned macros, in order of first use
pub fn distinct_hosts(macros: &[FunctionMacroMatch]) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for found in macros {
        if !hosts.contains(&found.host) {
            hosts.push(found.host.clone());
        }
    }
    hosts
}

/// End offset of a user macro (`{$NAME}`, `{$NAME:context}`), an LLD macro
/// (`{#NAME}`) or `{TRIGGER.VALUE}` starting at `pos`
fn skip_other_macro(expression: &str, pos: usize) -> Option<usize> {
    let mut cursor = Cursor::at(expression, pos);
    if !cursor.eat(b'{') {
        return None;
    }

    match cursor.peek()? {
        b'$' => {
            cursor.bump();
            if cursor.eat_while(is_macro_name_char).is_empty() {
                return None;
            }
            if cursor.eat(b':') {
                skip_macro_context(&mut cursor)?;
            }
        }
        b'#' => {
            cursor.bump();
            if cursor.eat_while(is_macro_name_char).is_empty() {
                return None;
            }
        }
        _ => {
            cursor.reset(pos);
            return cursor
                .eat_str(TRIGGER_VALUE_MACRO)
                .then(|| cursor.position());
        }
    }

    cursor.eat(b'}').then(|| cursor.position())
}

/// Skip a user macro context, quoted (`"a\"b"`) or plain up to `}`
fn skip_macro_context(cursor: &mut Cursor<'_>) -> Option<()> {
    cursor.skip_spaces();
    if cursor.eat(b'"') {
        loop {
            match cursor.bump()? {
                b'\\' if cursor.peek() == Some(b'"') => cursor.advance(1),
                b'"' => break,
                _ => {}
            }
        }
        cursor.skip_spaces();
    } else {
        while cursor.peek()? != b'}' {
            cursor.advance(1);
        }
    }
    Some(())
}

fn is_macro_name_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '_' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_finds_all_macros() {
        let expr = "{web:net.tcp.service[http].last(0)}=0 or {db:mysql.ping.max(#3)}<1";
        let found = scan_function_macros(expr);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].host, "web");
        assert_eq!(found[0].item, "net.tcp.service[http]");
        assert_eq!(found[1].host, "db");
        assert_eq!(found[1].function_param_list, vec!["#3"]);
        for m in &found {
            assert_eq!(&expr[m.position..m.end()], m.match_text);
        }
    }

    #[test]
    fn test_scan_skips_other_macros() {
        let expr = "{h:k.last()}>{$LIMIT:\"{x:y.last()}\"} and {#IFNAME}=1 and {TRIGGER.VALUE}=0";

        let skipped = scan_function_macros(expr);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].host, "h");

        let unskipped = scan_function_macros_with(expr, false);
        assert_eq!(unskipped.len(), 2);
        assert_eq!(unskipped[1].host, "x");
    }

    #[test]
    fn test_skip_other_macro_shapes() {
        assert_eq!(skip_other_macro("{$A}", 0), Some(4));
        assert_eq!(skip_other_macro("{$A:ctx}", 0), Some(8));
        assert_eq!(skip_other_macro(r#"{$A:"a\"}"}"#, 0), Some(11));
        assert_eq!(skip_other_macro("{#NAME}", 0), Some(7));
        assert_eq!(skip_other_macro("x{TRIGGER.VALUE}", 1), Some(16));
        assert_eq!(skip_other_macro("{$}", 0), None);
        assert_eq!(skip_other_macro("{#lower}", 0), None);
        assert_eq!(skip_other_macro("{$A:\"open", 0), None);
    }

    #[test]
    fn test_scan_reports_malformed_macros() {
        let scan = scan_expression("{h:k.min(1)}=1 or {broken:key.last(}", true);
        assert_eq!(scan.macros.len(), 1);
        assert_eq!(scan.macros[0].host, "h");
        assert_eq!(
            scan.malformed,
            vec![MacroError::UnterminatedParameters { position: 34 }]
        );

        let scan = scan_expression("{h:k.last()}>{$LIMIT} and {#IFNAME}=1", true);
        assert!(scan.malformed.is_empty());

        let scan = scan_expression("{$LIMIT}>1", false);
        assert!(scan.macros.is_empty());
        assert!(scan.malformed.is_empty());
    }

    #[test]
    fn test_scan_reports_nested_failure_once() {
        let scan = scan_expression("{a:b[{c].last(}", true);
        assert_eq!(scan.malformed.len(), 1);
    }

    #[test]
    fn test_scan_without_macros() {
        assert!(scan_function_macros("1=1").is_empty());
        assert!(scan_function_macros("{broken:key.last(}").is_empty());
        assert!(scan_function_macros("").is_empty());
    }

    #[test]
    fn test_replace_host() {
        let expr = "{old:a.last()}>0 & {other:b.min(5m)}<1 & {old:c[x].avg(1h)}=2";
        assert_eq!(
            replace_host(expr, "old", "new host"),
            "{new host:a.last()}>0 & {other:b.min(5m)}<1 & {new host:c[x].avg(1h)}=2"
        );
        assert_eq!(replace_host(expr, "missing", "x"), expr);
    }

    #[test]
    fn test_replace_host_requires_exact_match() {
        let expr = "{old:a.last()}+{older:a.last()}";
        assert_eq!(
            replace_host(expr, "old", "new"),
            "{new:a.last()}+{older:a.last()}"
        );
    }

    #[test]
    fn test_collect_hosts_in_first_use_order() {
        let expr = "{b:k.last()}+{a:k.last()}+{b:j.min(1)}";
        assert_eq!(collect_hosts(expr), vec!["b", "a"]);
    }

    #[test]
    fn test_distinct_hosts_of_scanned_macros() {
        let expr = "{$LIMIT}<{db:k.last()} or {web:k.last()}>{db:j.avg(5)}";
        let scan = scan_expression(expr, true);
        assert_eq!(scan.macros.len(), 3);
        assert_eq!(distinct_hosts(&scan.macros), vec!["db", "web"]);
        assert!(distinct_hosts(&[]).is_empty());
    }
}
