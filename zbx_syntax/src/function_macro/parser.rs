//! Recognizer for `{host:key.function(params)}`
//!
//! ```text
//! macro    := '{' host ':' item '.' function '}'
//! host     := host_char+
//! item     := key_char+ ( '[' params ']' )?
//! function := function_char+ '(' params ')'
//! ```
//!
//! The parser works on a private copy of the cursor, so a failed attempt never
//! moves the caller's position.

use super::error::{MacroError, MacroResult};
use super::params::{scan_function_parameters, scan_item_parameters};
use super::result::FunctionMacroMatch;
use crate::scanner::{is_function_char, is_host_char, is_key_char, Cursor};

/// Parse a function macro starting exactly at byte offset `pos` of `source`
pub fn parse_function_macro(source: &str, pos: usize) -> MacroResult<FunctionMacroMatch> {
    if pos > source.len() {
        return Err(MacroError::OutOfRange {
            position: pos,
            length: source.len(),
        });
    }

    FunctionMacroParser::new(source, pos).parse()
}

struct FunctionMacroParser<'a> {
    cursor: Cursor<'a>,
    start: usize,
}

struct FunctionCall<'a> {
    text: &'a str,
    name: &'a str,
    param: &'a str,
    params: Vec<String>,
}

impl<'a> FunctionMacroParser<'a> {
    fn new(source: &'a str, start: usize) -> Self {
        Self {
            cursor: Cursor::at(source, start),
            start,
        }
    }

    fn parse(mut self) -> MacroResult<FunctionMacroMatch> {
        self.expect(b'{')?;
        let host = self.parse_host()?;
        self.expect(b':')?;
        let item = self.parse_item_key()?;
        self.expect(b'.')?;
        let call = self.parse_function()?;
        self.expect(b'}')?;

        let match_text = self.cursor.slice_from(self.start);

        Ok(FunctionMacroMatch {
            source: self.cursor.source().to_string(),
            match_text: match_text.to_string(),
            position: self.start,
            length: match_text.len(),
            host: host.to_string(),
            item: item.to_string(),
            function: call.text.to_string(),
            function_name: call.name.to_string(),
            function_param: call.param.to_string(),
            function_param_list: call.params,
        })
    }

    fn expect(&mut self, expected: u8) -> MacroResult<()> {
        if self.cursor.eat(expected) {
            Ok(())
        } else {
            Err(MacroError::ExpectedCharacter {
                expected: expected as char,
                position: self.cursor.position(),
            })
        }
    }

    fn parse_host(&mut self) -> MacroResult<&'a str> {
        let start = self.cursor.position();
        let host = self.cursor.eat_while(is_host_char);
        if host.is_empty() {
            return Err(MacroError::EmptyHost { position: start });
        }
        Ok(host)
    }

    fn parse_item_key(&mut self) -> MacroResult<&'a str> {
        let start = self.cursor.position();
        let run = self.cursor.eat_while(is_key_char);
        if run.is_empty() {
            return Err(MacroError::EmptyItemKey { position: start });
        }

        match self.cursor.peek() {
            // The run swallowed the function name too: `agent.ping.last(`
            Some(b'(') => match run.rfind('.') {
                Some(dot) if dot > 0 => self.cursor.reset(start + dot),
                _ => return Err(MacroError::InvalidItemKey { position: start }),
            },
            Some(b'[') => scan_item_parameters(&mut self.cursor)?,
            _ => {}
        }

        Ok(self.cursor.slice_from(start))
    }

    fn parse_function(&mut self) -> MacroResult<FunctionCall<'a>> {
        let start = self.cursor.position();
        let name = self.cursor.eat_while(is_function_char);
        if name.is_empty() {
            return Err(MacroError::EmptyFunctionName { position: start });
        }

        if self.cursor.peek() != Some(b'(') {
            return Err(MacroError::ExpectedCharacter {
                expected: '(',
                position: self.cursor.position(),
            });
        }

        let param_start = self.cursor.position() + 1;
        let params = scan_function_parameters(&mut self.cursor)?;
        let end = self.cursor.position();

        Ok(FunctionCall {
            text: self.cursor.slice(start, end),
            name,
            param: self.cursor.slice(param_start, end - 1),
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function_macro::ParseStatus;
    use assert_matches::assert_matches;

    #[test]
    fn test_simple_macro() {
        let m = parse_function_macro("{Zabbix server:system.cpu.load.avg(5m)}", 0).unwrap();

        assert_eq!(m.host, "Zabbix server");
        assert_eq!(m.item, "system.cpu.load");
        assert_eq!(m.function, "avg(5m)");
        assert_eq!(m.function_name, "avg");
        assert_eq!(m.function_param, "5m");
        assert_eq!(m.function_param_list, vec!["5m"]);
        assert_eq!(m.status(), ParseStatus::Success);
    }

    #[test]
    fn test_bracketed_item_key() {
        let m = parse_function_macro("{host:net.tcp.port[,80].last(0)}", 0).unwrap();

        assert_eq!(m.item, "net.tcp.port[,80]");
        assert_eq!(m.function, "last(0)");
        assert_eq!(m.function_param_list, vec!["0"]);
    }

    #[test]
    fn test_function_like_item_key() {
        let m = parse_function_macro("{host:agent.ping.last(0)}", 0).unwrap();

        assert_eq!(m.item, "agent.ping");
        assert_eq!(m.function_name, "last");
    }

    #[test]
    fn test_span_round_trip_in_longer_source() {
        let source = "({a:b.c(1)}+{host 2:vfs.fs.size[/,free].last()})>0";
        let pos = source.find("{host").unwrap();
        let m = parse_function_macro(source, pos).unwrap();

        assert_eq!(&source[m.position..m.position + m.length], m.match_text);
        assert!(m.match_text.starts_with('{') && m.match_text.ends_with('}'));
        assert_eq!(m.status(), ParseStatus::SuccessCont);
        assert_eq!(m.function_param, "");
        assert!(m.function_param_list.is_empty());
    }

    #[test]
    fn test_reparse_of_match_text_is_equivalent() {
        let source = "x={srv:key[\"a b\",[c]].count(#10,\"ok\",eq)}&1";
        let first = parse_function_macro(source, 2).unwrap();
        let second = parse_function_macro(&first.match_text, 0).unwrap();

        assert_eq!(second.host, first.host);
        assert_eq!(second.item, first.item);
        assert_eq!(second.function, first.function);
        assert_eq!(second.function_param_list, first.function_param_list);
        assert_eq!(second.function_param_list, vec!["#10", "ok", "eq"]);
    }

    #[test]
    fn test_zapcat_item_key() {
        let m = parse_function_macro("{h:zabbix[host][items].last(0)}", 0).unwrap();
        assert_eq!(m.item, "zabbix[host][items]");
    }

    #[test]
    fn test_quoted_function_parameters() {
        let m = parse_function_macro(r#"{h:log.str("a,b","c\"d")}"#, 0).unwrap();

        assert_eq!(m.function_param, r#""a,b","c\"d""#);
        assert_eq!(m.function_param_list, vec!["a,b", "c\"d"]);
    }

    #[test]
    fn test_empty_host_fails() {
        assert_matches!(
            parse_function_macro("{:item.func(0)}", 0),
            Err(MacroError::EmptyHost { position: 1 })
        );
    }

    #[test]
    fn test_unbalanced_bracket_fails() {
        assert_matches!(
            parse_function_macro("{host:item[1.func(0)}", 0),
            Err(MacroError::UnterminatedBrackets { position: 10 })
        );
    }

    #[test]
    fn test_structural_failures() {
        assert_matches!(
            parse_function_macro("host:key.last(0)}", 0),
            Err(MacroError::ExpectedCharacter {
                expected: '{',
                position: 0
            })
        );
        assert_matches!(
            parse_function_macro("{host.last(0)}", 0),
            Err(MacroError::ExpectedCharacter { expected: ':', .. })
        );
        assert_matches!(
            parse_function_macro("{host:[a].last(0)}", 0),
            Err(MacroError::EmptyItemKey { position: 6 })
        );
        assert_matches!(
            parse_function_macro("{host:.last(0)}", 0),
            Err(MacroError::InvalidItemKey { position: 6 })
        );
        assert_matches!(
            parse_function_macro("{host:last(0)}", 0),
            Err(MacroError::InvalidItemKey { position: 6 })
        );
        assert_matches!(
            parse_function_macro("{host:key.Last(0)}", 0),
            Err(MacroError::EmptyFunctionName { position: 10 })
        );
        assert_matches!(
            parse_function_macro("{host:key[a].last}", 0),
            Err(MacroError::ExpectedCharacter { expected: '(', .. })
        );
        assert_matches!(
            parse_function_macro("{host:key.last(0", 0),
            Err(MacroError::UnterminatedParameters { position: 14 })
        );
        assert_matches!(
            parse_function_macro("{host:key.last(0)", 0),
            Err(MacroError::ExpectedCharacter {
                expected: '}',
                position: 17
            })
        );
    }

    #[test]
    fn test_start_position_bounds() {
        assert_matches!(
            parse_function_macro("{a:b.c()}", 20),
            Err(MacroError::OutOfRange {
                position: 20,
                length: 9
            })
        );
        assert_matches!(
            parse_function_macro("{a:b.c()}", 9),
            Err(MacroError::ExpectedCharacter { expected: '{', .. })
        );
    }

    #[test]
    fn test_non_ascii_host_stops_scan() {
        assert_matches!(
            parse_function_macro("{hôst:key.last()}", 0),
            Err(MacroError::ExpectedCharacter {
                expected: ':',
                position: 2
            })
        );
    }
}
