//! Parser for `|`-separated validation rule strings such as
//! `required|not_empty|in 0,1,2|db hosts.host`

use super::error::{RuleError, RuleResult};
use super::types::{RuleArgument, RuleKind, RuleValue, ValidationRuleSet};
use crate::scanner::{is_rule_identifier_char, Cursor};

/// Parse a complete rule string. The whole input must be consumed.
pub fn parse_validation_rule(rule: &str) -> RuleResult<ValidationRuleSet> {
    RuleParser::new(rule).parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting a keyword
    Begin,
    /// Expecting `|` or the end of input
    End,
}

struct RuleParser<'a> {
    cursor: Cursor<'a>,
    rules: ValidationRuleSet,
}

impl<'a> RuleParser<'a> {
    fn new(rule: &'a str) -> Self {
        Self {
            cursor: Cursor::new(rule),
            rules: ValidationRuleSet::new(),
        }
    }

    fn parse(mut self) -> RuleResult<ValidationRuleSet> {
        let mut state = State::Begin;

        loop {
            self.cursor.skip_spaces();
            if self.cursor.is_at_end() {
                return Ok(self.rules);
            }

            let position = self.cursor.position();
            state = match state {
                State::Begin => {
                    let (kind, value) = self
                        .parse_keyword()?
                        .ok_or_else(|| self.syntax_error(position))?;

                    self.rules
                        .insert(kind, value)
                        .map_err(|_| RuleError::DuplicateRule {
                            keyword: kind.keyword().to_string(),
                            position,
                        })?;
                    State::End
                }
                State::End => {
                    if !self.cursor.eat(b'|') {
                        return Err(self.syntax_error(position));
                    }
                    State::Begin
                }
            };
        }
    }

    fn syntax_error(&self, position: usize) -> RuleError {
        RuleError::syntax_error(self.cursor.source(), position)
    }

    /// First keyword in priority order that matches here, with its argument
    fn parse_keyword(&mut self) -> RuleResult<Option<(RuleKind, RuleValue)>> {
        let mark = self.cursor.position();

        for kind in RuleKind::PRIORITY {
            if let Some(value) = self.parse_rule(kind)? {
                return Ok(Some((kind, value)));
            }
            self.cursor.reset(mark);
        }

        Ok(None)
    }

    fn parse_rule(&mut self, kind: RuleKind) -> RuleResult<Option<RuleValue>> {
        if !self.cursor.eat_str(kind.keyword()) {
            return Ok(None);
        }

        match kind.argument() {
            RuleArgument::Flag => Ok(Some(RuleValue::Flag)),
            RuleArgument::Integer => self.parse_integer(kind),
            RuleArgument::ValueList => Ok(self.parse_value_list()),
            RuleArgument::DbField => Ok(self.parse_db_field()),
        }
    }

    /// ` -?[0-9]+` fitting in an `i32`
    fn parse_integer(&mut self, kind: RuleKind) -> RuleResult<Option<RuleValue>> {
        if self.cursor.skip_spaces() == 0 {
            return Ok(None);
        }

        let start = self.cursor.position();
        self.cursor.eat(b'-');
        if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
            return Ok(None);
        }

        let literal = self.cursor.slice_from(start);
        literal
            .parse::<i32>()
            .map_err(|_| RuleError::InvalidInteger {
                keyword: kind.keyword().to_string(),
                value: literal.to_string(),
                position: start,
            })?;

        Ok(Some(RuleValue::Scalar(literal.to_string())))
    }

    /// ` v1,v2,...`; values end at space, `,` or `|` and may not be empty
    fn parse_value_list(&mut self) -> Option<RuleValue> {
        if self.cursor.skip_spaces() == 0 {
            return None;
        }

        let mut values = Vec::new();
        loop {
            let start = self.cursor.position();
            while let Some(byte) = self.cursor.peek() {
                if matches!(byte, b' ' | b',' | b'|') {
                    break;
                }
                self.cursor.advance(1);
            }

            let value = self.cursor.slice_from(start);
            if value.is_empty() {
                return None;
            }
            values.push(value.to_string());

            if !self.cursor.eat(b',') {
                return Some(RuleValue::List(values));
            }
        }
    }

    /// ` table.field`
    fn parse_db_field(&mut self) -> Option<RuleValue> {
        if self.cursor.skip_spaces() == 0 {
            return None;
        }

        let table = self.cursor.eat_while(is_rule_identifier_char);
        if table.is_empty() || !self.cursor.eat(b'.') {
            return None;
        }

        let field = self.cursor.eat_while(is_rule_identifier_char);
        if field.is_empty() {
            return None;
        }

        Some(RuleValue::Db {
            table: table.to_string(),
            field: field.to_string(),
        })
    }
}
