//! Parameter list state machines
//!
//! Item keys carry bracketed parameters (`key[a,"b",[c,d]]`) and functions carry
//! parenthesized ones (`avg(5m,"x\"y")`). Both lists are scanned with the same
//! four states. The transitions are pure functions over the current byte and
//! one byte of lookahead; the scan loops below only apply their decisions to a
//! [`Cursor`].

use super::error::{MacroError, MacroResult};
use crate::scanner::Cursor;

/// Position inside a parameter list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamState {
    /// Start of a parameter, leading spaces are skipped
    New,
    /// After a quoted parameter or a closed nested list
    End,
    /// Inside a parameter without quotes
    Unquoted,
    /// Inside a double-quoted parameter
    Quoted,
}

/// Outcome of one bracket transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketStep {
    /// Keep scanning in `state` at nesting `depth` after consuming bytes
    Continue {
        state: ParamState,
        depth: usize,
        consumed: usize,
    },
    /// The outermost list closed after consuming bytes
    Done { consumed: usize },
    /// The current byte is not allowed in this state
    Reject,
}

/// One step of the `[...]` machine. `depth` counts open brackets and is at
/// least one while scanning.
pub fn bracket_transition(
    state: ParamState,
    depth: usize,
    current: u8,
    next: Option<u8>,
) -> BracketStep {
    let stay = |state, consumed| BracketStep::Continue {
        state,
        depth,
        consumed,
    };

    match state {
        ParamState::New => match current {
            b' ' | b',' => stay(ParamState::New, 1),
            b'[' => BracketStep::Continue {
                state: ParamState::New,
                depth: depth + 1,
                consumed: 1,
            },
            b']' => close_bracket(depth, next),
            b'"' => stay(ParamState::Quoted, 1),
            _ => stay(ParamState::Unquoted, 1),
        },
        ParamState::End => match current {
            b' ' => stay(ParamState::End, 1),
            b',' => stay(ParamState::New, 1),
            b']' => close_bracket(depth, next),
            _ => BracketStep::Reject,
        },
        ParamState::Unquoted => match current {
            b']' => close_bracket(depth, next),
            b',' => stay(ParamState::New, 1),
            _ => stay(ParamState::Unquoted, 1),
        },
        ParamState::Quoted => match (current, next) {
            (b'\\', Some(b'"')) => stay(ParamState::Quoted, 2),
            (b'"', _) => stay(ParamState::End, 1),
            _ => stay(ParamState::Quoted, 1),
        },
    }
}

fn close_bracket(depth: usize, next: Option<u8>) -> BracketStep {
    let depth = depth.saturating_sub(1);
    match (depth, next) {
        // `key[a][b]`: the second list continues the first
        (0, Some(b'[')) => BracketStep::Continue {
            state: ParamState::New,
            depth: 1,
            consumed: 2,
        },
        (0, _) => BracketStep::Done { consumed: 1 },
        _ => BracketStep::Continue {
            state: ParamState::End,
            depth,
            consumed: 1,
        },
    }
}

/// Consume an item key parameter list. The cursor must be on the opening `[`;
/// on success it is left just past the closing `]`.
pub fn scan_item_parameters(cursor: &mut Cursor<'_>) -> MacroResult<()> {
    let open = cursor.position();
    if !cursor.eat(b'[') {
        return Err(MacroError::ExpectedCharacter {
            expected: '[',
            position: open,
        });
    }

    let mut state = ParamState::New;
    let mut depth = 1;

    loop {
        let current = cursor
            .peek()
            .ok_or(MacroError::UnterminatedBrackets { position: open })?;

        match bracket_transition(state, depth, current, cursor.peek_nth(1)) {
            BracketStep::Continue {
                state: next_state,
                depth: next_depth,
                consumed,
            } => {
                state = next_state;
                depth = next_depth;
                cursor.advance(consumed);
            }
            BracketStep::Done { consumed } => {
                cursor.advance(consumed);
                return Ok(());
            }
            BracketStep::Reject => return Err(unexpected(cursor)),
        }
    }
}

/// What to do with the current byte of a `(...)` list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenAction {
    /// Consume without storing
    Skip,
    /// Append the byte to the current parameter
    Accumulate,
    /// `\"` inside quotes: store a `"` and consume both bytes
    Escape,
    /// `,`: finish the current parameter
    Separate,
    /// `)`: finish the list
    Close,
    /// Not allowed in this state
    Reject,
}

/// One step of the `(...)` machine
pub fn paren_transition(
    state: ParamState,
    current: u8,
    next: Option<u8>,
) -> (ParenAction, ParamState) {
    match state {
        ParamState::New => match current {
            b' ' => (ParenAction::Skip, ParamState::New),
            b',' => (ParenAction::Separate, ParamState::New),
            b')' => (ParenAction::Close, ParamState::New),
            b'"' => (ParenAction::Skip, ParamState::Quoted),
            _ => (ParenAction::Accumulate, ParamState::Unquoted),
        },
        ParamState::Unquoted => match current {
            b',' => (ParenAction::Separate, ParamState::New),
            b')' => (ParenAction::Close, ParamState::Unquoted),
            _ => (ParenAction::Accumulate, ParamState::Unquoted),
        },
        ParamState::Quoted => match (current, next) {
            (b'\\', Some(b'"')) => (ParenAction::Escape, ParamState::Quoted),
            (b'"', _) => (ParenAction::Skip, ParamState::End),
            _ => (ParenAction::Accumulate, ParamState::Quoted),
        },
        ParamState::End => match current {
            b' ' => (ParenAction::Skip, ParamState::End),
            b',' => (ParenAction::Separate, ParamState::New),
            b')' => (ParenAction::Close, ParamState::End),
            _ => (ParenAction::Reject, ParamState::End),
        },
    }
}

/// Consume a function parameter list and decode its values. The cursor must be
/// on the opening `(`; on success it is left just past the closing `)`.
///
/// `()` yields no parameters; otherwise every comma-separated slot yields one
/// value, so `(,)` yields two empty strings.
pub fn scan_function_parameters(cursor: &mut Cursor<'_>) -> MacroResult<Vec<String>> {
    let open = cursor.position();
    if !cursor.eat(b'(') {
        return Err(MacroError::ExpectedCharacter {
            expected: '(',
            position: open,
        });
    }

    let mut state = ParamState::New;
    let mut params = Vec::new();
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let current = cursor
            .peek()
            .ok_or(MacroError::UnterminatedParameters { position: open })?;

        let (action, next_state) = paren_transition(state, current, cursor.peek_nth(1));
        match action {
            ParenAction::Skip => cursor.advance(1),
            ParenAction::Accumulate => {
                buffer.push(current);
                cursor.advance(1);
            }
            ParenAction::Escape => {
                buffer.push(b'"');
                cursor.advance(2);
            }
            ParenAction::Separate => {
                params.push(take_param(&mut buffer));
                cursor.advance(1);
            }
            ParenAction::Close => {
                if !(state == ParamState::New && params.is_empty()) {
                    params.push(take_param(&mut buffer));
                }
                cursor.advance(1);
                return Ok(params);
            }
            ParenAction::Reject => return Err(unexpected(cursor)),
        }
        state = next_state;
    }
}

fn take_param(buffer: &mut Vec<u8>) -> String {
    String::from_utf8_lossy(&std::mem::take(buffer)).into_owned()
}

fn unexpected(cursor: &Cursor<'_>) -> MacroError {
    MacroError::UnexpectedCharacter {
        found: cursor.current_char().unwrap_or(char::REPLACEMENT_CHARACTER),
        position: cursor.position(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn scan_brackets(text: &str) -> MacroResult<usize> {
        let mut cursor = Cursor::new(text);
        scan_item_parameters(&mut cursor).map(|_| cursor.position())
    }

    fn scan_parens(text: &str) -> MacroResult<Vec<String>> {
        let mut cursor = Cursor::new(text);
        scan_function_parameters(&mut cursor)
    }

    #[test]
    fn test_bracket_transitions_from_new() {
        assert_eq!(
            bracket_transition(ParamState::New, 1, b',', None),
            BracketStep::Continue {
                state: ParamState::New,
                depth: 1,
                consumed: 1
            }
        );
        assert_eq!(
            bracket_transition(ParamState::New, 1, b'[', None),
            BracketStep::Continue {
                state: ParamState::New,
                depth: 2,
                consumed: 1
            }
        );
        assert_eq!(
            bracket_transition(ParamState::New, 2, b']', Some(b',')),
            BracketStep::Continue {
                state: ParamState::End,
                depth: 1,
                consumed: 1
            }
        );
        assert_eq!(
            bracket_transition(ParamState::New, 1, b']', Some(b'.')),
            BracketStep::Done { consumed: 1 }
        );
    }

    #[test]
    fn test_bracket_end_state_rejects_text() {
        assert_eq!(
            bracket_transition(ParamState::End, 1, b'x', None),
            BracketStep::Reject
        );
        assert_eq!(
            bracket_transition(ParamState::End, 1, b',', None),
            BracketStep::Continue {
                state: ParamState::New,
                depth: 1,
                consumed: 1
            }
        );
    }

    #[test]
    fn test_bracket_quoted_escape_consumes_two() {
        assert_eq!(
            bracket_transition(ParamState::Quoted, 1, b'\\', Some(b'"')),
            BracketStep::Continue {
                state: ParamState::Quoted,
                depth: 1,
                consumed: 2
            }
        );
        assert_eq!(
            bracket_transition(ParamState::Quoted, 1, b']', None),
            BracketStep::Continue {
                state: ParamState::Quoted,
                depth: 1,
                consumed: 1
            }
        );
    }

    #[test]
    fn test_zapcat_joined_lists() {
        assert_eq!(
            bracket_transition(ParamState::Unquoted, 1, b']', Some(b'[')),
            BracketStep::Continue {
                state: ParamState::New,
                depth: 1,
                consumed: 2
            }
        );
        assert_eq!(scan_brackets("[a][b].x"), Ok(6));
    }

    #[test]
    fn test_scan_item_parameters() {
        assert_eq!(scan_brackets("[,80]"), Ok(5));
        assert_eq!(scan_brackets("[]"), Ok(2));
        assert_eq!(scan_brackets("[a,\"b],c\",[d,[e]]] tail"), Ok(18));
        assert_eq!(scan_brackets("[\"a\\\"]\"]"), Ok(8));
    }

    #[test]
    fn test_scan_item_parameters_failures() {
        assert_matches!(
            scan_brackets("[1.func(0)}"),
            Err(MacroError::UnterminatedBrackets { position: 0 })
        );
        assert_matches!(
            scan_brackets("[\"a\"b]"),
            Err(MacroError::UnexpectedCharacter {
                found: 'b',
                position: 4
            })
        );
        assert_matches!(
            scan_brackets("[[a]x]"),
            Err(MacroError::UnexpectedCharacter { found: 'x', .. })
        );
        assert_matches!(
            scan_brackets("a]"),
            Err(MacroError::ExpectedCharacter { expected: '[', .. })
        );
    }

    #[test]
    fn test_paren_transitions() {
        assert_eq!(
            paren_transition(ParamState::New, b'"', None),
            (ParenAction::Skip, ParamState::Quoted)
        );
        assert_eq!(
            paren_transition(ParamState::Quoted, b'\\', Some(b'"')),
            (ParenAction::Escape, ParamState::Quoted)
        );
        assert_eq!(
            paren_transition(ParamState::Quoted, b'\\', Some(b'n')),
            (ParenAction::Accumulate, ParamState::Quoted)
        );
        assert_eq!(
            paren_transition(ParamState::End, b'x', None).0,
            ParenAction::Reject
        );
    }

    #[test]
    fn test_quoted_parameters_are_decoded() {
        assert_eq!(
            scan_parens(r#"("a,b","c\"d")"#),
            Ok(vec!["a,b".to_string(), "c\"d".to_string()])
        );
    }

    #[test]
    fn test_parameter_list_shapes() {
        assert_eq!(scan_parens("()"), Ok(vec![]));
        assert_eq!(scan_parens("(  )"), Ok(vec![]));
        assert_eq!(scan_parens("(0)"), Ok(vec!["0".to_string()]));
        assert_eq!(
            scan_parens("(,)"),
            Ok(vec![String::new(), String::new()])
        );
        assert_eq!(
            scan_parens("( 5m , 1h)"),
            Ok(vec!["5m ".to_string(), "1h".to_string()])
        );
        assert_eq!(
            scan_parens(r#"("x\y")"#),
            Ok(vec![r"x\y".to_string()])
        );
        assert_eq!(
            scan_parens("(é,ü)"),
            Ok(vec!["é".to_string(), "ü".to_string()])
        );
    }

    #[test]
    fn test_parameter_list_failures() {
        assert_matches!(
            scan_parens("(0"),
            Err(MacroError::UnterminatedParameters { position: 0 })
        );
        assert_matches!(
            scan_parens(r#"("a" b)"#),
            Err(MacroError::UnexpectedCharacter {
                found: 'b',
                position: 5
            })
        );
        assert_matches!(
            scan_parens(r#"("open)"#),
            Err(MacroError::UnterminatedParameters { .. })
        );
    }
}
