//! Character classes and the byte cursor shared by the macro and rule parsers

pub mod chars;
pub mod cursor;

pub use chars::{is_function_char, is_host_char, is_key_char, is_rule_identifier_char};
pub use cursor::Cursor;
