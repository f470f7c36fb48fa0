//! Rule keywords, their arguments, and the parsed rule set

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A validation rule keyword. Declaration order is the order keywords are
/// tried in, so longer keywords come before their prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RuleKind {
    Time,
    String,
    Required,
    NotEmpty,
    Le,
    Json,
    Int32,
    In,
    Id,
    Ge,
    Fatal,
    Db,
    ArrayId,
    ArrayDb,
    Array,
}

/// Shape of the argument a keyword takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleArgument {
    /// No argument
    Flag,
    /// A 32-bit integer literal
    Integer,
    /// A comma-separated list of values
    ValueList,
    /// `table.field`
    DbField,
}

impl RuleKind {
    pub const PRIORITY: [RuleKind; 15] = [
        RuleKind::Time,
        RuleKind::String,
        RuleKind::Required,
        RuleKind::NotEmpty,
        RuleKind::Le,
        RuleKind::Json,
        RuleKind::Int32,
        RuleKind::In,
        RuleKind::Id,
        RuleKind::Ge,
        RuleKind::Fatal,
        RuleKind::Db,
        RuleKind::ArrayId,
        RuleKind::ArrayDb,
        RuleKind::Array,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            RuleKind::Time => "time",
            RuleKind::String => "string",
            RuleKind::Required => "required",
            RuleKind::NotEmpty => "not_empty",
            RuleKind::Le => "le",
            RuleKind::Json => "json",
            RuleKind::Int32 => "int32",
            RuleKind::In => "in",
            RuleKind::Id => "id",
            RuleKind::Ge => "ge",
            RuleKind::Fatal => "fatal",
            RuleKind::Db => "db",
            RuleKind::ArrayId => "array_id",
            RuleKind::ArrayDb => "array_db",
            RuleKind::Array => "array",
        }
    }

    pub fn argument(&self) -> RuleArgument {
        match self {
            RuleKind::Le | RuleKind::Ge => RuleArgument::Integer,
            RuleKind::In => RuleArgument::ValueList,
            RuleKind::Db | RuleKind::ArrayDb => RuleArgument::DbField,
            _ => RuleArgument::Flag,
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|kind| kind.keyword() == keyword)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Argument stored for a keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    Flag,
    /// Integer literal as written, already checked to fit in an `i32`
    Scalar(String),
    List(Vec<String>),
    Db { table: String, field: String },
}

impl RuleValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            RuleValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            RuleValue::List(values) => Some(values),
            _ => None,
        }
    }
}

impl Serialize for RuleValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RuleValue::Flag => serializer.serialize_bool(true),
            RuleValue::Scalar(value) => serializer.serialize_str(value),
            RuleValue::List(values) => values.serialize(serializer),
            RuleValue::Db { table, field } => {
                let mut state = serializer.serialize_struct("DbField", 2)?;
                state.serialize_field("table", table)?;
                state.serialize_field("field", field)?;
                state.end()
            }
        }
    }
}

/// Keyword to argument mapping; each keyword appears at most once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRuleSet {
    rules: BTreeMap<RuleKind, RuleValue>,
}

impl ValidationRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule; gives the value back if the keyword is already present
    pub(crate) fn insert(&mut self, kind: RuleKind, value: RuleValue) -> Result<(), RuleValue> {
        if self.rules.contains_key(&kind) {
            return Err(value);
        }
        self.rules.insert(kind, value);
        Ok(())
    }

    pub fn get(&self, kind: RuleKind) -> Option<&RuleValue> {
        self.rules.get(&kind)
    }

    pub fn get_keyword(&self, keyword: &str) -> Option<&RuleValue> {
        RuleKind::from_keyword(keyword).and_then(|kind| self.get(kind))
    }

    pub fn contains(&self, kind: RuleKind) -> bool {
        self.rules.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleKind, &RuleValue)> {
        self.rules.iter().map(|(kind, value)| (*kind, value))
    }

    pub fn keywords(&self) -> Vec<&'static str> {
        self.rules.keys().map(RuleKind::keyword).collect()
    }
}

impl Serialize for ValidationRuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for (kind, value) in &self.rules {
            map.serialize_entry(kind.keyword(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_tries_longer_keywords_first() {
        let position = |kind: RuleKind| RuleKind::PRIORITY.iter().position(|k| *k == kind);
        assert!(position(RuleKind::Int32) < position(RuleKind::In));
        assert!(position(RuleKind::ArrayId) < position(RuleKind::Array));
        assert!(position(RuleKind::ArrayDb) < position(RuleKind::Array));
    }

    #[test]
    fn test_keyword_lookup() {
        for kind in RuleKind::PRIORITY {
            assert_eq!(RuleKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(RuleKind::from_keyword("unknown"), None);
        assert_eq!(RuleKind::ArrayDb.argument(), RuleArgument::DbField);
        assert_eq!(RuleKind::Ge.to_string(), "ge");
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = ValidationRuleSet::new();
        assert!(set.insert(RuleKind::Id, RuleValue::Flag).is_ok());
        assert_eq!(set.insert(RuleKind::Id, RuleValue::Flag), Err(RuleValue::Flag));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_serialized_shape() {
        let mut set = ValidationRuleSet::new();
        set.insert(RuleKind::Required, RuleValue::Flag).unwrap();
        set.insert(RuleKind::Le, RuleValue::Scalar("10".into())).unwrap();
        set.insert(
            RuleKind::In,
            RuleValue::List(vec!["a".into(), "b".into()]),
        )
        .unwrap();
        set.insert(
            RuleKind::Db,
            RuleValue::Db {
                table: "hosts".into(),
                field: "host".into(),
            },
        )
        .unwrap();

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "required": true,
                "le": "10",
                "in": ["a", "b"],
                "db": {"table": "hosts", "field": "host"},
            })
        );
    }
}
