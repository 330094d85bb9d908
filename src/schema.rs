//! Read-only view over one JSON schema object.
//!
//! Every keyword lookup is total: a keyword with an unexpected JSON type reads
//! as absent instead of failing, so a syntactically valid catalog can always
//! be walked to the end.
use std::collections::BTreeSet;

use serde_json::{Map, Value};

const TYPE_TAG: &str = "x-bitcoin-type";
const FORMAT_TAG: &str = "x-bitcoin-format";
const OPTIONAL_TAG: &str = "x-bitcoin-optional";
const CONDITION_TAG: &str = "x-bitcoin-condition";

/// Shape family, as far as the `type` keyword (or its absence) tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Number,
    Integer,
    Boolean,
    Null,
    Array,
    Object,
    /// `oneOf` / `anyOf` with at least one branch.
    Union,
    /// No type information at all.
    Any,
    /// A `type` keyword we cannot interpret (multi-type sets, unknown names).
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionTag {
    None,
    Amount,
    Hex,
    Range,
}

/// How a node spells nullability, if at all.
#[derive(Debug, Clone, Copy)]
pub enum Nullability<'a> {
    NonNull(SchemaNode<'a>),
    /// `nullable: true` or `type: [X, "null"]`; the node is to be read without it.
    Nullable(SchemaNode<'a>),
    /// A union with exactly one non-null branch, with or without `null` branches.
    NullableBranch(&'a Value),
}

#[derive(Debug, Clone, Copy)]
pub enum Items<'a> {
    /// Positional `items: [...]` or `prefixItems`.
    Tuple,
    Single(Option<&'a Value>),
}

#[derive(Debug, Clone, Copy)]
pub enum OpenMap<'a> {
    Closed,
    Any,
    Typed(&'a Value),
}

#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    raw: &'a Map<String, Value>,
    type_override: Option<&'a str>,
}

impl<'a> SchemaNode<'a> {
    /// Only JSON objects are schema nodes; booleans and garbage are handled by the caller.
    pub fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|raw| Self { raw, type_override: None })
    }

    fn str_keyword(&self, key: &str) -> Option<&'a str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<&'a str> {
        self.str_keyword("description").filter(|text| !text.trim().is_empty())
    }

    pub fn condition(&self) -> Option<&'a str> {
        self.str_keyword(CONDITION_TAG).filter(|text| !text.trim().is_empty())
    }

    pub fn is_reference(&self) -> bool {
        self.raw.contains_key("$ref")
    }

    pub fn type_names(&self) -> Vec<&'a str> {
        if let Some(name) = self.type_override {
            return vec![name];
        }
        match self.raw.get("type") {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// `oneOf` wins over `anyOf`.
    pub fn branches(&self) -> Option<&'a [Value]> {
        ["oneOf", "anyOf"]
            .into_iter()
            .find_map(|key| self.raw.get(key).and_then(Value::as_array))
            .map(Vec::as_slice)
    }

    fn is_null_type(&self) -> bool {
        self.type_names() == ["null"]
    }

    pub fn split_nullable(self) -> Nullability<'a> {
        let names = self.type_names();
        if names.len() == 2 && names.contains(&"null") {
            let non_null: Vec<&str> = names.iter().copied().filter(|name| *name != "null").collect();
            if let [single] = non_null.as_slice() {
                return Nullability::Nullable(Self { type_override: Some(*single), ..self });
            }
        }

        if self.raw.get("nullable") == Some(&Value::Bool(true)) {
            return Nullability::Nullable(self);
        }

        if let Some(branches) = self.branches() {
            let non_null: Vec<&Value> = branches
                .iter()
                .filter(|branch| !SchemaNode::new(branch).is_some_and(|node| node.is_null_type()))
                .collect();
            if let [single] = non_null.as_slice() {
                return Nullability::NullableBranch(*single);
            }
        }

        Nullability::NonNull(self)
    }

    pub fn kind(&self) -> Kind {
        if self.branches().is_some_and(|branches| !branches.is_empty()) {
            return Kind::Union;
        }
        match self.type_names().as_slice() {
            [] if self.raw.contains_key("type") => Kind::Unknown,
            [] if self.raw.contains_key("properties") || self.raw.contains_key("additionalProperties") => {
                Kind::Object
            }
            [] if self.raw.contains_key("items") || self.raw.contains_key("prefixItems") => Kind::Array,
            [] => Kind::Any,
            [name] => match *name {
                "string" => Kind::String,
                "number" => Kind::Number,
                "integer" => Kind::Integer,
                "boolean" => Kind::Boolean,
                "null" => Kind::Null,
                "array" => Kind::Array,
                "object" => Kind::Object,
                _ => Kind::Unknown,
            },
            _ => Kind::Unknown,
        }
    }

    pub fn extension(&self) -> ExtensionTag {
        match self.str_keyword(TYPE_TAG) {
            Some("amount") => ExtensionTag::Amount,
            Some("hex") => ExtensionTag::Hex,
            Some("range") => ExtensionTag::Range,
            _ => ExtensionTag::None,
        }
    }

    pub fn is_unix_time(&self) -> bool {
        self.str_keyword(FORMAT_TAG) == Some("unix-time")
    }

    pub fn forced_optional(&self) -> bool {
        self.raw.get(OPTIONAL_TAG) == Some(&Value::Bool(true))
    }

    pub fn items(&self) -> Items<'a> {
        if self.raw.contains_key("prefixItems") {
            return Items::Tuple;
        }
        match self.raw.get("items") {
            Some(Value::Array(_)) => Items::Tuple,
            other => Items::Single(other),
        }
    }

    /// Declared properties, in declaration order. `None` when there are none.
    pub fn properties(&self) -> Option<&'a Map<String, Value>> {
        self.raw
            .get("properties")
            .and_then(Value::as_object)
            .filter(|properties| !properties.is_empty())
    }

    pub fn required_names(&self) -> BTreeSet<&'a str> {
        self.raw
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn open_map(&self) -> OpenMap<'a> {
        match self.raw.get("additionalProperties") {
            Some(Value::Bool(true)) => OpenMap::Any,
            Some(value @ Value::Object(_)) => OpenMap::Typed(value),
            _ => OpenMap::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: &Value) -> SchemaNode<'_> {
        SchemaNode::new(value).unwrap()
    }

    #[test]
    fn kinds_from_type_keyword() {
        assert_eq!(node(&json!({"type": "string"})).kind(), Kind::String);
        assert_eq!(node(&json!({"type": ["integer"]})).kind(), Kind::Integer);
        assert_eq!(node(&json!({"type": ["string", "integer"]})).kind(), Kind::Unknown);
        assert_eq!(node(&json!({"type": "tuple"})).kind(), Kind::Unknown);
        assert_eq!(node(&json!({"type": 5})).kind(), Kind::Unknown);
        assert_eq!(node(&json!({"description": "anything"})).kind(), Kind::Any);
        assert_eq!(node(&json!({"properties": {"a": {}}})).kind(), Kind::Object);
        assert_eq!(node(&json!({"items": {"type": "string"}})).kind(), Kind::Array);
        assert_eq!(node(&json!({"oneOf": [{"type": "string"}]})).kind(), Kind::Union);
        assert_eq!(node(&json!({"oneOf": [], "type": "string"})).kind(), Kind::String);
    }

    #[test]
    fn nullable_spellings() {
        let flag = json!({"type": "integer", "nullable": true});
        assert!(matches!(node(&flag).split_nullable(), Nullability::Nullable(_)));

        let pair = json!({"type": ["null", "integer"]});
        match node(&pair).split_nullable() {
            Nullability::Nullable(inner) => assert_eq!(inner.kind(), Kind::Integer),
            other => panic!("expected nullable, got {other:?}"),
        }

        let union = json!({"anyOf": [{"type": "null"}, {"type": "boolean"}]});
        match node(&union).split_nullable() {
            Nullability::NullableBranch(branch) => assert_eq!(branch, &json!({"type": "boolean"})),
            other => panic!("expected nullable branch, got {other:?}"),
        }
    }

    #[test]
    fn lone_non_null_branch_is_nullable() {
        let lone_branch = json!({"oneOf": [{"type": "string"}]});
        match node(&lone_branch).split_nullable() {
            Nullability::NullableBranch(branch) => assert_eq!(branch, &json!({"type": "string"})),
            other => panic!("expected nullable branch, got {other:?}"),
        }
    }

    #[test]
    fn not_nullable_without_a_single_non_null_member() {
        let single = json!({"type": ["string"]});
        assert!(matches!(node(&single).split_nullable(), Nullability::NonNull(_)));

        let only_nulls = json!({"anyOf": [{"type": "null"}]});
        assert!(matches!(node(&only_nulls).split_nullable(), Nullability::NonNull(_)));

        let two_non_null = json!({"oneOf": [{"type": "string"}, {"type": "integer"}, {"type": "null"}]});
        assert!(matches!(node(&two_non_null).split_nullable(), Nullability::NonNull(_)));
    }

    #[test]
    fn extension_keywords() {
        let amount = json!({"type": "number", "x-bitcoin-type": "amount"});
        assert_eq!(node(&amount).extension(), ExtensionTag::Amount);
        let time = json!({"type": "number", "x-bitcoin-format": "unix-time"});
        assert!(node(&time).is_unix_time());
        let forced = json!({"type": "string", "x-bitcoin-optional": true});
        assert!(node(&forced).forced_optional());
        assert_eq!(node(&forced).extension(), ExtensionTag::None);
    }

    #[test]
    fn items_and_open_maps() {
        assert!(matches!(node(&json!({"type": "array", "items": [{}, {}]})).items(), Items::Tuple));
        assert!(matches!(node(&json!({"type": "array", "prefixItems": []})).items(), Items::Tuple));
        assert!(matches!(node(&json!({"type": "array"})).items(), Items::Single(None)));
        assert!(matches!(node(&json!({"additionalProperties": true})).open_map(), OpenMap::Any));
        assert!(matches!(node(&json!({"additionalProperties": false})).open_map(), OpenMap::Closed));
        assert!(matches!(
            node(&json!({"additionalProperties": {"type": "string"}})).open_map(),
            OpenMap::Typed(_)
        ));
    }

    #[test]
    fn properties_keep_declaration_order() {
        let value = json!({"type": "object", "properties": {"zeta": {}, "alpha": {}, "mid": {}}});
        let names: Vec<&str> = node(&value).properties().unwrap().keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }
}
