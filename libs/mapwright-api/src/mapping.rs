use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MapperError;

/// Suffix of keys that hold a nested mapper: `"<field>._mapper"`.
pub const SUBMAPPER_SUFFIX: &str = "._mapper";

/// Key under which the submapper of `field` is stored.
pub fn submapper_key(field: &str) -> String {
    format!("{field}{SUBMAPPER_SUFFIX}")
}

// ════════════════════════════════════════════════════════════════
//  Direction
// ════════════════════════════════════════════════════════════════

/// Which way a mapper is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Instance → plain data. Keys are final attribute names.
    Serialize,
    /// Plain data → instance. Keys are remapped source keys.
    Deserialize,
}

impl Direction {
    pub fn is_serialize(self) -> bool {
        self == Direction::Serialize
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Serialize => f.write_str("serialize"),
            Direction::Deserialize => f.write_str("deserialize"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Case directives
// ════════════════════════════════════════════════════════════════

/// Built-in override usable wherever a mapping override is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaseDirective {
    /// `last_name` → `lastName`.
    ToCamelCase,
    /// Named "to lowercase" in catalogs, but upper-cases every key.
    /// Existing catalogs depend on this, so it stays as is.
    ToLowercase,
}

impl CaseDirective {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseDirective::ToCamelCase => "to_camel_case",
            CaseDirective::ToLowercase => "to_lowercase",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "to_camel_case" => Some(CaseDirective::ToCamelCase),
            "to_lowercase" => Some(CaseDirective::ToLowercase),
            _ => None,
        }
    }
}

impl fmt::Display for CaseDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════
//  Function calls
// ════════════════════════════════════════════════════════════════

/// Deferred transform: `func` is looked up by name by whoever consumes
/// the mapper, `args` are source keys (possibly dotted paths).
///
/// Empty `args` means "the field's own resolved key".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionCall {
    #[serde(rename = "call")]
    pub func: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl FunctionCall {
    pub fn new(func: impl Into<String>) -> Self {
        Self { func: func.into(), args: Vec::new() }
    }

    pub fn with_args<I, S>(func: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            func: func.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Effective mapper
// ════════════════════════════════════════════════════════════════

/// One resolved entry of an [`EffectiveMapper`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapperEntry {
    /// Target key.
    Rename(String),
    /// Transform with resolved argument keys. Read back only when `args`
    /// is present, so a submapper of a structure whose sole field is
    /// `call` stays a submapper.
    #[serde(deserialize_with = "resolved_call")]
    Call(FunctionCall),
    /// Mapper of a nested structure, stored under `"<field>._mapper"`.
    SubMapper(EffectiveMapper),
}

impl MapperEntry {
    pub fn rename(key: impl Into<String>) -> Self {
        MapperEntry::Rename(key.into())
    }

    pub fn as_rename(&self) -> Option<&str> {
        match self {
            MapperEntry::Rename(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_submapper(&self) -> Option<&EffectiveMapper> {
        match self {
            MapperEntry::SubMapper(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&FunctionCall> {
        match self {
            MapperEntry::Call(c) => Some(c),
            _ => None,
        }
    }
}

impl From<&str> for MapperEntry {
    fn from(s: &str) -> Self {
        MapperEntry::Rename(s.to_string())
    }
}

impl From<String> for MapperEntry {
    fn from(s: String) -> Self {
        MapperEntry::Rename(s)
    }
}

impl From<FunctionCall> for MapperEntry {
    fn from(c: FunctionCall) -> Self {
        MapperEntry::Call(c)
    }
}

impl From<EffectiveMapper> for MapperEntry {
    fn from(m: EffectiveMapper) -> Self {
        MapperEntry::SubMapper(m)
    }
}

/// Fully resolved mapper for one schema and one direction.
///
/// Keyed by field name (rename or call) or by `"<field>._mapper"`
/// (nested mapper).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectiveMapper {
    entries: BTreeMap<String, MapperEntry>,
}

impl EffectiveMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: impl Into<MapperEntry>) -> Option<MapperEntry> {
        self.entries.insert(key.into(), entry.into())
    }

    pub fn get(&self, key: &str) -> Option<&MapperEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Submapper of `field`, if any.
    pub fn submapper(&self, field: &str) -> Option<&EffectiveMapper> {
        self.entries.get(&submapper_key(field)).and_then(MapperEntry::as_submapper)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MapperEntry)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<MapperEntry>> FromIterator<(K, V)> for EffectiveMapper {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for EffectiveMapper {
    type Item = (String, MapperEntry);
    type IntoIter = std::collections::btree_map::IntoIter<String, MapperEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a EffectiveMapper {
    type Item = (&'a String, &'a MapperEntry);
    type IntoIter = std::collections::btree_map::Iter<'a, String, MapperEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Resolved calls always carry `args`; declared ones may omit it.
fn resolved_call<'de, D>(deserializer: D) -> Result<FunctionCall, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Resolved {
        call: String,
        args: Vec<String>,
    }

    let Resolved { call, args } = Resolved::deserialize(deserializer)?;
    Ok(FunctionCall { func: call, args })
}

// ════════════════════════════════════════════════════════════════
//  Overrides
// ════════════════════════════════════════════════════════════════

/// User-declared override, folded onto an accumulated mapper.
///
/// Parsed from plain data: an object is a mapping, a string names a
/// [`CaseDirective`]. Anything else is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Override {
    Case(CaseDirective),
    Mapping(BTreeMap<String, OverrideValue>),
}

/// Value of one key in a mapping override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideValue {
    Rename(String),
    Call(FunctionCall),
    /// Only meaningful under a `"<field>._mapper"` key.
    Nested(Override),
}

impl Override {
    /// Build a mapping override from `(key, value)` pairs.
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OverrideValue>,
    {
        Override::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Value stored at `key`. Directives hold no keys.
    pub fn get(&self, key: &str) -> Option<&OverrideValue> {
        match self {
            Override::Mapping(map) => map.get(key),
            Override::Case(_) => None,
        }
    }

    pub fn as_directive(&self) -> Option<CaseDirective> {
        match self {
            Override::Case(d) => Some(*d),
            Override::Mapping(_) => None,
        }
    }
}

impl From<CaseDirective> for Override {
    fn from(d: CaseDirective) -> Self {
        Override::Case(d)
    }
}

impl From<&str> for OverrideValue {
    fn from(s: &str) -> Self {
        OverrideValue::Rename(s.to_string())
    }
}

impl From<String> for OverrideValue {
    fn from(s: String) -> Self {
        OverrideValue::Rename(s)
    }
}

impl From<FunctionCall> for OverrideValue {
    fn from(c: FunctionCall) -> Self {
        OverrideValue::Call(c)
    }
}

impl From<Override> for OverrideValue {
    fn from(o: Override) -> Self {
        OverrideValue::Nested(o)
    }
}

impl From<CaseDirective> for OverrideValue {
    fn from(d: CaseDirective) -> Self {
        OverrideValue::Nested(Override::Case(d))
    }
}

impl TryFrom<serde_json::Value> for Override {
    type Error = MapperError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(name) => CaseDirective::from_name(&name)
                .map(Override::Case)
                .ok_or_else(|| {
                    MapperError::config(format!("Mapper must be a mapping (unknown directive '{name}')"))
                }),
            serde_json::Value::Object(map) => {
                let mut entries = BTreeMap::new();
                for (key, value) in map {
                    let parsed = OverrideValue::from_json(&key, value)?;
                    entries.insert(key, parsed);
                }
                Ok(Override::Mapping(entries))
            }
            other => Err(MapperError::config(format!(
                "Mapper must be a mapping, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl OverrideValue {
    fn from_json(key: &str, value: serde_json::Value) -> Result<Self, MapperError> {
        if key.ends_with(SUBMAPPER_SUFFIX) {
            return Override::try_from(value)
                .map(OverrideValue::Nested)
                .map_err(|e| e.with_context(format!("key '{key}'")));
        }
        match value {
            serde_json::Value::String(s) => Ok(OverrideValue::Rename(s)),
            serde_json::Value::Object(ref obj) if obj.contains_key("call") => {
                let call: FunctionCall = serde_json::from_value(value)
                    .map_err(|e| MapperError::from(e).with_context(format!("key '{key}'")))?;
                Ok(OverrideValue::Call(call))
            }
            serde_json::Value::Object(_) => Override::try_from(value).map(OverrideValue::Nested),
            other => Err(MapperError::config(format!(
                "key '{key}': expected a target key, a function call or a nested mapper, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

impl From<Override> for serde_json::Value {
    fn from(o: Override) -> Self {
        match o {
            Override::Case(d) => serde_json::Value::String(d.as_str().to_string()),
            Override::Mapping(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, serde_json::Value::from(v))).collect(),
            ),
        }
    }
}

impl From<OverrideValue> for serde_json::Value {
    fn from(v: OverrideValue) -> Self {
        match v {
            OverrideValue::Rename(s) => serde_json::Value::String(s),
            OverrideValue::Call(c) => serde_json::json!({ "call": c.func, "args": c.args }),
            OverrideValue::Nested(o) => o.into(),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
