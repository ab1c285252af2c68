use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mapping::{Direction, Override};

/// How a field relates to other schemas.
///
/// Only the shape matters to the mapper engine; value types and
/// constraints are someone else's business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Any value that is not a structure.
    #[default]
    Plain,
    /// Reference to a named schema.
    Reference(String),
    /// Anonymous schema declared in place.
    Inline(Box<Schema>),
    /// Array/set whose item kinds may reference schemas.
    Collection(Vec<FieldKind>),
}

/// A single field in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default)]
    pub kind: FieldKind,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind }
    }

    /// Shortcut: plain field.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Plain)
    }

    /// Shortcut: reference to schema `schema`.
    pub fn reference(name: impl Into<String>, schema: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Reference(schema.into()))
    }

    /// Shortcut: inline anonymous schema.
    pub fn inline(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, FieldKind::Inline(Box::new(schema)))
    }

    /// Shortcut: collection with the given item kinds.
    pub fn collection(name: impl Into<String>, items: Vec<FieldKind>) -> Self {
        Self::new(name, FieldKind::Collection(items))
    }
}

/// Schema ("structure") metadata.
///
/// Immutable once declared. `serialization` and `deserialization` hold the
/// schema's own override chains; chains of `extends` ancestors come first
/// when the engine resolves them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Empty for inline schemas.
    #[serde(default)]
    pub name: String,
    /// Name of the base schema, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub serialization: Vec<Override>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deserialization: Vec<Override>,
}

impl Schema {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            ..Self::default()
        }
    }

    pub fn extending(mut self, base: impl Into<String>) -> Self {
        self.extends = Some(base.into());
        self
    }

    pub fn with_serialization(mut self, chain: Vec<Override>) -> Self {
        self.serialization = chain;
        self
    }

    pub fn with_deserialization(mut self, chain: Vec<Override>) -> Self {
        self.deserialization = chain;
        self
    }

    /// The schema's own declared chain for `direction`.
    pub fn declared(&self, direction: Direction) -> &[Override] {
        match direction {
            Direction::Serialize => &self.serialization,
            Direction::Deserialize => &self.deserialization,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ════════════════════════════════════════════════════════════════
//  Lookup / registration seams
// ════════════════════════════════════════════════════════════════

/// Resolves schema references by name.
pub trait SchemaSource {
    fn schema(&self, name: &str) -> Option<Arc<Schema>>;
}

impl SchemaSource for HashMap<String, Arc<Schema>> {
    fn schema(&self, name: &str) -> Option<Arc<Schema>> {
        self.get(name).cloned()
    }
}

/// Receives schemas registered by [`Structure::register`].
pub trait SchemaSink {
    fn contains_schema(&self, name: &str) -> bool;
    fn insert_schema(&mut self, schema: Schema);
}

impl SchemaSink for HashMap<String, Arc<Schema>> {
    fn contains_schema(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn insert_schema(&mut self, schema: Schema) {
        self.insert(schema.name.clone(), Arc::new(schema));
    }
}

/// Rust type with schema metadata. Usually derived with
/// `#[derive(Structure)]`.
pub trait Structure {
    const NAME: &'static str;

    fn schema() -> Schema;

    /// Insert this schema and every schema it depends on into `sink`.
    ///
    /// Returns early when `sink` already has [`Self::NAME`], which also
    /// stops self-referencing types.
    fn register(sink: &mut dyn SchemaSink) {
        if sink.contains_schema(Self::NAME) {
            return;
        }
        sink.insert_schema(Self::schema());
    }
}
