use std::collections::HashMap;
use std::sync::Arc;

use mapwright_api::mapping::{Direction, EffectiveMapper, Override};
use mapwright_api::schema::{FieldKind, Schema, SchemaSink, SchemaSource, Structure};

use crate::config::CatalogConfig;
use crate::error::EngineError;
use crate::mapper;

/// Named schemas available to the mapper engine.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a catalog. Does not check references; call
    /// [`validate`](Self::validate) for that.
    pub fn from_catalog(catalog: CatalogConfig) -> Result<Self, EngineError> {
        let mut registry = Self::new();
        for schema in catalog.schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Add a schema. Names must be unique and non-empty.
    pub fn register(&mut self, schema: Schema) -> Result<(), EngineError> {
        if schema.name.is_empty() {
            return Err(EngineError::Config("schema without a name".into()));
        }
        if self.schemas.contains_key(&schema.name) {
            return Err(EngineError::DuplicateSchema(schema.name));
        }
        tracing::debug!(schema = %schema.name, fields = schema.fields.len(), "schema registered");
        self.schemas.insert(schema.name.clone(), Arc::new(schema));
        Ok(())
    }

    /// Add a derived schema and everything it references. Schemas already
    /// present are left alone.
    pub fn register_structure<T: Structure>(&mut self) {
        T::register(self);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check every `extends` target and schema reference, then resolve
    /// each schema in both directions. Returns all problems found, one
    /// per line, sorted by schema name.
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut problems = Vec::new();
        for name in self.names() {
            let Some(schema) = self.schemas.get(name) else { continue };
            let dangling = self.dangling_references(schema);
            for target in &dangling {
                problems.push(format!("{name}: unknown schema '{target}'"));
            }
            if !dangling.is_empty() {
                continue;
            }
            for direction in [Direction::Serialize, Direction::Deserialize] {
                if let Err(e) = self.mapper(name, direction, false) {
                    problems.push(format!("{name} ({direction}): {e}"));
                }
            }
        }

        if problems.is_empty() {
            tracing::debug!(schemas = self.len(), "catalog validated");
            Ok(())
        } else {
            Err(EngineError::Config(problems.join("\n")))
        }
    }

    fn dangling_references(&self, schema: &Schema) -> Vec<String> {
        let mut missing = Vec::new();
        if let Some(base) = &schema.extends {
            if !self.schemas.contains_key(base) {
                missing.push(base.clone());
            }
        }
        for field in &schema.fields {
            self.collect_dangling(&field.kind, &mut missing);
        }
        missing
    }

    fn collect_dangling(&self, kind: &FieldKind, missing: &mut Vec<String>) {
        match kind {
            FieldKind::Plain => {}
            FieldKind::Reference(name) => {
                if !self.schemas.contains_key(name) && !missing.contains(name) {
                    missing.push(name.clone());
                }
            }
            FieldKind::Inline(schema) => missing.extend(self.dangling_references(schema)),
            FieldKind::Collection(items) => {
                for item in items {
                    self.collect_dangling(item, missing);
                }
            }
        }
    }

    /// Effective mapper of `name` with its declared chain.
    pub fn mapper(&self, name: &str, direction: Direction, camel_case: bool) -> Result<EffectiveMapper, EngineError> {
        self.mapper_with(name, None, direction, camel_case)
    }

    /// Effective mapper of `name`, replacing its declared chain with
    /// `overrides` when given.
    pub fn mapper_with(
        &self,
        name: &str,
        overrides: Option<&[Override]>,
        direction: Direction,
        camel_case: bool,
    ) -> Result<EffectiveMapper, EngineError> {
        let schema = self
            .schemas
            .get(name)
            .ok_or_else(|| EngineError::SchemaNotFound(name.to_string()))?;
        mapper::aggregate_mapper(self, schema, overrides, camel_case, direction)
    }

    pub fn serialization_mapper(&self, name: &str, camel_case: bool) -> Result<EffectiveMapper, EngineError> {
        self.mapper(name, Direction::Serialize, camel_case)
    }

    pub fn deserialization_mapper(&self, name: &str, camel_case: bool) -> Result<EffectiveMapper, EngineError> {
        self.mapper(name, Direction::Deserialize, camel_case)
    }
}

impl SchemaSource for SchemaRegistry {
    fn schema(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }
}

impl SchemaSink for SchemaRegistry {
    fn contains_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    fn insert_schema(&mut self, schema: Schema) {
        self.schemas.insert(schema.name.clone(), Arc::new(schema));
    }
}
