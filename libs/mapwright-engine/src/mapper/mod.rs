//! Mapper aggregation engine.
//!
//! `schema` → [`build_base_mapper`] (recurses into referenced schemas via
//! [`aggregate_mapper`]) → [`aggregate()`] folds each override in order →
//! resolved [`EffectiveMapper`].
//!
//! Everything here is pure: mappers are recomputed on every call and no
//! state outlives it.

mod aggregate;
mod base;
mod case;
mod deep_key;

use std::sync::Arc;

use mapwright_api::mapping::{CaseDirective, Direction, EffectiveMapper, Override};
use mapwright_api::schema::{Field, Schema, SchemaSource};

use crate::error::EngineError;

pub use aggregate::aggregate;
pub use case::{apply_directive, to_camel_case};
pub use deep_key::{deep_get, resolve_key};

/// Identity mapper for `schema`, with referenced schemas pre-resolved to
/// their own fully aggregated mappers.
pub fn build_base_mapper(
    source: &dyn SchemaSource,
    schema: &Schema,
    direction: Direction,
) -> Result<EffectiveMapper, EngineError> {
    let mut resolver = Resolver::new(source);
    resolver.enter(schema)?;
    let mapper = resolver.base_mapper(schema, direction)?;
    resolver.leave(schema);
    Ok(mapper)
}

/// Resolve the effective mapper of `schema` for `direction`.
///
/// `overrides` replaces the schema's declared chain when given and
/// non-empty; an empty slice falls back to the declared chain.
/// `camel_case` folds a trailing [`CaseDirective::ToCamelCase`].
pub fn aggregate_mapper(
    source: &dyn SchemaSource,
    schema: &Schema,
    overrides: Option<&[Override]>,
    camel_case: bool,
    direction: Direction,
) -> Result<EffectiveMapper, EngineError> {
    let mut resolver = Resolver::new(source);
    resolver.enter(schema)?;
    let mapper = resolver.aggregate_schema(schema, overrides, camel_case, direction)?;
    resolver.leave(schema);
    Ok(mapper)
}

pub fn aggregate_serialization_mapper(
    source: &dyn SchemaSource,
    schema: &Schema,
    overrides: Option<&[Override]>,
    camel_case: bool,
) -> Result<EffectiveMapper, EngineError> {
    aggregate_mapper(source, schema, overrides, camel_case, Direction::Serialize)
}

pub fn aggregate_deserialization_mapper(
    source: &dyn SchemaSource,
    schema: &Schema,
    overrides: Option<&[Override]>,
    camel_case: bool,
) -> Result<EffectiveMapper, EngineError> {
    aggregate_mapper(source, schema, overrides, camel_case, Direction::Deserialize)
}

/// Fields of `schema` with inheritance applied: base fields first, a
/// redeclared name replaces the base field in place.
pub fn effective_fields(source: &dyn SchemaSource, schema: &Schema) -> Result<Vec<Field>, EngineError> {
    let mut fields: Vec<Field> = Vec::new();
    for ancestor in lineage(source, schema)? {
        for field in &ancestor.fields {
            match fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field.clone(),
                None => fields.push(field.clone()),
            }
        }
    }
    Ok(fields)
}

/// Declared override chain of `schema` for `direction`, base chains first.
pub fn declared_chain(
    source: &dyn SchemaSource,
    schema: &Schema,
    direction: Direction,
) -> Result<Vec<Override>, EngineError> {
    let mut chain = Vec::new();
    for ancestor in lineage(source, schema)? {
        chain.extend(ancestor.declared(direction).iter().cloned());
    }
    Ok(chain)
}

/// `schema` and its `extends` ancestors, root first.
fn lineage(source: &dyn SchemaSource, schema: &Schema) -> Result<Vec<Arc<Schema>>, EngineError> {
    let mut chain = vec![Arc::new(schema.clone())];
    let mut names = vec![schema.name.clone()];
    let mut next = schema.extends.clone();
    while let Some(base_name) = next {
        if names.contains(&base_name) {
            names.push(base_name);
            return Err(EngineError::CyclicSchema(names));
        }
        let base = source
            .schema(&base_name)
            .ok_or_else(|| EngineError::SchemaNotFound(base_name.clone()))
            .map_err(|e| e.with_context(format!("base of '{}'", schema.name)))?;
        names.push(base_name);
        next = base.extends.clone();
        chain.push(base);
    }
    chain.reverse();
    Ok(chain)
}

/// Recursion state for one aggregation call: the named schemas currently
/// being resolved, outermost first.
pub(crate) struct Resolver<'a> {
    source: &'a dyn SchemaSource,
    stack: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(source: &'a dyn SchemaSource) -> Self {
        Self { source, stack: Vec::new() }
    }

    /// Push a named schema, failing if it is already being resolved.
    /// Anonymous (inline) schemas are owned by their parent and cannot
    /// recurse on their own, so they are not tracked.
    fn enter(&mut self, schema: &Schema) -> Result<(), EngineError> {
        if schema.name.is_empty() {
            return Ok(());
        }
        if self.stack.contains(&schema.name) {
            let mut path = self.stack.clone();
            path.push(schema.name.clone());
            return Err(EngineError::CyclicSchema(path));
        }
        self.stack.push(schema.name.clone());
        Ok(())
    }

    fn leave(&mut self, schema: &Schema) {
        if !schema.name.is_empty() {
            self.stack.pop();
        }
    }

    /// Resolve the schema named `name` with its own declared chain.
    fn aggregate_named(&mut self, name: &str, direction: Direction) -> Result<EffectiveMapper, EngineError> {
        let schema = self
            .source
            .schema(name)
            .ok_or_else(|| EngineError::SchemaNotFound(name.to_string()))?;
        self.aggregate_nested(&schema, direction)
    }

    fn aggregate_nested(&mut self, schema: &Schema, direction: Direction) -> Result<EffectiveMapper, EngineError> {
        self.enter(schema)?;
        let result = self.aggregate_schema(schema, None, false, direction);
        self.leave(schema);
        result
    }

    fn aggregate_schema(
        &mut self,
        schema: &Schema,
        overrides: Option<&[Override]>,
        camel_case: bool,
        direction: Direction,
    ) -> Result<EffectiveMapper, EngineError> {
        let mut mapper = self.base_mapper(schema, direction)?;

        let declared;
        let chain = match overrides {
            Some(chain) if !chain.is_empty() => chain,
            _ => {
                declared = declared_chain(self.source, schema, direction)?;
                declared.as_slice()
            }
        };

        for (index, layer) in chain.iter().enumerate() {
            tracing::debug!(schema = %schema.name, %direction, layer = index, "folding override");
            mapper = aggregate(layer, &mapper, direction)
                .map_err(|e| e.with_context(format!("schema '{}', override #{index}", schema.name)))?;
        }
        if camel_case {
            mapper = aggregate(&Override::Case(CaseDirective::ToCamelCase), &mapper, direction)
                .map_err(|e| e.with_context(format!("schema '{}', camel case", schema.name)))?;
        }
        Ok(mapper)
    }
}
