use mapwright_api::mapping::{submapper_key, Direction, EffectiveMapper, MapperEntry};
use mapwright_api::schema::{FieldKind, Schema};

use super::{effective_fields, Resolver};
use crate::error::EngineError;

impl Resolver<'_> {
    /// Identity entry per field. Schema-typed fields also get a
    /// `"<field>._mapper"` entry holding the referenced schema's own
    /// aggregated mapper for the same direction.
    pub(super) fn base_mapper(&mut self, schema: &Schema, direction: Direction) -> Result<EffectiveMapper, EngineError> {
        let mut mapper = EffectiveMapper::new();
        for field in effective_fields(self.source, schema)? {
            mapper.insert(field.name.clone(), MapperEntry::rename(field.name.as_str()));

            let nested = match &field.kind {
                FieldKind::Plain => None,
                FieldKind::Reference(_) | FieldKind::Inline(_) => Some(self.item_mapper(&field.kind, direction)?),
                FieldKind::Collection(items) => {
                    let merged = self.collection_mapper(&field.name, items, direction)?;
                    (!merged.is_empty()).then_some(merged)
                }
            };
            if let Some(nested) = nested {
                mapper.insert(submapper_key(&field.name), nested);
            }
        }
        Ok(mapper)
    }

    /// Union of the item mappers of a collection field. Plain items
    /// contribute nothing; on a key collision the later item wins.
    fn collection_mapper(
        &mut self,
        field: &str,
        items: &[FieldKind],
        direction: Direction,
    ) -> Result<EffectiveMapper, EngineError> {
        let mut merged = EffectiveMapper::new();
        for item in items {
            if matches!(item, FieldKind::Plain | FieldKind::Collection(_)) {
                continue;
            }
            for (key, entry) in self.item_mapper(item, direction)? {
                if merged.contains_key(&key) {
                    tracing::debug!(%field, %key, "collection item mapper overrides earlier item");
                }
                merged.insert(key, entry);
            }
        }
        Ok(merged)
    }

    fn item_mapper(&mut self, kind: &FieldKind, direction: Direction) -> Result<EffectiveMapper, EngineError> {
        match kind {
            FieldKind::Reference(name) => self.aggregate_named(name, direction),
            FieldKind::Inline(schema) => self.aggregate_nested(schema, direction),
            FieldKind::Plain | FieldKind::Collection(_) => Ok(EffectiveMapper::new()),
        }
    }
}
