pub mod error;
pub mod mapping;
pub mod schema;

pub use mapwright_api_derive::Structure;

pub use error::{ErrorKind, MapperError};
pub use mapping::{
    submapper_key, CaseDirective, Direction, EffectiveMapper, FunctionCall, MapperEntry, Override,
    OverrideValue, SUBMAPPER_SUFFIX,
};
pub use schema::{Field, FieldKind, Schema, SchemaSink, SchemaSource, Structure};
