pub mod config;
pub mod error;
pub mod mapper;
pub mod registry;
pub mod remap;

pub use config::{CatalogConfig, ConfigParser, JsonParser, TomlParser};
pub use error::EngineError;
pub use mapper::{
    aggregate, aggregate_deserialization_mapper, aggregate_mapper, aggregate_serialization_mapper,
    build_base_mapper, deep_get,
};
pub use registry::SchemaRegistry;
pub use remap::{deserialize_value, serialize_value, Transform, TransformRegistry};
