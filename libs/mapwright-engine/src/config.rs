use std::path::Path;

use mapwright_api::schema::Schema;
use serde::Deserialize;

use crate::error::EngineError;

/// Schema catalog, parsed from TOML, JSON or any registered format.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogConfig {
    /// Schema definitions, in declaration order.
    #[serde(default)]
    pub schemas: Vec<Schema>,
}

/// Catalog file format.
pub trait ConfigParser {
    /// File extensions handled, without the dot.
    fn extensions(&self) -> &[&str];

    fn parse(&self, content: &str) -> Result<CatalogConfig, EngineError>;
}

pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> Result<CatalogConfig, EngineError> {
        toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }
}

pub struct JsonParser;

impl ConfigParser for JsonParser {
    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse(&self, content: &str) -> Result<CatalogConfig, EngineError> {
        serde_json::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }
}

impl CatalogConfig {
    /// Load a catalog, picking the parser by file extension.
    pub fn load(path: impl AsRef<Path>, parsers: &[&dyn ConfigParser]) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let shown = path.display();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let parser = parsers
            .iter()
            .find(|p| p.extensions().contains(&ext.as_str()))
            .ok_or_else(|| EngineError::Config(format!("{shown}: unsupported catalog format '{ext}'")))?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Io(std::io::Error::new(e.kind(), format!("{shown}: {e}"))))?;
        let catalog = parser.parse(&content).map_err(|e| e.with_context(&shown))?;
        tracing::debug!(path = %shown, schemas = catalog.schemas.len(), "catalog loaded");
        Ok(catalog)
    }

    /// Parse a catalog from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        TomlParser.parse(toml_str)
    }
}
