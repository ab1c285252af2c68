use mapwright_engine::config::{CatalogConfig, ConfigParser};
use mapwright_engine::error::EngineError;

/// Catalog loader for `.hcl` files.
pub struct HclParser;

impl ConfigParser for HclParser {
    fn extensions(&self) -> &[&str] {
        &["hcl"]
    }

    fn parse(&self, content: &str) -> Result<CatalogConfig, EngineError> {
        hcl::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapwright_api::mapping::{CaseDirective, Override};
    use mapwright_api::schema::Field;
    use mapwright_engine::{SchemaRegistry, TomlParser};

    const CATALOG: &str = r#"
schemas = [
  {
    name   = "Address"
    fields = [{ name = "zip" }]
  },
  {
    name   = "Person"
    fields = [
      { name = "first_name" },
      { name = "address", kind = { reference = "Address" } },
    ]
    deserialization = [
      "to_lowercase",
      { "ADDRESS._mapper" = { ZIP = "postal" } },
    ]
  },
]
"#;

    #[test]
    fn parses_catalog() {
        let catalog = HclParser.parse(CATALOG).unwrap();
        assert_eq!(catalog.schemas.len(), 2);
        let person = &catalog.schemas[1];
        assert_eq!(person.fields[1], Field::reference("address", "Address"));
        assert_eq!(person.deserialization[0], Override::Case(CaseDirective::ToLowercase));
    }

    #[test]
    fn resolves_mapper_from_hcl_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.hcl");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = CatalogConfig::load(&path, &[&TomlParser, &HclParser]).unwrap();
        let registry = SchemaRegistry::from_catalog(catalog).unwrap();
        registry.validate().unwrap();

        let mapper = registry.deserialization_mapper("Person", false).unwrap();
        let nested = mapper.submapper("ADDRESS").unwrap();
        assert_eq!(nested.get("zip").and_then(|e| e.as_rename()), Some("postal"));
    }

    #[test]
    fn malformed_override_is_config_error() {
        let err = HclParser
            .parse(r#"schemas = [{ name = "X", serialization = [true] }]"#)
            .unwrap_err();
        assert!(err.is_config(), "{err}");
    }
}
