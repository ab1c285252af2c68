pub mod check;
pub mod remap;
pub mod resolve;

use std::path::Path;

use mapwright_config_hcl::HclParser;
use mapwright_engine::{CatalogConfig, ConfigParser, JsonParser, SchemaRegistry, TomlParser};

use crate::error::CliError;

/// Load a catalog in any supported format and register its schemas.
pub fn load_registry(path: &Path) -> Result<SchemaRegistry, CliError> {
    let parsers: [&dyn ConfigParser; 3] = [&TomlParser, &JsonParser, &HclParser];
    let catalog = CatalogConfig::load(path, &parsers)?;
    let registry = SchemaRegistry::from_catalog(catalog)?;
    tracing::info!(catalog = %path.display(), schemas = registry.len(), "loaded catalog");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use crate::config::{CatalogArgs, CheckArgs, DirectionArg, RemapArgs, ResolveArgs};

    const CATALOG: &str = r#"
[[schemas]]
name = "Address"
fields = [{ name = "zip_code" }]

[[schemas]]
name = "Person"
fields = [
    { name = "first_name" },
    { name = "home", kind = { reference = "Address" } },
]
deserialization = [{ first_name = "name" }]
"#;

    fn resolve_args(catalog: PathBuf, direction: DirectionArg) -> ResolveArgs {
        ResolveArgs {
            catalog: CatalogArgs { catalog },
            schema: "Person".into(),
            direction,
            camel_case: true,
        }
    }

    #[test]
    fn resolve_and_remap_from_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.toml");
        std::fs::write(&catalog, CATALOG).unwrap();

        let mapper = super::resolve::mapper(&resolve_args(catalog.clone(), DirectionArg::Serialize)).unwrap();
        assert_eq!(
            serde_json::to_value(&mapper).unwrap(),
            json!({
                "first_name": "firstName",
                "home": "home",
                "home._mapper": {"zip_code": "zipCode"},
            })
        );

        let input = dir.path().join("input.json");
        std::fs::write(&input, r#"{"name": "Ann", "home": {"zipCode": "01"}}"#).unwrap();
        let args = RemapArgs {
            resolve: resolve_args(catalog.clone(), DirectionArg::Deserialize),
            input,
        };
        let out = super::remap::remap(&args).unwrap();
        assert_eq!(out, json!({"first_name": "Ann", "home": {"zip_code": "01"}}));

        super::check::run(CheckArgs { catalog: CatalogArgs { catalog } }).unwrap();
    }

    #[test]
    fn unknown_schema_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("catalog.toml");
        std::fs::write(&catalog, CATALOG).unwrap();
        let mut args = resolve_args(catalog, DirectionArg::Serialize);
        args.schema = "Nobody".into();
        let err = super::resolve::mapper(&args).unwrap_err();
        assert_eq!(err.to_string(), "schema not found: Nobody");
    }
}
