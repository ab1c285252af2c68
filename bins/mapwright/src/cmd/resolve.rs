use mapwright_api::EffectiveMapper;

use crate::config::ResolveArgs;
use crate::error::CliError;

pub fn run(args: ResolveArgs) -> Result<(), CliError> {
    let mapper = mapper(&args)?;
    println!("{}", serde_json::to_string_pretty(&mapper)?);
    Ok(())
}

/// Effective mapper selected by `args`.
pub fn mapper(args: &ResolveArgs) -> Result<EffectiveMapper, CliError> {
    let registry = super::load_registry(&args.catalog.catalog)?;
    let direction = args.direction.into();
    let mapper = registry.mapper(&args.schema, direction, args.camel_case)?;
    tracing::info!(schema = %args.schema, %direction, keys = mapper.len(), "resolved mapper");
    Ok(mapper)
}
