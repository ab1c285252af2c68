use crate::config::CheckArgs;
use crate::error::CliError;

pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let registry = super::load_registry(&args.catalog.catalog)?;
    registry.validate()?;
    for name in registry.names() {
        tracing::info!(schema = %name, "ok");
    }
    println!("{} schemas ok", registry.len());
    Ok(())
}
