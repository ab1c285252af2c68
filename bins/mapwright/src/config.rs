use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mapwright_api::Direction;

#[derive(Parser)]
#[command(name = "mapwright", about = "Resolve and apply schema key mappers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective mapper of a schema
    Resolve(ResolveArgs),
    /// Remap a JSON document with a schema's mapper
    Remap(RemapArgs),
    /// Validate a catalog and resolve every schema
    Check(CheckArgs),
}

#[derive(Args, Clone, Debug)]
pub struct CatalogArgs {
    /// Schema catalog (.toml, .json or .hcl)
    #[arg(long, default_value = "catalog.toml", env = "MAPWRIGHT_CATALOG")]
    pub catalog: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Schema name
    #[arg(long)]
    pub schema: String,

    #[arg(long, value_enum, default_value_t = DirectionArg::Serialize)]
    pub direction: DirectionArg,

    /// Fold a trailing camelCase conversion
    #[arg(long)]
    pub camel_case: bool,
}

#[derive(Args, Clone, Debug)]
pub struct RemapArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,

    /// JSON document to remap; `-` reads stdin
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionArg {
    Serialize,
    Deserialize,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Serialize => Direction::Serialize,
            DirectionArg::Deserialize => Direction::Deserialize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_remap_flags() {
        let cli = Cli::try_parse_from([
            "mapwright",
            "remap",
            "--catalog",
            "c.hcl",
            "--schema",
            "Person",
            "--direction",
            "deserialize",
            "--camel-case",
            "--input",
            "-",
        ])
        .unwrap();
        let Commands::Remap(args) = cli.command else { panic!("expected remap") };
        assert_eq!(args.resolve.catalog.catalog, PathBuf::from("c.hcl"));
        assert_eq!(Direction::from(args.resolve.direction), Direction::Deserialize);
        assert!(args.resolve.camel_case);
        assert_eq!(args.input, PathBuf::from("-"));
    }

    #[test]
    fn direction_defaults_to_serialize() {
        let cli = Cli::try_parse_from(["mapwright", "resolve", "--catalog", "c.toml", "--schema", "P"]).unwrap();
        let Commands::Resolve(args) = cli.command else { panic!("expected resolve") };
        assert_eq!(args.direction, DirectionArg::Serialize);
        assert!(!args.camel_case);
    }
}
