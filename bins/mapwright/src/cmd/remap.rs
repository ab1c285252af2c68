use std::io::Read;

use mapwright_api::Direction;
use mapwright_engine::{deserialize_value, serialize_value, TransformRegistry};
use serde_json::Value;

use crate::config::RemapArgs;
use crate::error::CliError;

pub fn run(args: RemapArgs) -> Result<(), CliError> {
    let output = remap(&args)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn remap(args: &RemapArgs) -> Result<Value, CliError> {
    let mapper = super::resolve::mapper(&args.resolve)?;
    let input = read_input(args)?;
    let transforms = TransformRegistry::builtin();

    let output = match Direction::from(args.resolve.direction) {
        Direction::Serialize => serialize_value(&mapper, &input, &transforms)?,
        Direction::Deserialize => deserialize_value(&mapper, &input, &transforms)?,
    };
    Ok(output)
}

fn read_input(args: &RemapArgs) -> Result<Value, CliError> {
    let path = &args.input;
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|source| CliError::Read { path: path.clone(), source })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.clone(), source })?
    };
    Ok(serde_json::from_str(&content)?)
}
