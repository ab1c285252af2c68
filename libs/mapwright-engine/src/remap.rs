//! Applies a resolved mapper to JSON documents.
//!
//! Serialization writes each field under its mapped key; deserialization
//! reads each field from its mapped key. Dotted keys address nested
//! objects in both directions.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use mapwright_api::error::MapperError;
use mapwright_api::mapping::{submapper_key, EffectiveMapper, FunctionCall, MapperEntry, SUBMAPPER_SUFFIX};
use serde_json::{Map, Value};

use crate::error::EngineError;

/// Named value transform, invoked for [`MapperEntry::Call`] entries.
pub trait Transform: Send + Sync {
    fn apply(&self, args: &[Value]) -> Result<Value, MapperError>;
}

impl<F> Transform for F
where
    F: Fn(&[Value]) -> Result<Value, MapperError> + Send + Sync,
{
    fn apply(&self, args: &[Value]) -> Result<Value, MapperError> {
        self(args)
    }
}

#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `identity`, `upper`, `lower` and `concat`.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("identity", |args: &[Value]| -> Result<Value, MapperError> {
            Ok(args.first().cloned().unwrap_or(Value::Null))
        });
        registry.register("upper", |args: &[Value]| map_str(args, "upper", str::to_uppercase));
        registry.register("lower", |args: &[Value]| map_str(args, "lower", str::to_lowercase));
        registry.register("concat", |args: &[Value]| -> Result<Value, MapperError> {
            let joined: String = args
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Ok(Value::String(joined))
        });
        registry
    }

    /// Add or replace a transform.
    pub fn register(&mut self, name: impl Into<String>, transform: impl Transform + 'static) {
        self.transforms.insert(name.into(), Arc::new(transform));
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Transform>, EngineError> {
        self.transforms
            .get(name)
            .ok_or_else(|| EngineError::TransformNotFound(name.to_string()))
    }

    fn call(&self, call: &FunctionCall, args: &[Value]) -> Result<Value, EngineError> {
        let transform = self.get(&call.func)?;
        transform
            .apply(args)
            .map_err(|e| EngineError::from(e.with_context(format!("transform '{}'", call.func))))
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.transforms.keys().collect();
        names.sort();
        f.debug_struct("TransformRegistry").field("transforms", &names).finish()
    }
}

fn map_str(args: &[Value], name: &str, f: fn(&str) -> String) -> Result<Value, MapperError> {
    match args {
        [Value::String(s)] => Ok(Value::String(f(s))),
        [Value::Null] => Ok(Value::Null),
        [other] => Err(MapperError::transform(format!("{name}: expected a string, got {other}"))),
        _ => Err(MapperError::transform(format!("{name}: expected 1 argument, got {}", args.len()))),
    }
}

// ════════════════════════════════════════════════════════════════
//  Serialization: field name → mapped key
// ════════════════════════════════════════════════════════════════

/// Remap an instance (keys are field names) into its serialized form.
///
/// Keys the mapper does not mention pass through unchanged.
pub fn serialize_value(mapper: &EffectiveMapper, value: &Value, transforms: &TransformRegistry) -> Result<Value, EngineError> {
    let input = as_object(value)?;
    let mut output = Map::new();

    for (key, entry) in mapper {
        match entry {
            MapperEntry::Rename(target) => {
                let Some(field_value) = input.get(key) else { continue };
                let field_value = match mapper.submapper(key) {
                    Some(nested) => remap_nested(nested, field_value, transforms, serialize_value)?,
                    None => field_value.clone(),
                };
                insert_path(&mut output, target, field_value)?;
            }
            MapperEntry::Call(call) => {
                let args: Vec<Value> = call_args(call, key)
                    .map(|arg| get_path(input, arg).cloned().unwrap_or(Value::Null))
                    .collect();
                let result = transforms.call(call, &args)?;
                insert_path(&mut output, key, result)?;
            }
            MapperEntry::SubMapper(_) => {}
        }
    }

    for (key, field_value) in input {
        if !mapper.contains_key(key) && !output.contains_key(key) {
            output.insert(key.clone(), field_value.clone());
        }
    }
    Ok(Value::Object(output))
}

// ════════════════════════════════════════════════════════════════
//  Deserialization: mapped key → field name
// ════════════════════════════════════════════════════════════════

/// Remap serialized data back into instance form (keys are field names).
///
/// Input keys consumed by a mapping are dropped; the rest pass through.
pub fn deserialize_value(mapper: &EffectiveMapper, value: &Value, transforms: &TransformRegistry) -> Result<Value, EngineError> {
    let input = as_object(value)?;
    let mut output = Map::new();
    let mut consumed: HashSet<&str> = HashSet::new();

    for (key, entry) in mapper {
        match entry {
            MapperEntry::Rename(source) => {
                consumed.insert(top_segment(source));
                let Some(field_value) = get_path(input, source) else { continue };
                let nested = mapper
                    .get(&submapper_key(source))
                    .and_then(MapperEntry::as_submapper)
                    .or_else(|| mapper.submapper(key));
                let field_value = match nested {
                    Some(nested) => remap_nested(nested, field_value, transforms, deserialize_value)?,
                    None => field_value.clone(),
                };
                output.insert(key.clone(), field_value);
            }
            MapperEntry::Call(call) => {
                let mut args = Vec::new();
                for arg in call_args(call, key) {
                    consumed.insert(top_segment(arg));
                    args.push(get_path(input, arg).cloned().unwrap_or(Value::Null));
                }
                output.insert(key.clone(), transforms.call(call, &args)?);
            }
            MapperEntry::SubMapper(_) => {}
        }
    }

    for (key, field_value) in input {
        if !consumed.contains(key.as_str()) && !output.contains_key(key) {
            output.insert(key.clone(), field_value.clone());
        }
    }
    Ok(Value::Object(output))
}

// ════════════════════════════════════════════════════════════════
//  Helpers
// ════════════════════════════════════════════════════════════════

type RemapFn = fn(&EffectiveMapper, &Value, &TransformRegistry) -> Result<Value, EngineError>;

/// Apply `nested` to an object, or to every object of an array. Other
/// values are returned as-is.
fn remap_nested(nested: &EffectiveMapper, value: &Value, transforms: &TransformRegistry, remap: RemapFn) -> Result<Value, EngineError> {
    match value {
        Value::Object(_) => remap(nested, value, transforms),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(_) => remap(nested, item, transforms),
                other => Ok(other.clone()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, EngineError> {
    value.as_object().ok_or_else(|| {
        EngineError::from(MapperError::schema(format!("expected a JSON object, got {}", type_name(value))))
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Arguments of `call`; an empty list means the field itself.
fn call_args<'a>(call: &'a FunctionCall, key: &'a str) -> impl Iterator<Item = &'a str> {
    let own: &[String] = &call.args;
    let fallback = own.is_empty().then_some(key);
    own.iter().map(String::as_str).chain(fallback)
}

fn top_segment(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Look up `path` as a literal key first, then as a dotted path.
fn get_path<'a>(object: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = object.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = object.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Insert at a dotted path, creating intermediate objects.
fn insert_path(object: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), EngineError> {
    if path.ends_with(SUBMAPPER_SUFFIX) {
        return Err(MapperError::config(format!("'{path}' is not a valid output key")).into());
    }
    let mut segments: Vec<&str> = path.split('.').collect();
    let last = segments.pop().unwrap_or(path);
    let mut current = object;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = slot.as_object_mut().ok_or_else(|| {
            EngineError::from(MapperError::schema(format!(
                "cannot write '{path}': '{segment}' already holds a non-object value"
            )))
        })?;
    }
    current.insert(last.to_string(), value);
    Ok(())
}
