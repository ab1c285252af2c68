use mapwright_api::error::MapperError;
use mapwright_api::mapping::{
    submapper_key, Direction, EffectiveMapper, FunctionCall, MapperEntry, Override, OverrideValue,
    SUBMAPPER_SUFFIX,
};

use super::case::apply_directive;
use super::deep_key::resolve_key;

/// Fold `latest` onto `previous`, producing the next accumulated mapper.
///
/// The result has exactly as many keys as `previous`. Only values change,
/// plus the `"<field>._mapper"` keys of renamed fields when deserializing.
pub fn aggregate(
    latest: &Override,
    previous: &EffectiveMapper,
    direction: Direction,
) -> Result<EffectiveMapper, MapperError> {
    let mut result = EffectiveMapper::new();
    for (key, entry) in previous {
        match entry {
            MapperEntry::Rename(value) => {
                let resolved = apply_override(latest, key, value, previous, direction)?;
                result.insert(key.clone(), resolved);
            }
            MapperEntry::SubMapper(nested) => {
                let (mapped_key, value) = aggregate_submapper(latest, key, nested, previous, direction)?;
                result.insert(mapped_key, value);
            }
            MapperEntry::Call(call) => {
                let value = aggregate_call(latest, key, call, previous, direction)?;
                result.insert(key.clone(), value);
            }
        }
    }
    Ok(result)
}

/// Resolve `value` (the current target of `key`) through `latest`.
fn apply_override(
    latest: &Override,
    key: &str,
    value: &str,
    previous: &EffectiveMapper,
    direction: Direction,
) -> Result<MapperEntry, MapperError> {
    let map = match latest {
        Override::Case(directive) => {
            return Ok(MapperEntry::Rename(apply_directive(*directive, value)));
        }
        Override::Mapping(map) => map,
    };

    match map.get(value) {
        None => Ok(MapperEntry::rename(value)),
        Some(OverrideValue::Rename(target)) => Ok(MapperEntry::rename(target.as_str())),
        Some(OverrideValue::Call(call)) => {
            let current = previous.get(key).and_then(MapperEntry::as_rename);
            if direction.is_serialize() && current != Some(key) {
                return Err(MapperError::unsupported(format!(
                    "'{key}': combining a function call with other mappings in a serialization mapper is unsupported"
                )));
            }
            let args = if call.args.is_empty() {
                vec![current.unwrap_or(key).to_string()]
            } else {
                call.args.iter().map(|arg| resolve_key(previous, arg)).collect()
            };
            Ok(MapperEntry::Call(FunctionCall {
                func: call.func.clone(),
                args,
            }))
        }
        Some(OverrideValue::Nested(_)) => Err(MapperError::config(format!(
            "invalid mapper at '{value}': to map nested values, use the format <key>{SUBMAPPER_SUFFIX}: {{...}}"
        ))),
    }
}

fn aggregate_submapper(
    latest: &Override,
    key: &str,
    nested: &EffectiveMapper,
    previous: &EffectiveMapper,
    direction: Direction,
) -> Result<(String, MapperEntry), MapperError> {
    let field = key.strip_suffix(SUBMAPPER_SUFFIX).ok_or_else(|| {
        MapperError::config(format!(
            "invalid mapper key '{key}': to map nested values, use the format <key>{SUBMAPPER_SUFFIX}: {{...}}"
        ))
    })?;

    // Deserialization follows the field's own rename; serialization keys
    // are final attribute names and never move.
    let mapped_field = match direction {
        Direction::Serialize => field.to_string(),
        Direction::Deserialize => match apply_override(latest, field, field, previous, direction)? {
            MapperEntry::Rename(target) => target,
            _ => field.to_string(),
        },
    };

    let nested_override = match latest {
        Override::Case(_) => Some(latest),
        Override::Mapping(map) => match map
            .get(&submapper_key(&mapped_field))
            .or_else(|| map.get(key))
        {
            Some(OverrideValue::Nested(o)) => Some(o),
            Some(_) => {
                return Err(MapperError::config(format!(
                    "Mapper must be a mapping (at '{key}')"
                )));
            }
            None => None,
        },
    };

    let value = match nested_override {
        Some(o) => aggregate(o, nested, direction).map_err(|e| e.with_context(key))?,
        None => nested.clone(),
    };
    Ok((submapper_key(&mapped_field), MapperEntry::SubMapper(value)))
}

fn aggregate_call(
    latest: &Override,
    key: &str,
    call: &FunctionCall,
    previous: &EffectiveMapper,
    direction: Direction,
) -> Result<MapperEntry, MapperError> {
    if let Some(OverrideValue::Call(_)) = latest.get(key) {
        return Err(MapperError::unsupported(format!(
            "'{key}': combining multiple function calls for the same field is unsupported"
        )));
    }

    let args: Vec<String> = if call.args.is_empty() {
        vec![key.to_string()]
    } else {
        call.args.clone()
    };

    let args = match direction {
        Direction::Serialize => args,
        Direction::Deserialize => args
            .into_iter()
            .map(|arg| {
                if arg == key {
                    return Ok(arg);
                }
                let current = previous
                    .get(&arg)
                    .and_then(MapperEntry::as_rename)
                    .unwrap_or(arg.as_str())
                    .to_string();
                match apply_override(latest, &arg, &current, previous, direction)? {
                    MapperEntry::Rename(target) => Ok(target),
                    _ => Err(MapperError::unsupported(format!(
                        "'{key}': argument '{arg}' resolves to a function call"
                    ))),
                }
            })
            .collect::<Result<_, MapperError>>()?,
    };

    Ok(MapperEntry::Call(FunctionCall {
        func: call.func.clone(),
        args,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapwright_api::error::ErrorKind;
    use mapwright_api::mapping::CaseDirective;

    fn identity(keys: &[&str]) -> EffectiveMapper {
        keys.iter().map(|k| (*k, *k)).collect()
    }

    fn mapper<const N: usize>(entries: [(&str, MapperEntry); N]) -> EffectiveMapper {
        entries.into_iter().collect()
    }

    #[test]
    fn camel_case_directive() {
        let out = aggregate(
            &Override::Case(CaseDirective::ToCamelCase),
            &identity(&["last_name"]),
            Direction::Deserialize,
        )
        .unwrap();
        assert_eq!(out, mapper([("last_name", MapperEntry::rename("lastName"))]));
    }

    #[test]
    fn lowercase_directive_upper_cases() {
        // Current behavior of the "to lowercase" preset, kept on purpose.
        for direction in [Direction::Serialize, Direction::Deserialize] {
            let out = aggregate(
                &Override::Case(CaseDirective::ToLowercase),
                &identity(&["abc"]),
                direction,
            )
            .unwrap();
            assert_eq!(out, mapper([("abc", MapperEntry::rename("ABC"))]));
        }
    }

    #[test]
    fn partial_mapping_passes_unmapped_keys_through() {
        let out = aggregate(
            &Override::mapping([("a", "b")]),
            &identity(&["a", "s"]),
            Direction::Serialize,
        )
        .unwrap();
        assert_eq!(
            out,
            mapper([("a", MapperEntry::rename("b")), ("s", MapperEntry::rename("s"))])
        );
    }

    #[test]
    fn chained_layers_compose() {
        let first = aggregate(&Override::mapping([("a", "b")]), &identity(&["a"]), Direction::Deserialize).unwrap();
        let second = aggregate(&Override::mapping([("b", "c")]), &first, Direction::Deserialize).unwrap();
        assert_eq!(second, mapper([("a", MapperEntry::rename("c"))]));
    }

    #[test]
    fn later_layer_sees_earlier_output_not_field_name() {
        let first = aggregate(&Override::mapping([("a", "b")]), &identity(&["a"]), Direction::Serialize).unwrap();
        // `a` is no longer the target, so this layer does not apply.
        let second = aggregate(&Override::mapping([("a", "z")]), &first, Direction::Serialize).unwrap();
        assert_eq!(second, mapper([("a", MapperEntry::rename("b"))]));
    }

    #[test]
    fn function_call_replacement_without_args_uses_current_key() {
        let previous = mapper([("s", MapperEntry::rename("S"))]);
        let out = aggregate(
            &Override::mapping([("S", FunctionCall::new("double"))]),
            &previous,
            Direction::Deserialize,
        )
        .unwrap();
        assert_eq!(
            out,
            mapper([("s", MapperEntry::Call(FunctionCall::with_args("double", ["S"])))])
        );
    }

    #[test]
    fn function_call_replacement_resolves_declared_args() {
        let previous = mapper([
            ("x", MapperEntry::rename("xx")),
            ("y", MapperEntry::rename("y")),
        ]);
        let out = aggregate(
            &Override::mapping([("y", FunctionCall::with_args("sum", ["x", "other"]))]),
            &previous,
            Direction::Serialize,
        )
        .unwrap();
        assert_eq!(
            out.get("y"),
            Some(&MapperEntry::Call(FunctionCall::with_args("sum", ["xx", "other"])))
        );
    }

    #[test]
    fn function_call_on_renamed_key_fails_when_serializing() {
        let previous = mapper([("s", MapperEntry::rename("S"))]);
        let err = aggregate(
            &Override::mapping([("S", FunctionCall::new("double"))]),
            &previous,
            Direction::Serialize,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn deserialization_resolves_call_arguments() {
        let previous = mapper([
            ("x", MapperEntry::rename("x")),
            ("y", MapperEntry::Call(FunctionCall::with_args("f", ["x"]))),
        ]);
        let out = aggregate(&Override::mapping([("x", "z")]), &previous, Direction::Deserialize).unwrap();
        assert_eq!(
            out,
            mapper([
                ("x", MapperEntry::rename("z")),
                ("y", MapperEntry::Call(FunctionCall::with_args("f", ["z"]))),
            ])
        );
    }

    #[test]
    fn serialization_keeps_call_arguments() {
        let previous = mapper([
            ("x", MapperEntry::rename("x")),
            ("y", MapperEntry::Call(FunctionCall::with_args("f", ["x"]))),
        ]);
        let out = aggregate(&Override::mapping([("x", "z")]), &previous, Direction::Serialize).unwrap();
        assert_eq!(out.get("y"), Some(&MapperEntry::Call(FunctionCall::with_args("f", ["x"]))));
    }

    #[test]
    fn call_without_args_gets_self_reference() {
        let previous = mapper([("y", MapperEntry::Call(FunctionCall::new("f")))]);
        let out = aggregate(
            &Override::Case(CaseDirective::ToLowercase),
            &previous,
            Direction::Deserialize,
        )
        .unwrap();
        // Self references stay unchanged.
        assert_eq!(out.get("y"), Some(&MapperEntry::Call(FunctionCall::with_args("f", ["y"]))));
    }

    #[test]
    fn second_function_call_for_same_field_fails() {
        let previous = mapper([("y", MapperEntry::Call(FunctionCall::new("f")))]);
        for direction in [Direction::Serialize, Direction::Deserialize] {
            let err = aggregate(&Override::mapping([("y", FunctionCall::new("g"))]), &previous, direction)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unsupported);
        }
    }

    #[test]
    fn nested_value_without_suffix_fails() {
        let previous = mapper([("a", MapperEntry::SubMapper(identity(&["x"])))]);
        let err = aggregate(&Override::mapping([("x", "y")]), &previous, Direction::Serialize).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn nested_override_under_plain_key_fails() {
        let err = aggregate(
            &Override::mapping([("a", Override::mapping([("x", "y")]))]),
            &identity(&["a"]),
            Direction::Serialize,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn plain_value_under_submapper_key_fails() {
        let previous = mapper([
            ("foo", MapperEntry::rename("foo")),
            ("foo._mapper", MapperEntry::SubMapper(identity(&["i"]))),
        ]);
        for direction in [Direction::Serialize, Direction::Deserialize] {
            let err = aggregate(&Override::mapping([("foo._mapper", "x")]), &previous, direction).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
            assert!(err.message.contains("Mapper must be a mapping"), "{err}");
        }
    }

    #[test]
    fn directive_cascades_into_submappers() {
        let previous = mapper([
            ("foo", MapperEntry::rename("foo")),
            ("foo._mapper", MapperEntry::SubMapper(identity(&["xyz", "i"]))),
        ]);

        let des = aggregate(&Override::Case(CaseDirective::ToLowercase), &previous, Direction::Deserialize).unwrap();
        assert_eq!(
            des,
            mapper([
                ("foo", MapperEntry::rename("FOO")),
                (
                    "FOO._mapper",
                    MapperEntry::SubMapper(mapper([
                        ("xyz", MapperEntry::rename("XYZ")),
                        ("i", MapperEntry::rename("I")),
                    ])),
                ),
            ])
        );

        let ser = aggregate(&Override::Case(CaseDirective::ToLowercase), &previous, Direction::Serialize).unwrap();
        assert!(ser.contains_key("foo._mapper"));
        assert_eq!(ser.len(), 2);
    }

    #[test]
    fn nested_override_is_found_by_renamed_or_original_key() {
        let previous = mapper([
            ("foo", MapperEntry::rename("bar")),
            ("bar._mapper", MapperEntry::SubMapper(identity(&["i"]))),
        ]);

        // Deserialization: "bar" is both the renamed and the original key here.
        let out = aggregate(
            &Override::mapping([("bar._mapper", Override::mapping([("i", "j")]))]),
            &previous,
            Direction::Deserialize,
        )
        .unwrap();
        assert_eq!(out.submapper("bar"), Some(&mapper([("i", MapperEntry::rename("j"))])));

        // Renaming the field moves the submapper key too.
        let out = aggregate(
            &Override::mapping([
                ("bar", OverrideValue::from("baz")),
                ("bar._mapper", Override::mapping([("i", "k")]).into()),
            ]),
            &previous,
            Direction::Deserialize,
        )
        .unwrap();
        assert_eq!(out.submapper("baz"), Some(&mapper([("i", MapperEntry::rename("k"))])));
        assert!(!out.contains_key("bar._mapper"));
    }

    #[test]
    fn serialization_keeps_submapper_key() {
        let previous = mapper([
            ("foo", MapperEntry::rename("foo")),
            ("foo._mapper", MapperEntry::SubMapper(identity(&["i"]))),
        ]);
        let out = aggregate(
            &Override::mapping([
                ("foo", OverrideValue::from("bar")),
                ("foo._mapper", Override::mapping([("i", "j")]).into()),
            ]),
            &previous,
            Direction::Serialize,
        )
        .unwrap();
        assert_eq!(out.get("foo"), Some(&MapperEntry::rename("bar")));
        assert_eq!(out.submapper("foo"), Some(&mapper([("i", MapperEntry::rename("j"))])));
    }

    #[test]
    fn key_count_is_preserved() {
        let previous = mapper([
            ("a", MapperEntry::rename("a")),
            ("b", MapperEntry::Call(FunctionCall::new("f"))),
            ("c._mapper", MapperEntry::SubMapper(identity(&["x"]))),
        ]);
        for latest in [
            Override::Case(CaseDirective::ToCamelCase),
            Override::Case(CaseDirective::ToLowercase),
            Override::mapping([("a", "z")]),
        ] {
            for direction in [Direction::Serialize, Direction::Deserialize] {
                let out = aggregate(&latest, &previous, direction).unwrap();
                assert_eq!(out.len(), previous.len());
            }
        }
    }
}
