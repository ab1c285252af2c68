use mapwright_api::mapping::{submapper_key, EffectiveMapper, MapperEntry};

/// Resolve a dot-notation path against a mapper.
///
/// - `"a"` → `mapper["a"]`
/// - `"foo.a"` → `mapper["foo._mapper"]["a"]` (or `mapper["foo"]` when that
///   entry itself is a submapper)
///
/// Returns `None` as soon as a segment is missing or an intermediate
/// segment is not a submapper.
pub fn deep_get<'a>(mapper: &'a EffectiveMapper, path: &str) -> Option<&'a MapperEntry> {
    let mut segments = path.split('.').peekable();
    let mut current = mapper;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            return current.get(segment);
        }
        current = current
            .get(&submapper_key(segment))
            .or_else(|| current.get(segment))
            .and_then(MapperEntry::as_submapper)?;
    }
    None
}

/// Like [`deep_get`], but yields the target key of a rename and falls back
/// to `path` itself for anything else.
pub fn resolve_key(mapper: &EffectiveMapper, path: &str) -> String {
    match deep_get(mapper, path) {
        Some(MapperEntry::Rename(target)) => target.clone(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapwright_api::mapping::FunctionCall;

    fn sample() -> EffectiveMapper {
        let mut inner = EffectiveMapper::new();
        inner.insert("x", "X");
        let mut mapper = EffectiveMapper::new();
        mapper.insert("a", "b");
        mapper.insert("foo", "FOO");
        mapper.insert("foo._mapper", inner);
        mapper.insert("f", FunctionCall::new("double"));
        mapper
    }

    #[test]
    fn single_segment() {
        let m = sample();
        assert_eq!(deep_get(&m, "a"), Some(&MapperEntry::rename("b")));
        assert_eq!(deep_get(&m, "missing"), None);
    }

    #[test]
    fn walks_submappers() {
        let m = sample();
        assert_eq!(deep_get(&m, "foo.x"), Some(&MapperEntry::rename("X")));
        assert_eq!(deep_get(&m, "foo.y"), None);
    }

    #[test]
    fn tolerates_missing_intermediates() {
        let m = sample();
        assert_eq!(deep_get(&m, "nope.x.y"), None);
        // `a` is a rename, not a submapper.
        assert_eq!(deep_get(&m, "a.x"), None);
        assert_eq!(deep_get(&m, "f.x"), None);
    }

    #[test]
    fn resolve_key_falls_back_to_path() {
        let m = sample();
        assert_eq!(resolve_key(&m, "a"), "b");
        assert_eq!(resolve_key(&m, "foo.x"), "X");
        assert_eq!(resolve_key(&m, "f"), "f");
        assert_eq!(resolve_key(&m, "b.c"), "b.c");
    }
}
