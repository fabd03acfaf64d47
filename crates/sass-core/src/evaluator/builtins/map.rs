//! `sass:map` — operations over [`SassMap`] (§4.4).

use std::collections::HashMap;

use crate::error::{SassError, SassResult, Span};
use crate::value::{ListSeparator, SassMap, Value};

use super::ArgReader;

pub(super) fn call(name: &str, positional: Vec<Value>, named: HashMap<String, Value>, span: &Span) -> Option<SassResult<Value>> {
    let mut args = ArgReader::new(positional, named);
    let result = match name {
        "get" | "map-get" => get(&mut args, span),
        "set" | "map-set" => set(&mut args, span),
        "merge" | "map-merge" => merge(&mut args, span),
        "keys" | "map-keys" => keys(&mut args, span),
        "values" | "map-values" => values(&mut args, span),
        "has-key" | "map-has-key" => has_key(&mut args, span),
        "remove" | "map-remove" => remove(&mut args, span),
        _ => return None,
    };
    Some(result)
}

fn expect_map<'a>(value: &'a Value, span: &Span) -> SassResult<&'a SassMap> {
    match value {
        Value::Map(m) => Ok(m),
        other => Err(SassError::runtime(format!("{other} is not a map."), span.clone())),
    }
}

/// `map.get($map, $key, $keys...)`: walks nested maps through any
/// additional keys, returning `null` as soon as a key is missing.
fn get(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let map = args.required("map", span)?;
    let key = args.required("key", span)?;
    let rest = args.rest();
    let mut current = expect_map(&map, span)?.get(&key).cloned();
    for key in rest {
        current = match current {
            Some(Value::Map(m)) => m.get(&key).cloned(),
            _ => None,
        };
    }
    Ok(current.unwrap_or(Value::Null))
}

fn set(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let map = args.required("map", span)?;
    let key = args.required("key", span)?;
    let value = args.required("value", span)?;
    let mut map = expect_map(&map, span)?.clone();
    map.insert(key, value);
    Ok(Value::map(map))
}

fn merge(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let a = args.required("map1", span)?;
    let b = args.required("map2", span)?;
    let merged = expect_map(&a, span)?.merge(expect_map(&b, span)?);
    Ok(Value::map(merged))
}

fn keys(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let map = args.required("map", span)?;
    let keys: Vec<Value> = expect_map(&map, span)?.entries().iter().map(|(k, _)| k.clone()).collect();
    Ok(Value::list(keys, ListSeparator::Comma, false))
}

fn values(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let map = args.required("map", span)?;
    let values: Vec<Value> = expect_map(&map, span)?.entries().iter().map(|(_, v)| v.clone()).collect();
    Ok(Value::list(values, ListSeparator::Comma, false))
}

fn has_key(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let map = args.required("map", span)?;
    let key = args.required("key", span)?;
    Ok(Value::Boolean(expect_map(&map, span)?.has_key(&key)))
}

fn remove(args: &mut ArgReader, span: &Span) -> SassResult<Value> {
    let map = args.required("map", span)?;
    let mut keys = vec![args.required("key", span)?];
    keys.extend(args.rest());
    let mut map = expect_map(&map, span)?.clone();
    for key in &keys {
        map = map.remove(key);
    }
    Ok(Value::map(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SassNumber;

    fn span() -> Span {
        use crate::error::SourceFile;
        use std::sync::Arc;
        let source = Arc::new(SourceFile::new(url::Url::parse("file:///t.scss").unwrap(), ""));
        Span::new(source, 0, 0)
    }

    fn sample_map() -> Value {
        let mut m = SassMap::new();
        m.insert(Value::quoted_string("a"), Value::Number(SassNumber::new(1.0)));
        Value::map(m)
    }

    #[test]
    fn get_returns_null_for_missing_key() {
        let result = call("get", vec![sample_map(), Value::quoted_string("missing")], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn has_key_reports_presence() {
        let result = call("has-key", vec![sample_map(), Value::quoted_string("a")], HashMap::new(), &span())
            .unwrap()
            .unwrap();
        assert_eq!(result, Value::Boolean(true));
    }
}
