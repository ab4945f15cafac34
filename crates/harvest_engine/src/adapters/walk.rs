use serde_json::{Map, Value};

/// How the walker continues below the object just visited.
pub(crate) enum Descend {
    All,
    Except(&'static str),
}

/// Depth-first visit of every JSON object, parents before children.
pub(crate) fn walk_objects<F>(value: &Value, visit: &mut F)
where
    F: FnMut(&Map<String, Value>) -> Descend,
{
    match value {
        Value::Array(items) => {
            for item in items {
                walk_objects(item, visit);
            }
        }
        Value::Object(map) => {
            let skip = match visit(map) {
                Descend::All => None,
                Descend::Except(key) => Some(key),
            };
            for (key, child) in map {
                if Some(key.as_str()) != skip {
                    walk_objects(child, visit);
                }
            }
        }
        _ => {}
    }
}

/// A string or numeric field as text; ids arrive in both forms.
pub(crate) fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
