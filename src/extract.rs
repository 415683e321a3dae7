// Best-effort field extraction from JSON response bodies.
//
// Callers ask for a list of dotted paths (`user.id`, `records.0.title`)
// and get back whatever resolved. A body that does not parse is not an
// error: `Extracted::parsed` is false and every lookup comes back empty.

use serde_json::Value;
use std::collections::BTreeMap;

/// A resolved terminal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Text as-is, lists comma-joined in server order.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub parsed: bool,
    fields: BTreeMap<String, FieldValue>,
}

impl Extracted {
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }

    pub fn text(&self, path: &str) -> Option<&str> {
        match self.fields.get(path) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn list(&self, path: &str) -> Option<&[String]> {
        match self.fields.get(path) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// First path in `paths` that resolved to text.
    pub fn first_text(&self, paths: &[&str]) -> Option<&str> {
        paths.iter().find_map(|p| self.text(p))
    }

    /// True when the body parsed and every path in `paths` resolved.
    pub fn has_all(&self, paths: &[&str]) -> bool {
        self.parsed && paths.iter().all(|p| self.fields.contains_key(*p))
    }
}

/// Strictly parse `raw`. Empty or malformed bodies yield `None`.
pub fn parse_body(raw: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    serde_json::from_str(raw).ok()
}

/// Extract each of `paths` from `raw`, independently of one another.
pub fn extract(raw: &str, paths: &[&str]) -> Extracted {
    match parse_body(raw) {
        Some(root) => extract_from(&root, paths),
        None => Extracted::default(),
    }
}

/// Same as [`extract`] for an already-parsed document.
pub fn extract_from(root: &Value, paths: &[&str]) -> Extracted {
    let mut fields = BTreeMap::new();
    for path in paths {
        if let Some(value) = lookup(root, path).and_then(terminal) {
            fields.insert(path.to_string(), value);
        }
    }
    Extracted {
        parsed: true,
        fields,
    }
}

/// Walk `path` through objects and arrays. Numeric segments index arrays;
/// every other segment must name an object key.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Render a scalar as text. `null`, objects and arrays are not scalars.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn terminal(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>()
            .map(FieldValue::List),
        other => scalar_text(other).map(FieldValue::Text),
    }
}
