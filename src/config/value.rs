//! Configuration Values
//!
//! Tagged value type for the configuration tree, plus the merge, lookup and
//! coercion rules the resolver applies while layering sources.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A section or the whole tree: ordered key -> value mapping
pub type ConfigTable = BTreeMap<String, ConfigValue>;

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringList(Vec<String>),
    Table(ConfigTable),
}

/// A structured document contained a shape the tree cannot hold
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unsupported value at '{path}': {kind}")]
pub struct UnsupportedValue {
    pub path: String,
    pub kind: &'static str,
}

impl ConfigValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view: integers widen to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Int(i) => Some(*i as f64),
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ConfigValue::StringList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&ConfigTable> {
        match self {
            ConfigValue::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, ConfigValue::Int(_) | ConfigValue::Float(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::StringList(_) => "string list",
            ConfigValue::Table(_) => "table",
        }
    }

    /// Convert a parsed JSON document node
    pub fn from_json(value: serde_json::Value, path: &str) -> Result<Self, UnsupportedValue> {
        use serde_json::Value;

        match value {
            Value::Bool(b) => Ok(ConfigValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(ConfigValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(ConfigValue::Float(f))
                } else {
                    Err(unsupported(path, "number out of range"))
                }
            }
            Value::String(s) => Ok(ConfigValue::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(unsupported(path, "list entries must be strings")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ConfigValue::StringList),
            Value::Object(map) => {
                let mut table = ConfigTable::new();
                for (key, item) in map {
                    let child = join_path(path, &key);
                    table.insert(key, ConfigValue::from_json(item, &child)?);
                }
                Ok(ConfigValue::Table(table))
            }
            Value::Null => Err(unsupported(path, "null")),
        }
    }

    /// Convert a parsed TOML document node
    pub fn from_toml(value: toml::Value, path: &str) -> Result<Self, UnsupportedValue> {
        use toml::Value;

        match value {
            Value::Boolean(b) => Ok(ConfigValue::Bool(b)),
            Value::Integer(i) => Ok(ConfigValue::Int(i)),
            Value::Float(f) => Ok(ConfigValue::Float(f)),
            Value::String(s) => Ok(ConfigValue::String(s)),
            Value::Datetime(dt) => Ok(ConfigValue::String(dt.to_string())),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(unsupported(path, "list entries must be strings")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ConfigValue::StringList),
            Value::Table(map) => {
                let mut table = ConfigTable::new();
                for (key, item) in map {
                    let child = join_path(path, &key);
                    table.insert(key, ConfigValue::from_toml(item, &child)?);
                }
                Ok(ConfigValue::Table(table))
            }
        }
    }
}

/// Dotted path of the first float in `table` that is infinite or NaN
pub fn find_non_finite(table: &ConfigTable) -> Option<String> {
    table.iter().find_map(|(key, value)| match value {
        ConfigValue::Float(f) if !f.is_finite() => Some(key.clone()),
        ConfigValue::Table(inner) => find_non_finite(inner).map(|path| join_path(key, &path)),
        _ => None,
    })
}

fn unsupported(path: &str, kind: &'static str) -> UnsupportedValue {
    UnsupportedValue {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        kind,
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::StringList(items) => write!(f, "[{}]", items.join(", ")),
            ConfigValue::Table(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str("{..}"),
            },
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        ConfigValue::Int(value as i64)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        ConfigValue::StringList(value)
    }
}

impl From<ConfigTable> for ConfigValue {
    fn from(value: ConfigTable) -> Self {
        ConfigValue::Table(value)
    }
}

/// Coerce an environment-sourced string.
///
/// Order: `true`/`false` (any case) -> bool, integer without a decimal
/// point -> int, anything `f64` parses -> float, otherwise the string as-is.
/// Integers that overflow `i64` fall through to float.
pub fn coerce_env_value(raw: &str) -> ConfigValue {
    if raw.eq_ignore_ascii_case("true") {
        return ConfigValue::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return ConfigValue::Bool(false);
    }

    if !raw.contains('.') {
        if let Ok(i) = raw.parse::<i64>() {
            return ConfigValue::Int(i);
        }
    }

    // inf/nan have no JSON representation; keep them as text
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return ConfigValue::Float(f);
        }
    }

    ConfigValue::String(raw.to_string())
}

/// Merge `incoming` over `base`: tables recurse, everything else replaces.
pub fn deep_merge(base: &mut ConfigTable, incoming: ConfigTable) {
    for (key, value) in incoming {
        match value {
            ConfigValue::Table(update) => match base.get_mut(&key) {
                Some(ConfigValue::Table(existing)) => deep_merge(existing, update),
                _ => {
                    base.insert(key, ConfigValue::Table(update));
                }
            },
            other => {
                base.insert(key, other);
            }
        }
    }
}

/// Resolve a dotted path. Missing segments or non-table intermediates yield `None`.
pub fn lookup<'a>(table: &'a ConfigTable, path: &str) -> Option<&'a ConfigValue> {
    let mut segments = path.split('.');
    let mut current = table.get(segments.next()?)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

/// Assign at a dotted path, creating (or replacing non-table) intermediates.
pub fn assign(table: &mut ConfigTable, path: &str, value: ConfigValue) {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return;
    };

    let mut current = table;
    for segment in segments {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| ConfigValue::Table(ConfigTable::new()));
        current = ensure_table(entry);
    }
    current.insert(last.to_string(), value);
}

fn ensure_table(value: &mut ConfigValue) -> &mut ConfigTable {
    if !matches!(value, ConfigValue::Table(_)) {
        *value = ConfigValue::Table(ConfigTable::new());
    }
    match value {
        ConfigValue::Table(table) => table,
        _ => unreachable!("value was replaced with a table"),
    }
}

/// Build a table from literal entries
pub fn table<const N: usize>(entries: [(&str, ConfigValue); N]) -> ConfigTable {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
