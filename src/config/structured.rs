//! Structured (JSON) config dialect
//!
//! Document shape:
//!
//! ```json
//! {"targets": [{"app_name": "com.a", "enabled": true, "start_up_delay_ms": 0,
//!               "injected_libraries": [{"path": "/x.so"}],
//!               "child_gating": {"enabled": true, "mode": "whitelist",
//!                                "injected_libraries": [{"path": "/y.so"}]}}]}
//! ```
//!
//! Validation is whole-document: one malformed target rejects every target,
//! so a broken file never activates a partial policy. When an object repeats
//! a key, the first occurrence is the one that counts.

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

use super::error::ConfigError;
use crate::models::{ChildGatingConfig, TargetConfig};

/// Parse a structured document, logging the failure and yielding `None`
pub fn parse(content: &[u8]) -> Option<Vec<TargetConfig>> {
    parse_targets(content).map_err(|err| err.log()).ok()
}

/// Parse a structured document into its target records, in document order
pub fn parse_targets(content: &[u8]) -> Result<Vec<TargetConfig>, ConfigError> {
    let FirstKeyWins(doc) =
        serde_json::from_slice(content).map_err(|err| syntax_error(content, &err))?;

    let root = doc
        .as_object()
        .ok_or_else(|| ConfigError::schema("config expected a json root object"))?;

    let targets = root
        .get("targets")
        .and_then(Value::as_array)
        .ok_or_else(|| ConfigError::schema("expected config targets to be an array"))?;

    targets.iter().map(deserialize_target_config).collect()
}

/// First target whose `app_name` equals `app_name`, in document order
pub fn resolve(targets: Vec<TargetConfig>, app_name: &str) -> Result<TargetConfig, ConfigError> {
    targets
        .into_iter()
        .find(|target| target.app_name == app_name)
        .ok_or_else(|| ConfigError::NoMatch {
            app_name: app_name.to_string(),
        })
}

fn deserialize_target_config(value: &Value) -> Result<TargetConfig, ConfigError> {
    let doc = value
        .as_object()
        .ok_or_else(|| ConfigError::schema("expected config targets array to contain objects"))?;

    let app_name = require_str(doc, "app_name", "targets.app_name")?;
    let enabled = require_bool(doc, "enabled", "targets.enabled")?;

    let start_up_delay_ms = doc
        .get("start_up_delay_ms")
        .and_then(Value::as_u64)
        .ok_or_else(|| ConfigError::schema("expected targets.start_up_delay_ms to be an uint64"))?;

    let injected_libraries =
        deserialize_libraries(doc.get("injected_libraries"), "injected_libraries")?;
    if injected_libraries.is_empty() {
        return Err(ConfigError::schema(format!(
            "expected injected_libraries of {} to not be empty",
            app_name
        )));
    }

    let child_gating = doc
        .get("child_gating")
        .map(deserialize_child_gating_config)
        .transpose()?;

    Ok(TargetConfig {
        app_name: app_name.to_string(),
        enabled,
        start_up_delay_ms,
        injected_libraries,
        child_gating,
    })
}

fn deserialize_child_gating_config(value: &Value) -> Result<ChildGatingConfig, ConfigError> {
    let doc = value
        .as_object()
        .ok_or_else(|| ConfigError::schema("expected child_gating to be an object"))?;

    let enabled = require_bool(doc, "enabled", "child_gating.enabled")?;
    let mode = require_str(doc, "mode", "child_gating.mode")?;

    let injected_libraries = match doc.get("injected_libraries") {
        Some(libraries) => {
            deserialize_libraries(Some(libraries), "child_gating.injected_libraries")?
        }
        None => Vec::new(),
    };

    Ok(ChildGatingConfig {
        enabled,
        mode: mode.to_string(),
        injected_libraries,
    })
}

/// `[{"path": "..."}, ...]` to the list of paths. Any bad entry fails the list.
fn deserialize_libraries(value: Option<&Value>, field: &str) -> Result<Vec<String>, ConfigError> {
    let libraries = value
        .and_then(Value::as_array)
        .ok_or_else(|| ConfigError::schema(format!("expected {} to be an array", field)))?;

    libraries
        .iter()
        .map(|library| {
            let library = library.as_object().ok_or_else(|| {
                ConfigError::schema(format!("expected {} members to be objects", field))
            })?;
            require_str(library, "path", &format!("{}.path", field)).map(str::to_string)
        })
        .collect()
}

fn require_str<'a>(
    doc: &'a Map<String, Value>,
    key: &str,
    field: &str,
) -> Result<&'a str, ConfigError> {
    doc.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::schema(format!("expected {} to be a string", field)))
}

fn require_bool(doc: &Map<String, Value>, key: &str, field: &str) -> Result<bool, ConfigError> {
    doc.get(key)
        .and_then(Value::as_bool)
        .ok_or_else(|| ConfigError::schema(format!("expected {} to be a bool", field)))
}

/// JSON value whose objects keep the first of any duplicated keys
struct FirstKeyWins(Value);

impl<'de> Deserialize<'de> for FirstKeyWins {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("any valid JSON value")
            }

            fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(v.into()))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Value::Number(v.into()))
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
                Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E> {
                Ok(Value::String(v))
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(FirstKeyWins(elem)) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut obj = Map::new();
                while let Some(key) = map.next_key::<String>()? {
                    // Later duplicates are still consumed to keep the parser in step
                    let FirstKeyWins(value) = map.next_value()?;
                    obj.entry(key).or_insert(value);
                }
                Ok(Value::Object(obj))
            }
        }

        deserializer.deserialize_any(ValueVisitor).map(FirstKeyWins)
    }
}

fn syntax_error(content: &[u8], err: &serde_json::Error) -> ConfigError {
    let line = err.line();
    let column = err.column();
    ConfigError::Syntax {
        offset: byte_offset(content, line, column),
        line,
        column,
        message: err.to_string(),
    }
}

/// Convert serde_json's 1-based line/column into a byte offset into `content`
fn byte_offset(content: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        content
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte == b'\n')
            .nth(line - 2)
            .map(|(idx, _)| idx + 1)
            .unwrap_or(content.len())
    };

    (line_start + column.saturating_sub(1)).min(content.len())
}
