//! Per-field extraction from a decoded JSON object.
//!
//! Every schema slot is pulled out by name with an explicit rule: required,
//! or optional with a default. Errors carry the dotted field path
//! (`kb[3].price`, `intent.goal`) and the line the object came from.

use std::path::Path;

use serde_json::{Map, Value};

use super::class_label::ClassLabel;
use super::schema::Slot;
use crate::error::{LoadError, Result};

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// JSON truthiness: `false`, `null`, zero, empty strings and empty containers are falsy
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Read access to one JSON object, scoped to a source line
pub(crate) struct FieldReader<'a> {
    obj: &'a Map<String, Value>,
    prefix: String,
    path: &'a Path,
    line: usize,
}

impl<'a> FieldReader<'a> {
    pub fn root(obj: &'a Map<String, Value>, path: &'a Path, line: usize) -> Self {
        Self {
            obj,
            prefix: String::new(),
            path,
            line,
        }
    }

    fn field_path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn type_error(&self, field: String, expected: &str, found: &Value) -> LoadError {
        LoadError::schema(
            self.path,
            self.line,
            field,
            format!("expected {}, found {}", expected, json_type_name(found)),
        )
    }

    /// Present and non-null value for `key`
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.obj.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.obj.contains_key(key)
    }

    pub fn required(&self, key: &str) -> Result<&'a Value> {
        self.obj
            .get(key)
            .ok_or_else(|| LoadError::missing(self.path, self.line, self.field_path(key)))
    }

    /// Required nested object
    pub fn object(&self, key: &str) -> Result<FieldReader<'a>> {
        let value = self.required(key)?;
        let obj = value
            .as_object()
            .ok_or_else(|| self.type_error(self.field_path(key), "object", value))?;
        Ok(FieldReader {
            obj,
            prefix: self.field_path(key),
            path: self.path,
            line: self.line,
        })
    }

    /// Required array of objects, one reader per element
    pub fn objects(&self, key: &str) -> Result<Vec<FieldReader<'a>>> {
        let value = self.required(key)?;
        let items = value
            .as_array()
            .ok_or_else(|| self.type_error(self.field_path(key), "array", value))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let prefix = format!("{}[{}]", self.field_path(key), i);
                match item.as_object() {
                    Some(obj) => Ok(FieldReader {
                        obj,
                        prefix,
                        path: self.path,
                        line: self.line,
                    }),
                    None => Err(self.type_error(prefix, "object", item)),
                }
            })
            .collect()
    }

    pub fn string(&self, key: &str) -> Result<String> {
        let value = self.required(key)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.type_error(self.field_path(key), "string", value))
    }

    pub fn string_or(&self, key: &str, default: &str) -> Result<String> {
        match self.get(key) {
            None => Ok(default.to_string()),
            Some(value) => value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| self.type_error(self.field_path(key), "string", value)),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64> {
        let value = self.required(key)?;
        value
            .as_i64()
            .ok_or_else(|| self.type_error(self.field_path(key), "integer", value))
    }

    pub fn int_list(&self, key: &str) -> Result<Vec<i64>> {
        let value = self.required(key)?;
        self.int_list_value(key, value)
    }

    pub fn int_list_or_empty(&self, key: &str) -> Result<Vec<i64>> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(value) => self.int_list_value(key, value),
        }
    }

    fn int_list_value(&self, key: &str, value: &Value) -> Result<Vec<i64>> {
        let items = value
            .as_array()
            .ok_or_else(|| self.type_error(self.field_path(key), "array of integers", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_i64().ok_or_else(|| {
                    self.type_error(format!("{}[{}]", self.field_path(key), i), "integer", item)
                })
            })
            .collect()
    }

    pub fn string_list(&self, key: &str) -> Result<Vec<String>> {
        let value = self.required(key)?;
        let items = value
            .as_array()
            .ok_or_else(|| self.type_error(self.field_path(key), "array of strings", value))?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    self.type_error(format!("{}[{}]", self.field_path(key), i), "string", item)
                })
            })
            .collect()
    }

    pub fn label<T: ClassLabel>(&self, key: &str) -> Result<T> {
        let value = self.required(key)?;
        self.label_value(key, value)
    }

    pub fn label_or<T: ClassLabel>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key) {
            None => Ok(default),
            Some(value) => self.label_value(key, value),
        }
    }

    fn label_value<T: ClassLabel>(&self, key: &str, value: &Value) -> Result<T> {
        T::from_json(value)
            .map_err(|reason| LoadError::schema(self.path, self.line, self.field_path(key), reason))
    }

    /// Intent slot value; absent, `null` and `""` all mean the slot is empty
    fn slot_value(&self, key: &str) -> Option<&'a Value> {
        self.get(key).filter(|v| v.as_str() != Some(""))
    }

    pub fn slot_string(&self, key: &str) -> Result<Slot<String>> {
        match self.slot_value(key) {
            None => Ok(Slot::Empty),
            Some(value) => value
                .as_str()
                .map(|s| Slot::Value(s.to_string()))
                .ok_or_else(|| self.type_error(self.field_path(key), "string", value)),
        }
    }

    /// Integer slot; decimal strings such as `"14"` are accepted as well
    pub fn slot_int(&self, key: &str) -> Result<Slot<i64>> {
        let Some(value) = self.slot_value(key) else {
            return Ok(Slot::Empty);
        };
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed
            .map(Slot::Value)
            .ok_or_else(|| self.type_error(self.field_path(key), "integer", value))
    }

    pub fn slot_label<T: ClassLabel>(&self, key: &str) -> Result<Slot<T>> {
        match self.slot_value(key) {
            None => Ok(Slot::Empty),
            Some(value) => self.label_value(key, value).map(Slot::Value),
        }
    }
}
