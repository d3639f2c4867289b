//! Raw user selections: loading, saving and `key=value` assignments.
//!
//! Every input source (a JSON file, `--set` assignments, `--name`) produces
//! one [`RawSelections`] before the engine runs. Nothing here checks
//! consistency; that is the validator's job.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::engine::{Catalog, OptionKind};
use crate::error::StackgenError;
use crate::value::Value;

/// Unvalidated, possibly partial option values keyed by identifier.
///
/// A JSON `null` means "unset" and is dropped on load. Floats, arrays and
/// objects are kept aside as unsupported so the validator can name the key
/// they were given for; they are not written back by [`Self::save_to_file`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, serde_json::Value>", into = "BTreeMap<String, Value>")]
pub struct RawSelections {
    entries: BTreeMap<String, Value>,
    /// Keys whose JSON value is not a scalar, with a description of what was found
    unsupported: BTreeMap<String, String>,
}

impl From<BTreeMap<String, serde_json::Value>> for RawSelections {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        let mut selections = Self::default();
        for (key, json) in map {
            match scalar(json) {
                Ok(Some(value)) => {
                    selections.entries.insert(key, value);
                }
                Ok(None) => {}
                Err(found) => {
                    tracing::debug!("Selection '{}' holds a non-scalar {}", key, found);
                    selections.unsupported.insert(key, found);
                }
            }
        }
        selections
    }
}

/// Scalar for a JSON value: `Ok(None)` for null, `Err` describing anything
/// that is not a bool, an `i64` or a string
fn scalar(json: serde_json::Value) -> std::result::Result<Option<Value>, String> {
    use serde_json::Value as Json;

    match json {
        Json::Null => Ok(None),
        Json::Bool(b) => Ok(Some(Value::Bool(b))),
        Json::String(s) => Ok(Some(Value::Text(s))),
        Json::Number(n) => n
            .as_i64()
            .map(|i| Some(Value::Int(i)))
            .ok_or_else(|| format!("number '{}'", n)),
        Json::Array(_) => Err("array".to_string()),
        Json::Object(_) => Err("object".to_string()),
    }
}

impl From<RawSelections> for BTreeMap<String, Value> {
    fn from(selections: RawSelections) -> Self {
        selections.entries
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawSelections {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            unsupported: BTreeMap::new(),
        }
    }
}

impl RawSelections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        self.unsupported.remove(&key);
        self.entries.insert(key, value.into());
    }

    /// Description of the non-scalar JSON value supplied for `key`, if any
    pub fn unsupported(&self, key: &str) -> Option<&str> {
        self.unsupported.get(key).map(String::as_str)
    }

    /// Every supplied key, scalar or not
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .chain(self.unsupported.keys())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.unsupported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.unsupported.is_empty()
    }

    /// Overlay `other` on top of these selections; `other` wins on conflicts
    pub fn merge(&mut self, other: RawSelections) {
        for (key, value) in other.entries {
            self.set(key, value);
        }
        for (key, found) in other.unsupported {
            self.entries.remove(&key);
            self.unsupported.insert(key, found);
        }
    }

    /// Save selections to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize selections to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write selections to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load selections from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read selections from {:?}", path.as_ref()))?;

        let selections: Self = serde_json::from_str(&content).with_context(|| {
            format!(
                "Failed to parse selections JSON in {:?} (expected an object of scalar values)",
                path.as_ref()
            )
        })?;

        tracing::debug!(
            "Loaded {} selection(s) from {:?}",
            selections.len(),
            path.as_ref()
        );
        Ok(selections)
    }

    /// Apply `key=value` assignments, coercing each value by the option's kind
    pub fn apply_assignments<I, S>(
        &mut self,
        assignments: I,
        catalog: &Catalog,
    ) -> Result<(), StackgenError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for assignment in assignments {
            let (key, value) = parse_assignment(assignment.as_ref(), catalog)?;
            self.set(key, value);
        }
        Ok(())
    }
}

/// Split `key=value` and coerce the value.
///
/// Booleans accept `true/false/yes/no/on/off`, integers parse as `i64`. A
/// value that does not fit its option's kind stays a string so the validator
/// reports it with the option's own message.
pub fn parse_assignment(
    assignment: &str,
    catalog: &Catalog,
) -> Result<(String, Value), StackgenError> {
    let Some((key, raw)) = assignment.split_once('=') else {
        return Err(StackgenError::input(format!(
            "expected key=value, got '{}'",
            assignment
        )));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(StackgenError::input(format!(
            "missing option name in '{}'",
            assignment
        )));
    }
    let raw = raw.trim();

    let value = match catalog.get(key).map(|option| &option.kind) {
        Some(OptionKind::Bool) => parse_bool(raw).map(Value::Bool),
        Some(OptionKind::Int { .. }) => raw.parse::<i64>().ok().map(Value::Int),
        Some(_) => None,
        None => parse_bool(raw)
            .map(Value::Bool)
            .or_else(|| raw.parse::<i64>().ok().map(Value::Int)),
    }
    .unwrap_or_else(|| Value::from(raw));

    Ok((key.to_string(), value))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
