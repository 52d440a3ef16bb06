//! Shared constant table and environment placeholder resolution.
//!
//! The table is an explicit object owned by the scanner and handed to the
//! post-resolution pass; there is no process-wide singleton. Multiple writes
//! to the same name are allowed and the most recent write in walk order wins,
//! which is reproducible because the walk order is deterministic.

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::sync::RwLock;

use lazy_static::lazy_static;
use regex::Regex;

use crate::extract::{ConsumedApi, ProducedApi, Value};

lazy_static! {
    /// `<ENV:NAME>` placeholder. Anchored: a partial match is not a placeholder.
    static ref ENV_PLACEHOLDER: Regex =
        Regex::new(r"^<ENV:([A-Za-z_][A-Za-z0-9_]*)>$").unwrap();
}

/// Extract the variable name from an `<ENV:NAME>` placeholder token.
fn env_placeholder(token: &str) -> Option<&str> {
    ENV_PLACEHOLDER
        .captures(token)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Resolve an environment variable to its value or the miss sentinel.
///
/// The sentinel embeds the variable name so the miss stays traceable in the
/// final report instead of being silently dropped.
fn env_value(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| format!("<UNRESOLVED_ENV:{}>", name))
}

/// Process-wide mapping from symbolic name to resolved literal value.
pub struct ConstantTable {
    values: RwLock<HashMap<String, Value>>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Register a constant. Last writer for a name wins.
    ///
    /// String values that are `<ENV:NAME>` placeholders are resolved against
    /// the process environment here, so the table only ever stores concrete
    /// values or the unresolved-env sentinel.
    pub fn define(&self, name: &str, value: Value) {
        let value = match value {
            Value::Str(s) => match env_placeholder(&s) {
                Some(var) => Value::Str(env_value(var)),
                None => Value::Str(s),
            },
            v => v,
        };
        self.values.write().unwrap().insert(name.to_string(), value);
    }

    /// Look up a constant by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.read().unwrap().get(name).cloned()
    }

    /// Resolve a token to a value.
    ///
    /// Environment placeholders resolve to the variable's value or the
    /// `<UNRESOLVED_ENV:NAME>` sentinel; known constant names resolve to
    /// their stored value; anything else is returned unchanged (it may be a
    /// literal already, or an unresolvable symbolic reference).
    pub fn resolve(&self, token: &str) -> Value {
        if let Some(var) = env_placeholder(token) {
            return Value::Str(env_value(var));
        }
        if let Some(value) = self.get(token) {
            return value;
        }
        Value::Str(token.to_string())
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered copy of the table for report assembly.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.values
            .read()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for ConstantTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Post-resolution pass over accumulated records.
///
/// Runs exactly once, after the walk, so constants declared in files visited
/// late still resolve references extracted early. String paths/targets go
/// through [`ConstantTable::resolve`]; everything that resolves to nothing is
/// left as-is.
pub fn resolve_records(
    table: &ConstantTable,
    produced: &mut [ProducedApi],
    consumed: &mut [ConsumedApi],
) {
    for api in produced.iter_mut() {
        if let Some(Value::Str(token)) = &api.path {
            api.path = Some(table.resolve(token));
        }
    }
    for api in consumed.iter_mut() {
        if let Some(Value::Str(token)) = &api.target {
            api.target = Some(table.resolve(token));
        }
    }
}
