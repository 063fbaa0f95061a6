//! Typed reads over a decoded body.
//!
//! Workers are written against several codec generations, so numbers may
//! arrive as signed, unsigned, or float JSON numbers. Reads never fail; a
//! missing or mistyped key yields the supplied default.

use serde_json::Value;

use super::envelope::{Body, SessionId};

pub struct BodyReader<'a> {
    body: &'a Body,
}

impl<'a> BodyReader<'a> {
    pub fn new(body: &'a Body) -> Self {
        Self { body }
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.body.get(key)
    }

    pub fn i64_of(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(value_as_i64).unwrap_or(default)
    }

    pub fn u64_of(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(value_as_u64).unwrap_or(default)
    }

    pub fn str_of(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn list_of(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Session id list under `key`. Non-numeric and non-positive entries are
    /// skipped; `None` if the key is absent or not a list.
    pub fn session_ids(&self, key: &str) -> Option<Vec<SessionId>> {
        let list = self.list_of(key)?;
        Some(
            list.iter()
                .filter_map(value_as_i64)
                .filter(|id| *id > 0)
                .map(|id| id as SessionId)
                .collect(),
        )
    }
}

fn value_as_i64(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_u64().map(|u| u.min(i64::MAX as u64) as i64))
        .or_else(|| v.as_f64().map(|f| f as i64))
}

fn value_as_u64(v: &Value) -> Option<u64> {
    v.as_u64()
        .or_else(|| v.as_i64().filter(|i| *i >= 0).map(|i| i as u64))
        .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}
