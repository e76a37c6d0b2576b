//! Record capability interfaces
//!
//! The crate never depends on a concrete record type. A host adapts its own
//! models by implementing [`Record`] (and [`Presentable`] for forms).

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Read access to a record by accessor name
pub trait Record {
    /// Read the value behind `accessor`.
    ///
    /// Returns `None` when the record has no such reader. Map-like records
    /// perform keyed lookup and return `Some(Value::Null)` for absent keys.
    fn read(&self, accessor: &str) -> Option<Value>;
}

/// A record that knows whether it has been persisted yet
pub trait Presentable: Record {
    fn is_new_record(&self) -> bool;
}

impl<R: Record + ?Sized> Record for &R {
    fn read(&self, accessor: &str) -> Option<Value> {
        (**self).read(accessor)
    }
}

impl<R: Presentable + ?Sized> Presentable for &R {
    fn is_new_record(&self) -> bool {
        (**self).is_new_record()
    }
}

impl Record for Map<String, Value> {
    fn read(&self, accessor: &str) -> Option<Value> {
        Some(self.get(accessor).cloned().unwrap_or(Value::Null))
    }
}

impl Record for HashMap<String, Value> {
    fn read(&self, accessor: &str) -> Option<Value> {
        Some(self.get(accessor).cloned().unwrap_or(Value::Null))
    }
}

impl Record for BTreeMap<String, Value> {
    fn read(&self, accessor: &str) -> Option<Value> {
        Some(self.get(accessor).cloned().unwrap_or(Value::Null))
    }
}

impl Record for Value {
    fn read(&self, accessor: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.read(accessor),
            _ => None,
        }
    }
}

/// JSON objects count as new until they carry a non-null `id`
impl Presentable for Map<String, Value> {
    fn is_new_record(&self) -> bool {
        self.get("id").is_none_or(Value::is_null)
    }
}

impl Presentable for Value {
    fn is_new_record(&self) -> bool {
        match self {
            Value::Object(map) => map.is_new_record(),
            _ => true,
        }
    }
}
