//! Point-in-time field captures for one instrument.

use std::fmt;

/// Sentinel written to a daily file in place of a missing value.
pub const NA: &str = "NA";

/// Field added to every stored snapshot: seconds since the Unix epoch, UTC.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// A single value reported by a quote source.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Numeric value.
    Number(f64),
    /// Free-form text value.
    Text(String),
    /// Explicit null from the source.
    Null,
}

impl FieldValue {
    /// Render the value as a CSV cell, or `None` when it should be written as [`NA`].
    #[must_use]
    pub fn to_cell(&self) -> Option<String> {
        match self {
            Self::Number(n) if n.is_finite() => Some(n.to_string()),
            Self::Number(_) | Self::Null => None,
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
        }
    }

    /// Numeric view of the value, parsing text where possible.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Convert a scalar JSON value. Objects and arrays are not representable.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(Self::Null),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            serde_json::Value::Number(n) => n.as_f64().map(Self::Number),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_cell().as_deref().unwrap_or(NA))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for FieldValue {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Ordered field-to-value mapping captured by one quote source call.
///
/// Field order is the order in which keys were first inserted; re-inserting a key
/// replaces its value without moving it. The field set is not fixed between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    fields: Vec<(String, FieldValue)>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a snapshot from the scalar members of a JSON object, in object order.
    ///
    /// Nested objects and arrays are skipped.
    #[must_use]
    pub fn from_json_object(obj: &serde_json::Map<String, serde_json::Value>) -> Self {
        obj.iter()
            .filter_map(|(k, v)| FieldValue::from_json(v).map(|fv| (k.clone(), fv)))
            .collect()
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether the snapshot carries `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the snapshot has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The non-empty identifier stored under `field`, if any.
    #[must_use]
    pub fn identifier(&self, field: &str) -> Option<&str> {
        match self.get(field)? {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Set the capture time as the trailing [`TIMESTAMP_FIELD`].
    ///
    /// Any source-supplied value under the same name is replaced and moved to the end.
    pub fn stamp(&mut self, epoch_seconds: f64) {
        self.remove(TIMESTAMP_FIELD);
        self.fields
            .push((TIMESTAMP_FIELD.to_string(), FieldValue::Number(epoch_seconds)));
    }
}

impl<K, V> FromIterator<(K, V)> for Snapshot
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snap = Self::new();
        for (k, v) in iter {
            snap.insert(k, v);
        }
        snap
    }
}
