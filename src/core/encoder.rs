//! Purpose: Write-side container capability accumulating a document tree.
//! Exports: `Encoder`, `SingleValueEncoder`, `UnkeyedEncoder`, `KeyedEncoder`.
//! Role: The handle every `Encoding` writes into; one handle per document position.
//! Invariants: Container acquisition is idempotent per position: asking twice for a mapping
//! (or a sequence) returns the one already written there, so sibling writers share it.
//! Invariants: A position never silently changes shape; conflicting writes are `WriteFailure`.
//! Invariants: Mapping field order is write order.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

use crate::core::decoder::describe;
use crate::core::error::{Error, ErrorKind};
use crate::core::finite::find_non_finite;
use crate::core::key::{CodingKey, CodingPath};

#[derive(Debug)]
pub struct Encoder<'a> {
    slot: &'a mut Option<Value>,
    path: CodingPath,
}

impl<'a> Encoder<'a> {
    /// Handle writing into `slot`; `None` means nothing has been written yet.
    pub fn new(slot: &'a mut Option<Value>) -> Self {
        Self::at(slot, CodingPath::root())
    }

    fn at(slot: &'a mut Option<Value>, path: CodingPath) -> Self {
        Self { slot, path }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn single_value(&mut self) -> SingleValueEncoder<'_> {
        SingleValueEncoder {
            slot: &mut *self.slot,
            path: &self.path,
        }
    }

    pub fn unkeyed(&mut self) -> Result<UnkeyedEncoder<'_>, Error> {
        if self.slot.is_none() {
            trace!(path = %self.path, "opening unkeyed container");
        }
        match self.slot.get_or_insert_with(|| Value::Array(Vec::new())) {
            Value::Array(items) => Ok(UnkeyedEncoder {
                items,
                path: &self.path,
            }),
            other => Err(conflict(other, "a sequence", &self.path)),
        }
    }

    pub fn keyed(&mut self) -> Result<KeyedEncoder<'_>, Error> {
        if self.slot.is_none() {
            trace!(path = %self.path, "opening keyed container");
        }
        match self.slot.get_or_insert_with(|| Value::Object(Map::new())) {
            Value::Object(map) => Ok(KeyedEncoder {
                map,
                path: &self.path,
            }),
            other => Err(conflict(other, "a mapping", &self.path)),
        }
    }
}

#[derive(Debug)]
pub struct SingleValueEncoder<'e> {
    slot: &'e mut Option<Value>,
    path: &'e CodingPath,
}

impl SingleValueEncoder<'_> {
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let value = to_value(value, self.path)?;
        self.store(value)
    }

    pub fn encode_nil(&mut self) -> Result<(), Error> {
        self.store(Value::Null)
    }

    fn store(&mut self, value: Value) -> Result<(), Error> {
        if let Some(existing) = self.slot.as_ref() {
            return Err(Error::new(ErrorKind::WriteFailure)
                .with_message(format!(
                    "position already holds {}; a single value can be written once",
                    describe(existing)
                ))
                .with_path(self.path));
        }
        *self.slot = Some(value);
        Ok(())
    }
}

#[derive(Debug)]
pub struct UnkeyedEncoder<'e> {
    items: &'e mut Vec<Value>,
    path: &'e CodingPath,
}

impl UnkeyedEncoder<'_> {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let value = to_value(value, &self.path.index(self.items.len()))?;
        self.items.push(value);
        Ok(())
    }

    pub fn encode_nil(&mut self) -> Result<(), Error> {
        self.items.push(Value::Null);
        Ok(())
    }

    /// Runs `write` against a handle for the next element and appends exactly one element.
    ///
    /// An element `write` left empty is stored as null, so later indices never shift.
    pub fn nested_element<F>(&mut self, write: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Encoder<'_>) -> Result<(), Error>,
    {
        let mut slot = None;
        let path = self.path.index(self.items.len());
        write(&mut Encoder::at(&mut slot, path))?;
        self.items.push(slot.unwrap_or(Value::Null));
        Ok(())
    }
}

#[derive(Debug)]
pub struct KeyedEncoder<'e> {
    map: &'e mut Map<String, Value>,
    path: &'e CodingPath,
}

impl KeyedEncoder<'_> {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn contains<K: CodingKey + ?Sized>(&self, key: &K) -> bool {
        self.map.contains_key(key.string_value().as_ref())
    }

    /// Writes `value` under `key`; a repeated key keeps its position and takes the last value.
    pub fn encode<K, T>(&mut self, key: &K, value: &T) -> Result<(), Error>
    where
        K: CodingKey + ?Sized,
        T: Serialize + ?Sized,
    {
        let name = key.string_value().into_owned();
        let value = to_value(value, &self.path.key(name.as_str()))?;
        self.map.insert(name, value);
        Ok(())
    }

    pub fn encode_nil<K: CodingKey + ?Sized>(&mut self, key: &K) -> Result<(), Error> {
        self.map.insert(key.string_value().into_owned(), Value::Null);
        Ok(())
    }

    /// Runs `write` against a handle for the field `key`.
    ///
    /// The handle starts from whatever is already stored under `key`, so several nested
    /// writers targeting the same key extend one shared container. The field is only
    /// created if something was written.
    pub fn nested<K, F>(&mut self, key: &K, write: F) -> Result<(), Error>
    where
        K: CodingKey + ?Sized,
        F: FnOnce(&mut Encoder<'_>) -> Result<(), Error>,
    {
        let name = key.string_value().into_owned();
        let mut slot = self.map.get_mut(name.as_str()).map(std::mem::take);
        let path = self.path.key(name.as_str());
        let result = write(&mut Encoder::at(&mut slot, path));
        if let Some(value) = slot {
            self.map.insert(name, value);
        }
        result
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T, path: &CodingPath) -> Result<Value, Error> {
    let serialized = serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::WriteFailure)
            .with_message(err.to_string())
            .with_path(path)
            .with_source(err)
    })?;
    // serde_json renders NaN and infinities as null.
    if contains_null(&serialized) {
        if let Some(found) = find_non_finite(value) {
            return Err(Error::new(ErrorKind::WriteFailure)
                .with_message(format!("cannot encode non-finite float {found}"))
                .with_path(path)
                .with_hint("JSON has no NaN or infinity; map such values to null or a sentinel first."));
        }
    }
    Ok(serialized)
}

fn contains_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().any(contains_null),
        Value::Object(map) => map.values().any(contains_null),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => false,
    }
}

fn conflict(existing: &Value, requested: &str, path: &CodingPath) -> Error {
    Error::new(ErrorKind::WriteFailure)
        .with_message(format!(
            "cannot open {requested}: position already holds {}",
            describe(existing)
        ))
        .with_path(path)
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn keyed_acquisition_is_idempotent() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        encoder.keyed().expect("map").encode("a", &1).expect("a");
        encoder.keyed().expect("map").encode("b", &2).expect("b");
        assert_eq!(slot, Some(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn unkeyed_acquisition_appends() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        encoder.unkeyed().expect("seq").encode(&1).expect("1");
        let mut items = encoder.unkeyed().expect("seq");
        items.encode_nil().expect("nil");
        assert_eq!(items.count(), 2);
        assert_eq!(slot, Some(json!([1, null])));
    }

    #[test]
    fn shape_conflicts_are_write_failures() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        encoder.unkeyed().expect("seq");
        let err = encoder.keyed().expect_err("conflict");
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
        assert_eq!(
            err.message(),
            Some("cannot open a mapping: position already holds a sequence")
        );

        let err = encoder.single_value().encode(&1).expect_err("twice");
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
        assert_eq!(err.path(), Some("$"));
    }

    #[test]
    fn nested_fields_merge_into_one_container() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        encoder
            .keyed()
            .expect("root")
            .nested("user", |user| user.keyed()?.encode("name", "ada"))
            .expect("name");
        encoder
            .keyed()
            .expect("root")
            .nested("user", |user| user.keyed()?.encode("id", &7))
            .expect("id");
        assert_eq!(slot, Some(json!({"user": {"name": "ada", "id": 7}})));
    }

    #[test]
    fn empty_nested_writes_leave_no_trace() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        let mut fields = encoder.keyed().expect("root");
        fields.nested("skipped", |_| Ok(())).expect("nested");
        assert!(fields.is_empty());
    }

    #[test]
    fn empty_elements_keep_their_index() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        let mut items = encoder.unkeyed().expect("seq");
        items.encode(&1).expect("first");
        items.nested_element(|_| Ok(())).expect("empty");
        items
            .nested_element(|element| {
                assert_eq!(element.coding_path().to_string(), "$[2]");
                element.single_value().encode(&3)
            })
            .expect("third");
        assert_eq!(slot, Some(json!([1, null, 3])));
    }

    #[test]
    fn non_finite_floats_are_write_failures() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        let err = encoder
            .keyed()
            .expect("map")
            .encode("x", &f64::INFINITY)
            .expect_err("infinity");
        assert_eq!(err.kind(), ErrorKind::WriteFailure);
        assert_eq!(err.path(), Some("$.x"));
        assert_eq!(err.message(), Some("cannot encode non-finite float inf"));
        assert!(encoder.keyed().expect("map").is_empty());

        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        encoder
            .single_value()
            .encode(&Option::<f64>::None)
            .expect("absent float is plain null");
        assert_eq!(slot, Some(json!(null)));
    }

    #[test]
    fn nested_element_paths_are_indexed() {
        let mut slot = None;
        let mut encoder = Encoder::new(&mut slot);
        let mut items = encoder.unkeyed().expect("seq");
        items.encode(&0).expect("first");
        items
            .nested_element(|element| {
                assert_eq!(element.coding_path().to_string(), "$[1]");
                element.single_value().encode("x")
            })
            .expect("second");
        assert_eq!(slot, Some(json!([0, "x"])));
    }
}
