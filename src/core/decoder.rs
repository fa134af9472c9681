//! Purpose: Read-side container capability over a parsed document tree.
//! Exports: `Decoder`, `SingleValueDecoder`, `UnkeyedDecoder`, `KeyedDecoder`.
//! Role: The handle every `Decoding` runs against; one handle per document position.
//! Invariants: Unkeyed reads on one handle share one sequence cursor, advanced only on success.
//! Invariants: "Key absent" (`KeyNotFound`) and "container exhausted" stay distinct from null.
//! Invariants: Every failure carries the coding path of the position that failed.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::trace;

use crate::core::error::{Error, ErrorKind};
use crate::core::key::{CodingKey, CodingPath};

#[derive(Debug)]
pub struct Decoder<'a> {
    node: &'a Value,
    path: CodingPath,
    cursor: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self::at(root, CodingPath::root())
    }

    fn at(node: &'a Value, path: CodingPath) -> Self {
        Self {
            node,
            path,
            cursor: 0,
        }
    }

    pub fn coding_path(&self) -> &CodingPath {
        &self.path
    }

    /// Views the whole current position as one value.
    pub fn single_value(&self) -> SingleValueDecoder<'_, 'a> {
        SingleValueDecoder {
            node: self.node,
            path: &self.path,
        }
    }

    /// Views the current position as an ordered sequence.
    pub fn unkeyed(&mut self) -> Result<UnkeyedDecoder<'_, 'a>, Error> {
        let node: &'a Value = self.node;
        let Value::Array(items) = node else {
            return Err(shape_error(node, "a sequence", &self.path));
        };
        trace!(path = %self.path, cursor = self.cursor, "unkeyed container");
        Ok(UnkeyedDecoder {
            items: items.as_slice(),
            cursor: &mut self.cursor,
            path: &self.path,
        })
    }

    /// Views the current position as a mapping of named fields.
    pub fn keyed(&self) -> Result<KeyedDecoder<'_, 'a>, Error> {
        let node: &'a Value = self.node;
        let Value::Object(map) = node else {
            return Err(shape_error(node, "a mapping", &self.path));
        };
        trace!(path = %self.path, "keyed container");
        Ok(KeyedDecoder {
            map,
            path: &self.path,
        })
    }
}

#[derive(Debug)]
pub struct SingleValueDecoder<'d, 'a> {
    node: &'a Value,
    path: &'d CodingPath,
}

impl SingleValueDecoder<'_, '_> {
    pub fn decode_nil(&self) -> bool {
        self.node.is_null()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        read(self.node, self.path)
    }
}

#[derive(Debug)]
pub struct UnkeyedDecoder<'d, 'a> {
    items: &'a [Value],
    cursor: &'d mut usize,
    path: &'d CodingPath,
}

impl<'a> UnkeyedDecoder<'_, 'a> {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn current_index(&self) -> usize {
        *self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(*self.cursor)
    }

    pub fn is_at_end(&self) -> bool {
        *self.cursor >= self.items.len()
    }

    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T, Error> {
        let (node, path) = self.current()?;
        let value = read(node, &path)?;
        *self.cursor += 1;
        Ok(value)
    }

    /// `None` when the sequence is exhausted or the next element is null.
    pub fn decode_if_present<T: DeserializeOwned>(&mut self) -> Result<Option<T>, Error> {
        if self.is_at_end() {
            return Ok(None);
        }
        if self.decode_nil()? {
            return Ok(None);
        }
        self.decode().map(Some)
    }

    /// Consumes the next element only when it is null.
    pub fn decode_nil(&mut self) -> Result<bool, Error> {
        let (node, _) = self.current()?;
        if node.is_null() {
            *self.cursor += 1;
            return Ok(true);
        }
        Ok(false)
    }

    /// Hands out a handle positioned on the next element and advances past it.
    pub fn element_decoder(&mut self) -> Result<Decoder<'a>, Error> {
        let (node, path) = self.current()?;
        *self.cursor += 1;
        Ok(Decoder::at(node, path))
    }

    fn current(&self) -> Result<(&'a Value, CodingPath), Error> {
        let index = *self.cursor;
        match self.items.get(index) {
            Some(node) => Ok((node, self.path.index(index))),
            None => Err(Error::new(ErrorKind::ContainerExhausted)
                .with_message(format!(
                    "sequence has {} element(s); no element at index {index}",
                    self.items.len()
                ))
                .with_path(self.path)),
        }
    }
}

#[derive(Debug)]
pub struct KeyedDecoder<'d, 'a> {
    map: &'a Map<String, Value>,
    path: &'d CodingPath,
}

impl<'a> KeyedDecoder<'_, 'a> {
    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        self.map.keys().map(String::as_str)
    }

    pub fn contains<K: CodingKey + ?Sized>(&self, key: &K) -> bool {
        self.map.contains_key(key.string_value().as_ref())
    }

    pub fn decode<T, K>(&self, key: &K) -> Result<T, Error>
    where
        T: DeserializeOwned,
        K: CodingKey + ?Sized,
    {
        let (node, path) = self.field(key)?;
        read(node, &path)
    }

    /// `None` when the key is absent or its value is null.
    pub fn decode_if_present<T, K>(&self, key: &K) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
        K: CodingKey + ?Sized,
    {
        let name = key.string_value();
        match self.map.get(name.as_ref()) {
            None | Some(Value::Null) => Ok(None),
            Some(node) => read(node, &self.path.key(name)).map(Some),
        }
    }

    pub fn decode_nil<K: CodingKey + ?Sized>(&self, key: &K) -> Result<bool, Error> {
        let (node, _) = self.field(key)?;
        Ok(node.is_null())
    }

    /// Handle positioned on the field `key`, for decoding nested structure.
    pub fn nested_decoder<K: CodingKey + ?Sized>(&self, key: &K) -> Result<Decoder<'a>, Error> {
        let (node, path) = self.field(key)?;
        Ok(Decoder::at(node, path))
    }

    pub fn nested_decoder_if_present<K: CodingKey + ?Sized>(&self, key: &K) -> Option<Decoder<'a>> {
        let name = key.string_value();
        match self.map.get(name.as_ref()) {
            None | Some(Value::Null) => None,
            Some(node) => Some(Decoder::at(node, self.path.key(name))),
        }
    }

    fn field<K: CodingKey + ?Sized>(&self, key: &K) -> Result<(&'a Value, CodingPath), Error> {
        let name = key.string_value();
        match self.map.get(name.as_ref()) {
            Some(node) => Ok((node, self.path.key(name))),
            None => Err(Error::new(ErrorKind::KeyNotFound)
                .with_message(format!("key `{name}` not found"))
                .with_path(self.path)),
        }
    }
}

fn read<T: DeserializeOwned>(node: &Value, path: &CodingPath) -> Result<T, Error> {
    T::deserialize(node).map_err(|err| {
        let kind = if node.is_null() {
            ErrorKind::ValueNull
        } else {
            ErrorKind::TypeMismatch
        };
        Error::new(kind)
            .with_message(err.to_string())
            .with_path(path)
            .with_source(err)
    })
}

fn shape_error(node: &Value, expected: &str, path: &CodingPath) -> Error {
    let kind = if node.is_null() {
        ErrorKind::ValueNull
    } else {
        ErrorKind::TypeMismatch
    };
    Error::new(kind)
        .with_message(format!("expected {expected}, found {}", describe(node)))
        .with_path(path)
}

pub(crate) fn describe(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
