//! Purpose: Define `Encoding<T>`, its combinators, built-in factories, and encode drivers.
//! Exports: `Encoding`, `encode`, `encode_with`, `encode_to_string`, `encode_value`.
//! Role: Contravariant half of the combinator algebra: "how to write a T into an encoder handle".
//! Invariants: A built `Encoding` is immutable and shareable; each run uses its own handle.
//! Invariants: `combine` runs sub-encodings in order against one value and one handle; since
//! container acquisition is idempotent, field writers targeting one mapping share it.
//! Invariants: `pullback` never adds failures; `optional`/`replace_nil` turn absence into a
//! no-op or a default, never into a failure.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::core::encoder::Encoder;
use crate::core::error::{Error, ErrorKind};
use crate::core::format::{Format, JsonFormat};
use crate::core::key::CodingKey;

type EncodeFn<T> = dyn Fn(&T, &mut Encoder<'_>) -> Result<(), Error> + Send + Sync;

/// A way of encoding a single value of type `T`.
pub struct Encoding<T> {
    encode: Arc<EncodeFn<T>>,
}

impl<T> Clone for Encoding<T> {
    fn clone(&self) -> Self {
        Self {
            encode: Arc::clone(&self.encode),
        }
    }
}

impl<T> fmt::Debug for Encoding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Encoding<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> Encoding<T> {
    pub fn new<F>(encode: F) -> Self
    where
        F: Fn(&T, &mut Encoder<'_>) -> Result<(), Error> + Send + Sync + 'static,
    {
        Self {
            encode: Arc::new(encode),
        }
    }

    pub fn encode(&self, value: &T, encoder: &mut Encoder<'_>) -> Result<(), Error> {
        (self.encode)(value, encoder)
    }

    /// Adapts this encoding to a `U` by projecting each `U` into a `T` first.
    ///
    /// The usual use is pulling a field encoding back along a property of a larger value.
    pub fn pullback<U, F>(self, transform: F) -> Encoding<U>
    where
        U: 'static,
        F: Fn(&U) -> T + Send + Sync + 'static,
    {
        Encoding::new(move |value, encoder| self.encode(&transform(value), encoder))
    }

    /// Writes nothing for `None`.
    pub fn optional(self) -> Encoding<Option<T>> {
        Encoding::new(move |value: &Option<T>, encoder| match value {
            Some(value) => self.encode(value, encoder),
            None => Ok(()),
        })
    }

    /// Writes `default` in place of `None`.
    pub fn replace_nil(self, default: T) -> Encoding<Option<T>>
    where
        T: Send + Sync,
    {
        Encoding::new(move |value: &Option<T>, encoder| {
            self.encode(value.as_ref().unwrap_or(&default), encoder)
        })
    }

    /// Runs every encoding, in order, against the same value and the same handle.
    pub fn combine<I>(encodings: I) -> Self
    where
        I: IntoIterator<Item = Encoding<T>>,
    {
        let encodings: Vec<Encoding<T>> = encodings.into_iter().collect();
        Encoding::new(move |value, encoder| {
            for encoding in &encodings {
                encoding.encode(value, encoder)?;
            }
            Ok(())
        })
    }

    /// `Encoding::combine([self, next])`.
    pub fn and(self, next: Encoding<T>) -> Self {
        Encoding::combine([self, next])
    }

    /// Nests this encoding's output under `key` of a mapping container.
    pub fn nested<K>(self, key: K) -> Self
    where
        K: CodingKey + Send + Sync + 'static,
    {
        Encoding::new(move |value, encoder| {
            encoder
                .keyed()?
                .nested(&key, |field| self.encode(value, field))
        })
    }

    /// Writes an explicit null as the whole value, ignoring the input.
    pub fn null_value() -> Self {
        Encoding::new(|_, encoder| encoder.single_value().encode_nil())
    }

    /// Writes an explicit null under `key`, ignoring the input.
    pub fn null_value_with_key<K>(key: K) -> Self
    where
        K: CodingKey + Send + Sync + 'static,
    {
        Encoding::new(move |_, encoder| encoder.keyed()?.encode_nil(&key))
    }

    /// Opens one sequence container and writes each element with `element`, in iteration order.
    pub fn array_of<E>(element: Encoding<E>) -> Self
    where
        E: 'static,
        for<'v> &'v T: IntoIterator<Item = &'v E>,
    {
        Encoding::new(move |values: &T, encoder| {
            let mut items = encoder.unkeyed()?;
            for value in values {
                items.nested_element(|item| element.encode(value, item))?;
            }
            Ok(())
        })
    }
}

impl<T: Serialize + 'static> Encoding<T> {
    /// Writes the value as the whole current position.
    pub fn single_value() -> Self {
        Encoding::new(|value, encoder| encoder.single_value().encode(value))
    }

    /// Appends the value to a sequence container.
    pub fn unkeyed() -> Self {
        Encoding::new(|value, encoder| encoder.unkeyed()?.encode(value))
    }

    /// Writes the value as the field `key` of a mapping container.
    pub fn with_key<K>(key: K) -> Self
    where
        K: CodingKey + Send + Sync + 'static,
    {
        Encoding::new(move |value, encoder| encoder.keyed()?.encode(&key, value))
    }
}

/// Encodes `value` to a compact JSON blob.
pub fn encode<T: 'static>(value: &T, encoding: &Encoding<T>) -> Result<Vec<u8>, Error> {
    encode_with(&JsonFormat::new(), value, encoding)
}

pub fn encode_with<F, T>(format: &F, value: &T, encoding: &Encoding<T>) -> Result<Vec<u8>, Error>
where
    F: Format + ?Sized,
    T: 'static,
{
    let root = encode_value(value, encoding)?;
    let output = format.render(&root)?;
    debug!(bytes = output.len(), "encoded document");
    Ok(output)
}

pub fn encode_to_string<T: 'static>(value: &T, encoding: &Encoding<T>) -> Result<String, Error> {
    let output = encode(value, encoding)?;
    String::from_utf8(output).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("rendered JSON is not UTF-8")
            .with_source(err)
    })
}

/// Runs `encoding` into a fresh document tree.
///
/// Fails with `ValueAbsent` if the encoding wrote nothing at the root.
pub fn encode_value<T: 'static>(value: &T, encoding: &Encoding<T>) -> Result<Value, Error> {
    let mut slot = None;
    encoding
        .encode(value, &mut Encoder::new(&mut slot))
        .inspect_err(|err| {
            debug!(
                kind = err.kind().as_str(),
                path = err.path().unwrap_or("$"),
                "encode failed"
            );
        })?;
    slot.ok_or_else(|| {
        Error::new(ErrorKind::ValueAbsent)
            .with_message("encoding wrote no top-level value")
            .with_hint("Optional encodings write nothing for absent values; use replace_nil or null_value to always emit one.")
    })
}
