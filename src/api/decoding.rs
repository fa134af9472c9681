//! Purpose: Define `Decoding<T>`, its combinators, built-in factories, and decode drivers.
//! Exports: `Decoding`, `decode`, `decode_with`, `decode_value`.
//! Role: Covariant half of the combinator algebra: "how to obtain a T from a decoder handle".
//! Invariants: A built `Decoding` is immutable and shareable; each run uses its own handle.
//! Invariants: Combinators propagate the first failure unchanged; `map` never adds failures.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::core::decoder::Decoder;
use crate::core::error::Error;
use crate::core::format::{Format, JsonFormat};
use crate::core::key::CodingKey;

type DecodeFn<T> = dyn Fn(&mut Decoder<'_>) -> Result<T, Error> + Send + Sync;

/// A way of decoding a single value of type `T`.
pub struct Decoding<T> {
    decode: Arc<DecodeFn<T>>,
}

impl<T> Clone for Decoding<T> {
    fn clone(&self) -> Self {
        Self {
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for Decoding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decoding<{}>", std::any::type_name::<T>())
    }
}

impl<T: 'static> Decoding<T> {
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&mut Decoder<'_>) -> Result<T, Error> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }

    pub fn decode(&self, decoder: &mut Decoder<'_>) -> Result<T, Error> {
        (self.decode)(decoder)
    }

    pub fn map<U, F>(self, transform: F) -> Decoding<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Decoding::new(move |decoder| self.decode(decoder).map(&transform))
    }

    /// Runs this decoding against the field `key` of a mapping container.
    pub fn nested<K>(self, key: K) -> Self
    where
        K: CodingKey + Send + Sync + 'static,
    {
        Decoding::new(move |decoder| {
            let mut field = decoder.keyed()?.nested_decoder(&key)?;
            self.decode(&mut field)
        })
    }

    /// Like [`Decoding::nested`], but an absent or null field yields `None`.
    pub fn optional_nested<K>(self, key: K) -> Decoding<Option<T>>
    where
        K: CodingKey + Send + Sync + 'static,
    {
        Decoding::new(move |decoder| match decoder.keyed()?.nested_decoder_if_present(&key) {
            Some(mut field) => self.decode(&mut field).map(Some),
            None => Ok(None),
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Decoding<Option<T>> {
    /// Substitutes `default` when the decoded value is absent.
    pub fn replace_nil(self, default: T) -> Decoding<T> {
        self.map(move |value| value.unwrap_or_else(|| default.clone()))
    }
}

impl<E: 'static> Decoding<Vec<E>> {
    /// Decodes every element of a sequence container with `element`, in order.
    pub fn array_of(element: Decoding<E>) -> Self {
        Decoding::new(move |decoder| {
            let mut items = decoder.unkeyed()?;
            let mut values = Vec::with_capacity(items.remaining());
            while !items.is_at_end() {
                let mut item = items.element_decoder()?;
                values.push(element.decode(&mut item)?);
            }
            Ok(values)
        })
    }
}

impl<T: DeserializeOwned + 'static> Decoding<T> {
    /// Reads the whole current position as a `T`.
    pub fn single_value() -> Self {
        Decoding::new(|decoder| decoder.single_value().decode())
    }

    /// Reads the next element of a sequence container.
    pub fn unkeyed() -> Self {
        Decoding::new(|decoder| decoder.unkeyed()?.decode())
    }

    /// Reads the field `key` of a mapping container.
    pub fn with_key<K>(key: K) -> Self
    where
        K: CodingKey + Send + Sync + 'static,
    {
        Decoding::new(move |decoder| decoder.keyed()?.decode(&key))
    }

    /// `None` when the sequence is exhausted or the next element is null.
    pub fn optional_unkeyed() -> Decoding<Option<T>> {
        Decoding::new(|decoder| decoder.unkeyed()?.decode_if_present())
    }

    /// `None` when `key` is absent or null.
    pub fn optional_with_key<K>(key: K) -> Decoding<Option<T>>
    where
        K: CodingKey + Send + Sync + 'static,
    {
        Decoding::new(move |decoder| decoder.keyed()?.decode_if_present(&key))
    }
}

/// Decodes a JSON blob using `decoding`.
pub fn decode<T: 'static>(input: &[u8], decoding: &Decoding<T>) -> Result<T, Error> {
    decode_with(&JsonFormat::new(), input, decoding)
}

pub fn decode_with<F, T>(format: &F, input: &[u8], decoding: &Decoding<T>) -> Result<T, Error>
where
    F: Format + ?Sized,
    T: 'static,
{
    debug!(bytes = input.len(), "decoding document");
    let root = format.parse(input).inspect_err(|err| {
        debug!(kind = err.kind().as_str(), "document parse failed");
    })?;
    decode_value(&root, decoding)
}

/// Runs `decoding` against an already parsed document.
pub fn decode_value<T: 'static>(root: &Value, decoding: &Decoding<T>) -> Result<T, Error> {
    let mut decoder = Decoder::new(root);
    decoding.decode(&mut decoder).inspect_err(|err| {
        debug!(
            kind = err.kind().as_str(),
            path = err.path().unwrap_or("$"),
            "decode failed"
        );
    })
}
