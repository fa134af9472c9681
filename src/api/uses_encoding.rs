//! Purpose: Pair a value with the `Encoding` that serializes it.
//! Exports: `UsesEncoding`.
//! Role: Lets a value travel as a self-encoding unit, including inside `#[derive(Serialize)]` types.
//! Invariants: Serialization always goes through the held encoding, never the value's own impl.

use std::ops::Deref;

use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::Value;

use crate::api::encoding::{Encoding, encode_value};
use crate::core::error::Error;

#[derive(Clone, Debug)]
pub struct UsesEncoding<T: 'static> {
    value: T,
    encoding: Encoding<T>,
}

impl<T: 'static> UsesEncoding<T> {
    pub fn new(value: T, encoding: Encoding<T>) -> Self {
        Self { value, encoding }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn encoding(&self) -> &Encoding<T> {
        &self.encoding
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        encode_value(&self.value, &self.encoding)
    }
}

impl<T: 'static> Deref for UsesEncoding<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: 'static> Serialize for UsesEncoding<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}
