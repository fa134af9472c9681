//! Purpose: Define the public Rust API boundary for the coding combinators.
//! Exports: `Decoding`, `Encoding`, zip family, drivers, handles, keys, errors, formats.
//! Role: Public, additive-only surface; callers should not need `core` paths directly.
//! Invariants: Drivers default to compact JSON; other formats plug in via `Format`.
//! Invariants: Everything exported here is `Send + Sync` when its type parameters allow it.

mod decoding;
mod encoding;
mod uses_encoding;
mod zip;

pub use crate::core::decoder::{Decoder, KeyedDecoder, SingleValueDecoder, UnkeyedDecoder};
pub use crate::core::encoder::{Encoder, KeyedEncoder, SingleValueEncoder, UnkeyedEncoder};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::format::{Format, JsonFormat};
pub use crate::core::key::{CodingKey, CodingPath, PathSegment};
pub use decoding::{Decoding, decode, decode_value, decode_with};
pub use encoding::{Encoding, encode, encode_to_string, encode_value, encode_with};
pub use uses_encoding::UsesEncoding;
pub use zip::{Zip, ZipWith, zip, zip_with};
