//! Purpose: Composable `Decoding`/`Encoding` combinators over structured documents.
//! Exports: `api` (combinators, drivers, handles, errors) and `core` (container capability).
//! Role: Library backing the `coding` CLI; build codecs by composition instead of annotations.
//! Invariants: Built decodings/encodings are immutable values, reusable across documents.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
mod json;

pub use api::{
    CodingKey, Decoding, Encoding, Error, ErrorKind, UsesEncoding, decode, encode, zip, zip_with,
};
