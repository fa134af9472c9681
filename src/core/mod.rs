//! Purpose: Container capability behind the combinators.
//! Exports: `decoder`, `encoder`, `error`, `format`, `key`.
//! Role: Document handles, keys, errors, and the host format boundary.
//! Invariants: Nothing here knows about `Decoding`/`Encoding`; `api` builds on top.
pub mod decoder;
pub mod encoder;
pub mod error;
mod finite;
pub mod format;
pub mod key;
