//! Purpose: Host serialization runtime boundary: raw blob <-> document tree.
//! Exports: `Format`, `JsonFormat`.
//! Role: The only place raw bytes are parsed or produced; drivers stay format-agnostic.
//! Invariants: Parse failures surface as `ErrorKind::Parse` with a category hint.
//! Invariants: Rendering preserves mapping field order.

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};
use crate::json::parse;

pub trait Format {
    fn parse(&self, input: &[u8]) -> Result<Value, Error>;

    fn render(&self, value: &Value) -> Result<Vec<u8>, Error>;
}

impl<F: Format + ?Sized> Format for &F {
    fn parse(&self, input: &[u8]) -> Result<Value, Error> {
        (**self).parse(input)
    }

    fn render(&self, value: &Value) -> Result<Vec<u8>, Error> {
        (**self).render(value)
    }
}

/// JSON via `serde_json`; compact output unless `pretty` is set.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct JsonFormat {
    pretty: bool,
}

impl JsonFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Format for JsonFormat {
    fn parse(&self, input: &[u8]) -> Result<Value, Error> {
        parse::from_slice(input).map_err(|err| {
            let category = parse::categorize_error(&err);
            Error::new(ErrorKind::Parse)
                .with_message(format!("invalid JSON document ({})", category.as_str()))
                .with_hint(parse::hint_for_error(&err, "document"))
                .with_source(err)
        })
    }

    fn render(&self, value: &Value) -> Result<Vec<u8>, Error> {
        let rendered = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        rendered.map_err(|err| {
            Error::new(ErrorKind::WriteFailure)
                .with_message("failed to render JSON document")
                .with_source(err)
        })
    }
}
