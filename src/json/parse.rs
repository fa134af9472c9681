//! Purpose: Provide the internal JSON decode entrypoint and parse-failure categorization.
//! Exports: `from_slice`, `ParseFailureCategory`, `categorize_error`, `categorize_message`, `hint_for_error`.
//! Role: Parser boundary so format code never inspects serde_json errors ad hoc.
//! Invariants: Categories are stable labels; unknown failures map to `Unknown`, never panic.
//! Invariants: Hints never echo the input payload.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

pub(crate) fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(input)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    Eof,
    Utf8,
    NumericRange,
    DepthLimit,
    Unknown,
}

impl ParseFailureCategory {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ParseFailureCategory::Syntax => "syntax",
            ParseFailureCategory::Eof => "eof",
            ParseFailureCategory::Utf8 => "utf8",
            ParseFailureCategory::NumericRange => "numeric-range",
            ParseFailureCategory::DepthLimit => "depth-limit",
            ParseFailureCategory::Unknown => "unknown",
        }
    }
}

pub(crate) fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match categorize_message(&err.to_string()) {
        ParseFailureCategory::Unknown => match err.classify() {
            Category::Eof => ParseFailureCategory::Eof,
            Category::Syntax => ParseFailureCategory::Syntax,
            Category::Io | Category::Data => ParseFailureCategory::Unknown,
        },
        category => category,
    }
}

pub(crate) fn categorize_message(message: &str) -> ParseFailureCategory {
    let message = message.to_ascii_lowercase();
    if message.contains("recursion limit") {
        ParseFailureCategory::DepthLimit
    } else if message.contains("number out of range") {
        ParseFailureCategory::NumericRange
    } else if message.contains("utf-8")
        || message.contains("utf8")
        || message.contains("unicode code point")
    {
        ParseFailureCategory::Utf8
    } else {
        ParseFailureCategory::Unknown
    }
}

pub(crate) fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    let category = categorize_error(err);
    let advice = match category {
        ParseFailureCategory::Syntax => "Check for a missing value, comma, or bracket.",
        ParseFailureCategory::Eof => "Input ended early; the document may be truncated.",
        ParseFailureCategory::Utf8 => "Input must be valid UTF-8 JSON.",
        ParseFailureCategory::NumericRange => "A number does not fit a 64-bit float.",
        ParseFailureCategory::DepthLimit => "Reduce nesting depth.",
        ParseFailureCategory::Unknown => "Validate the document with a JSON linter.",
    };
    format!(
        "parse category: {}; context: {context}; line {} column {}. {advice}",
        category.as_str(),
        err.line(),
        err.column()
    )
}
