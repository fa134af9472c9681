use std::error::Error as StdError;
use std::fmt;

use crate::core::key::CodingPath;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    TypeMismatch,
    KeyNotFound,
    ContainerExhausted,
    ValueAbsent,
    ValueNull,
    WriteFailure,
    Parse,
    Usage,
    Io,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::KeyNotFound => "KeyNotFound",
            ErrorKind::ContainerExhausted => "ContainerExhausted",
            ErrorKind::ValueAbsent => "ValueAbsent",
            ErrorKind::ValueNull => "ValueNull",
            ErrorKind::WriteFailure => "WriteFailure",
            ErrorKind::Parse => "Parse",
            ErrorKind::Usage => "Usage",
            ErrorKind::Io => "Io",
            ErrorKind::Internal => "Internal",
        }
    }
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    path: Option<String>,
    hint: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            path: None,
            hint: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Rendered coding path of the position that failed (`$.user.tags[2]`).
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_path(mut self, path: &CodingPath) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.as_str())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {path})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Parse => 3,
        ErrorKind::TypeMismatch => 4,
        ErrorKind::KeyNotFound => 5,
        ErrorKind::ContainerExhausted => 6,
        ErrorKind::ValueNull => 7,
        ErrorKind::ValueAbsent => 8,
        ErrorKind::WriteFailure => 9,
        ErrorKind::Io => 10,
    }
}
