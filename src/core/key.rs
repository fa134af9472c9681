//! Purpose: Field identifiers for mapping containers and coding paths for error context.
//! Exports: `CodingKey`, `PathSegment`, `CodingPath`.
//! Role: Shared vocabulary of the read and write handles.
//! Invariants: Integer keys address fields by their decimal string form.
//! Invariants: Paths render as `$`, `$.user`, `$.tags[2]`.
use std::borrow::Cow;
use std::fmt;

/// A value usable as the field identifier of a mapping container.
///
/// Keys are string-backed on the wire; integer-backed keys render their decimal form.
/// Uniqueness of keys within one container is up to the caller.
pub trait CodingKey {
    fn string_value(&self) -> Cow<'_, str>;

    fn int_value(&self) -> Option<i64> {
        None
    }
}

impl CodingKey for str {
    fn string_value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl CodingKey for String {
    fn string_value(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<K: CodingKey + ?Sized> CodingKey for &K {
    fn string_value(&self) -> Cow<'_, str> {
        (**self).string_value()
    }

    fn int_value(&self) -> Option<i64> {
        (**self).int_value()
    }
}

macro_rules! int_coding_key {
    ($($ty:ty),*) => {
        $(
            impl CodingKey for $ty {
                fn string_value(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }

                fn int_value(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }
            }
        )*
    };
}

int_coding_key!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Position of a container view inside the document, root first.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CodingPath {
    segments: Vec<PathSegment>,
}

impl CodingPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(PathSegment::Key(key.into()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(PathSegment::Index(index))
    }

    fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
