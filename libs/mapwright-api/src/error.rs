use std::fmt;

/// Error kind for mapper errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Override is malformed (not a mapping, bad nested key).
    Config,
    /// Override is well-formed but the combination cannot be resolved.
    Unsupported,
    /// Schema metadata is inconsistent.
    Schema,
    /// A transform failed while remapping a value.
    Transform,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Unsupported => f.write_str("unsupported"),
            ErrorKind::Schema => f.write_str("schema"),
            ErrorKind::Transform => f.write_str("transform"),
        }
    }
}

/// Mapper error — returned by aggregation and override parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapperError {
    pub kind: ErrorKind,
    pub message: String,
}

impl MapperError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Config, message: msg.into() }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Unsupported, message: msg.into() }
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Schema, message: msg.into() }
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Transform, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for MapperError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for MapperError {}

impl From<serde_json::Error> for MapperError {
    fn from(e: serde_json::Error) -> Self {
        Self::config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_keeps_kind() {
        let err = MapperError::unsupported("two calls").with_context("field 'x'");
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert_eq!(err.message, "field 'x': two calls");
        assert_eq!(err.to_string(), "unsupported: field 'x': two calls");
    }
}
