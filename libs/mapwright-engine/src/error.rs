use mapwright_api::error::{ErrorKind, MapperError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(String),

    #[error("mapper error: {0}")]
    Mapper(#[from] MapperError),

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("schema '{0}' is declared more than once")]
    DuplicateSchema(String),

    #[error("cyclic schema reference: {}", .0.join(" -> "))]
    CyclicSchema(Vec<String>),

    #[error("transform not found: {0}")]
    TransformNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Add context to the error.
    ///
    /// For `Mapper` variant, context is added to the inner `MapperError`.
    /// For message variants, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            EngineError::Mapper(e) => EngineError::Mapper(e.with_context(ctx)),
            EngineError::Config(msg) => EngineError::Config(format!("{ctx}: {msg}")),
            EngineError::SchemaNotFound(msg) => EngineError::SchemaNotFound(format!("{ctx}: {msg}")),
            other => other,
        }
    }

    /// Malformed override or catalog.
    pub fn is_config(&self) -> bool {
        match self {
            EngineError::Config(_) => true,
            EngineError::Mapper(e) => e.kind() == ErrorKind::Config,
            _ => false,
        }
    }

    /// Override combination the aggregator refuses to resolve.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, EngineError::Mapper(e) if e.kind() == ErrorKind::Unsupported)
    }
}
