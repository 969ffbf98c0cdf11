/// Convenience result type used across the filter graph.
pub type GraphResult<T> = Result<T, GraphError>;

/// Error taxonomy for graph construction, rendering and rehydration.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    /// A caller-supplied value is unusable (zero-sized buffer, zero tile size, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A node handle does not resolve in the graph it was used with.
    #[error("unknown node: {0}")]
    UnknownNode(u32),

    /// Persisted data names something this build does not know about.
    ///
    /// This is data corruption or a programming error; callers must not retry.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// Failures while filling rasters.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GraphError {
    /// Build a [`GraphError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Build a [`GraphError::Corrupt`] value.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }

    /// Build a [`GraphError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`GraphError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
