/// Convenience result type used across cueflow.
pub type CueflowResult<T> = Result<T, CueflowError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum CueflowError {
    /// Invalid user-provided configuration or arguments.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operations issued against a scene or transition in the wrong
    /// lifecycle state.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// Errors while producing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from injected collaborators.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CueflowError {
    /// Build a [`CueflowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CueflowError::Lifecycle`] value.
    pub fn lifecycle(msg: impl Into<String>) -> Self {
        Self::Lifecycle(msg.into())
    }

    /// Build a [`CueflowError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
