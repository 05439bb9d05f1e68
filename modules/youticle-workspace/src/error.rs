use thiserror::Error;

/// Workspace-level error taxonomy. Every variant is recoverable by retrying
/// the user action that produced it; the UI shows `to_string()` as a single
/// message replacing any prior one.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Invalid channel handle. Blocks submission before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A backend call failed. The message is the backend's `detail` field
    /// when parseable, else a fixed per-stage default.
    #[error("{0}")]
    Backend(String),

    /// An operation was attempted in a state that cannot support it.
    #[error("State error: {0}")]
    State(String),
}
