use thiserror::Error;

/// Failures reported by a rendering surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("unknown node")]
    UnknownNode,

    #[error("surface error: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("unknown parent `{0}`")]
    UnknownParent(String),

    #[error("`Widget` `{0}` cannot be deployed without a `Layout` parent")]
    WidgetNeedsLayout(String),

    #[error("unknown widget `{0}`")]
    UnknownWidget(String),

    #[error("invalid value for `{name}`: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("malformed command: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
