//! Errors that abort a layout call.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither a parent scope nor explicit roots were given.
    #[error("layout needs a parent scope or at least one explicit root")]
    MissingInput,

    /// The adapter reported no bounds for a vertex of the hierarchy.
    #[error("vertex {vertex} has no geometry")]
    MissingGeometry { vertex: String },

    /// `LayoutOptions` JSON could not be parsed.
    #[error("invalid layout options: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
