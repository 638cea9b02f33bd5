use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Unknown breakpoint: {0}")]
    UnknownBreakpoint(String),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Invalid value for property `{key}`: {message}")]
    InvalidProperty { key: String, message: String },

    #[error("Zone `{zone}` points at missing root node {root_id}")]
    MissingZoneRoot { zone: String, root_id: String },

    #[error("Zone root {0} is listed as a child of another node")]
    ZoneRootHasParent(String),

    #[error("Node {parent} references missing child {child}")]
    DanglingChild { parent: String, child: String },

    #[error("Leaf node {0} has children")]
    LeafWithChildren(String),

    #[error("Node {child} is a child of both {first} and {second}")]
    SharedChild {
        child: String,
        first: String,
        second: String,
    },

    #[error("Node key {key} does not match node id {id}")]
    KeyMismatch { key: String, id: String },
}

impl SchemaError {
    pub fn invalid_property(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProperty {
            key: key.into(),
            message: message.into(),
        }
    }
}
