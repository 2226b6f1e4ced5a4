use thiserror::Error;

/// Errors returned by tree construction, insertion and subdivision.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Point ({x}, {y}) lies outside the node rectangle")]
    OutOfBounds { x: f64, y: f64 },

    #[error("Only leaf nodes can be subdivided")]
    InvalidState,

    #[error("Invalid rectangle: {0}")]
    InvalidRectangle(String),

    #[error("Cannot build a tree from zero points")]
    EmptyInput,

    #[error("Leaf capacity must be at least 1")]
    InvalidCapacity,

    #[error("Unknown node id: {0}")]
    UnknownNode(i32),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading a [`Config`](crate::Config).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
