use thiserror::Error;

use crate::lemming::ResourceKind;

/// Load-time failures. The per-tick simulation never returns these; they are
/// fatal to level start only.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Missing resource for {kind:?}: {path}")]
    MissingResource { kind: ResourceKind, path: String },

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, SimError>;
