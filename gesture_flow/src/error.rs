//! Boundary errors.
//!
//! Nothing inside the gesture pipeline fails: a missing hand is `none`, an
//! unmatched pose is `none`, an out-of-order completion is ignored.  The
//! errors below only surface where untrusted data enters — landmark arrays
//! from an inference collaborator and tuning files from disk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Landmark frame must hold {expected} points, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Landmark {index} has a non-finite coordinate")]
    NonFiniteLandmark { index: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

pub type FlowResult<T> = Result<T, FlowError>;
