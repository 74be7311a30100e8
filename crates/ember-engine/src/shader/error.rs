use std::path::PathBuf;

use thiserror::Error;

use super::program::ShaderStage;
use crate::device::DriverError;

/// Error taxonomy for shader loading and program building.
///
/// Every variant is fatal to the build that produced it; there is no
/// partial-success mode anywhere in this pipeline.
#[derive(Debug, Error)]
pub enum ShaderError {
    /// The bundle file could not be opened or read.
    #[error("failed to read shader bundle {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source line appeared before any `#shader` directive, so it has no
    /// section to land in.
    #[error("source line {line} precedes any #shader directive")]
    UnassignedLine { line: usize },

    /// One stage failed to parse or validate. `log` holds the full
    /// diagnostic with source context.
    #[error("{stage} stage failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },

    /// The two stages declare conflicting resources, or a resource the
    /// pipeline layout cannot express.
    #[error("link failed: {reason}")]
    Link { reason: String },

    /// A uniform required by the caller does not exist in the linked
    /// program.
    #[error("uniform {name:?} not found in linked program")]
    MissingUniform { name: String },

    /// A uniform exists but its declared size does not match the value
    /// being written.
    #[error("uniform {name:?} holds {size} bytes, expected {expected}")]
    UniformMismatch { name: String, size: u64, expected: u64 },

    /// The driver rejected a module, buffer, or pipeline creation call.
    #[error(transparent)]
    Driver(#[from] DriverError),
}
