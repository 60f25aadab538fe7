//! Crate-level error types.

use std::fmt;

use crate::gpu::compute_context::ComputeContextError;

/// Errors produced by the cullpass crate.
#[derive(Debug)]
pub enum CullError {
    /// GPU context initialization failure.
    Gpu(ComputeContextError),
    /// The dispatch asked for more instances than were supplied.
    InstanceCount {
        /// Instance count the dispatch would cover.
        requested: u32,
        /// Records actually present in the instance array.
        available: usize,
    },
    /// The visible-index array cannot hold every instance.
    IndexCapacity {
        /// Worst-case visible count (the instance count).
        required: u32,
        /// Slots in the index array.
        capacity: usize,
    },
    /// Bounding extent is negative or not finite.
    InvalidExtent(f32),
    /// Built-in shader failed to compose or validate.
    Shader(String),
    /// Mapping a readback buffer failed.
    Readback(wgpu::BufferAsyncError),
    /// Waiting on the device failed.
    Poll(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for CullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::InstanceCount {
                requested,
                available,
            } => write!(
                f,
                "instance count {requested} exceeds the {available} records \
                 supplied"
            ),
            Self::IndexCapacity { required, capacity } => write!(
                f,
                "visible index array holds {capacity} slots but up to \
                 {required} instances may be visible"
            ),
            Self::InvalidExtent(extent) => {
                write!(f, "invalid bounding extent: {extent}")
            }
            Self::Shader(msg) => write!(f, "shader error: {msg}"),
            Self::Readback(e) => write!(f, "buffer readback failed: {e}"),
            Self::Poll(msg) => write!(f, "device poll failed: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for CullError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Readback(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ComputeContextError> for CullError {
    fn from(e: ComputeContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for CullError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<wgpu::BufferAsyncError> for CullError {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        Self::Readback(e)
    }
}
