//! GPU resource management and the wgpu cull backend.
//!
//! Provides headless device initialization, growable storage buffers,
//! shader composition, and [`culler::GpuCuller`].

/// wgpu compute backend for the cull kernel.
pub mod culler;
/// Headless wgpu device and queue initialization.
pub mod compute_context;
/// Growable GPU buffers with automatic reallocation.
pub mod dynamic_buffer;
/// Shared wgpu boilerplate helpers for compute pipelines.
pub mod pipeline_helpers;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;

pub use compute_context::{ComputeContext, ComputeContextError};
pub use culler::{CullUniforms, GpuCuller};
