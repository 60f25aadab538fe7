// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU frustum culling with atomic stream compaction, built on wgpu.
//!
//! Given per-instance transforms and six frustum planes, the cull kernel
//! decides which instances may be visible and packs their indices into a
//! dense array. The visible count lands in the `instance_count` field of an
//! indexed indirect-draw argument block, ready to drive a draw call.
//!
//! # Key entry points
//!
//! - [`camera::Frustum`] - the six planes and the box test
//! - [`cull::Culler`] - the backend seam; [`cull::CpuCuller`] runs lanes on
//!   the rayon pool, [`gpu::GpuCuller`] dispatches a WGSL compute shader
//! - [`cull::InstanceRecord`] / [`cull::DrawIndexedIndirectArgs`] - the
//!   buffer layouts shared with the shader
//! - [`options::Options`] - kernel constants and backend choice, TOML-backed
//!
//! # Host contract
//!
//! Culling never reports failures from inside the kernel. The host must zero
//! the counter before each dispatch, size the visible-index array for the
//! worst case, and keep the instance count within the records it uploads.
//! Both backends do all three and check the preconditions with
//! [`cull::validate`] before dispatching.

pub mod backend;
pub mod camera;
pub mod cull;
pub mod error;
pub mod gpu;
pub mod options;
pub mod scene;
