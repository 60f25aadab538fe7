//! Camera and view frustum.
//!
//! The camera only exists to produce view-projection matrices; the
//! frustum planes extracted from them are the kernel's uniform input.

/// Core camera struct and view-projection construction.
pub mod core;
/// View frustum planes and the box intersection test.
pub mod frustum;

pub use self::core::Camera;
pub use frustum::{Containment, Frustum, FrustumPlane};
