//! View frustum for culling
//!
//! Holds the six clipping planes consumed by the cull kernel and the
//! box-versus-frustum test shared by the CPU and GPU backends.

use glam::{Mat4, Vec3, Vec4};

use crate::cull::PLANE_COUNT;

/// A plane in 3D space, stored as `(nx, ny, nz, d)`.
///
/// A point `p` lies on the inside when `dot(n, p) + d >= 0`. The kernel uses
/// the coefficients as given: a plane that is not unit-length (or not scaled
/// consistently with its siblings) biases the test without any error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrustumPlane {
    /// Normal pointing into the positive (inside) half-space.
    pub normal: [f32; 3],
    /// Signed offset `d`.
    pub d: f32,
}

impl FrustumPlane {
    /// Plane from a normal and signed offset, taken verbatim.
    #[must_use]
    pub fn new(normal: Vec3, d: f32) -> Self {
        Self {
            normal: normal.to_array(),
            d,
        }
    }

    /// Plane from raw `ax + by + cz + d` coefficients, without
    /// normalization.
    #[must_use]
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            normal: [a, b, c],
            d,
        }
    }

    /// Copy of this plane scaled so the normal has unit length. Degenerate
    /// planes collapse to zero, which every box passes.
    #[must_use]
    pub fn normalized(self) -> Self {
        let normal = Vec3::from_array(self.normal);
        let len = normal.length();
        if len > 0.0 {
            Self::new(normal / len, self.d / len)
        } else {
            Self::new(Vec3::ZERO, 0.0)
        }
    }

    /// Signed distance from point to plane (positive = inside)
    #[inline]
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        Vec3::from_array(self.normal).dot(point) + self.d
    }

    /// Half-extent of a cube with half-size `extent`, projected onto the
    /// plane normal. Only an upper bound for axis-aligned boxes.
    #[inline]
    #[must_use]
    pub fn projected_radius(&self, extent: f32) -> f32 {
        extent * Vec3::from_array(self.normal).abs().element_sum()
    }

    /// The plane as a `vec4` for GPU upload.
    #[must_use]
    pub fn to_vec4(self) -> Vec4 {
        Vec3::from_array(self.normal).extend(self.d)
    }
}

impl From<Vec4> for FrustumPlane {
    fn from(v: Vec4) -> Self {
        Self::from_coefficients(v.x, v.y, v.z, v.w)
    }
}

/// How an axis-aligned box sits relative to the frustum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Entirely on the negative side of at least one plane.
    Outside,
    /// Neither provably outside nor fully inside.
    Intersecting,
    /// Strictly inside every plane (`distance > radius` for all six).
    Inside,
}

/// View frustum consisting of 6 planes
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six clipping planes: left, right, bottom, top, near, far.
    pub planes: [FrustumPlane; PLANE_COUNT],
}

impl Frustum {
    /// Frustum from six planes, used exactly as given.
    #[must_use]
    pub fn from_planes(planes: [FrustumPlane; PLANE_COUNT]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix.
    /// Uses the Gribb/Hartmann method for plane extraction.
    /// Planes point inward and are normalized before they are stored.
    #[must_use]
    pub fn from_view_projection(vp: Mat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        // [0,1] depth range (wgpu/Vulkan/D3D): near plane is just row2
        let rows = [
            row3 + row0,
            row3 - row0,
            row3 + row1,
            row3 - row1,
            row2,
            row3 - row2,
        ];

        Self {
            planes: rows.map(|r| FrustumPlane::from(r).normalized()),
        }
    }

    /// Inward-facing axis-aligned planes bounding `min..=max`, in the
    /// usual left, right, bottom, top, near, far order.
    #[must_use]
    pub fn from_bounds(min: Vec3, max: Vec3) -> Self {
        Self {
            planes: [
                FrustumPlane::new(Vec3::X, -min.x),
                FrustumPlane::new(Vec3::NEG_X, max.x),
                FrustumPlane::new(Vec3::Y, -min.y),
                FrustumPlane::new(Vec3::NEG_Y, max.y),
                FrustumPlane::new(Vec3::Z, -min.z),
                FrustumPlane::new(Vec3::NEG_Z, max.z),
            ],
        }
    }

    /// Conservative box test run by every kernel lane.
    ///
    /// Planes are visited in order and the test stops at the first plane the
    /// box lies entirely behind. Boxes near frustum corners can pass even
    /// though they are outside.
    #[inline]
    #[must_use]
    pub fn is_aabb_in_frustum(&self, center: Vec3, extent: f32) -> bool {
        for plane in &self.planes {
            let distance = plane.signed_distance(center);
            let radius = plane.projected_radius(extent);
            if distance + radius < 0.0 {
                return false;
            }
        }
        true
    }

    /// Full per-plane classification of the box. Slower than
    /// [`Self::is_aabb_in_frustum`] since it never short-circuits on
    /// intersecting planes.
    #[must_use]
    pub fn classify_aabb(&self, center: Vec3, extent: f32) -> Containment {
        let mut inside = true;
        for plane in &self.planes {
            let distance = plane.signed_distance(center);
            let radius = plane.projected_radius(extent);
            if distance + radius < 0.0 {
                return Containment::Outside;
            }
            if distance <= radius {
                inside = false;
            }
        }
        if inside {
            Containment::Inside
        } else {
            Containment::Intersecting
        }
    }

    /// Test if a point is inside the frustum
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }

    /// Planes packed for the uniform buffer.
    #[must_use]
    pub fn to_gpu(&self) -> [[f32; 4]; PLANE_COUNT] {
        self.planes.map(|p| p.to_vec4().to_array())
    }
}
