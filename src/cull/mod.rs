//! Frustum culling with atomic stream compaction.
//!
//! One lane runs per instance index. Each lane tests its instance's bounding
//! box against the frustum and, when it passes, reserves a slot in the
//! visible-index array by atomically incrementing the counter stored in the
//! indirect draw arguments. The lane then writes its own instance index into
//! that slot.
//!
//! After a dispatch:
//!
//! - the counter equals the number of visible instances,
//! - slots `0..counter` hold each visible index exactly once,
//! - slot order is whatever order lanes happened to reserve in.
//!
//! The host owns every precondition: the counter must be zeroed before each
//! dispatch, the index array must be sized for the worst case, and the count
//! must not exceed the records supplied. [`validate`] checks the last two up
//! front since the kernel itself cannot report anything.

mod args;
/// CPU reference kernel running lanes on the rayon pool.
pub mod cpu;
mod instance;

pub use args::DrawIndexedIndirectArgs;
pub use cpu::{CpuCuller, VisibilityOutput};
pub use instance::{stamp_instance_count, InstanceRecord};
use rustc_hash::FxHashSet;

use crate::camera::Frustum;
use crate::error::CullError;

/// Lanes per workgroup.
pub const WORKGROUP_SIZE: u32 = 64;
/// Planes in a frustum.
pub const PLANE_COUNT: usize = 6;
/// Half-size of the unit cube every instance is assumed to be.
pub const UNIT_HALF_EXTENT: f32 = 0.5;
/// Shrink applied to the unit-cube bound.
pub const EXTENT_SHRINK: f32 = 0.95;
/// Bounding half-extent used for every instance.
pub const DEFAULT_BOUNDING_EXTENT: f32 = UNIT_HALF_EXTENT * EXTENT_SHRINK;
/// Byte offset of the visibility counter inside the indirect args.
pub const COUNTER_BYTE_OFFSET: u64 = 4;
/// Indices in a unit cube mesh, seeded into the indirect args on reset.
pub const DEFAULT_INDEX_COUNT: u32 = 36;

/// Workgroups needed to give every instance a lane.
#[must_use]
pub fn workgroup_count(instance_count: u32) -> u32 {
    instance_count.div_ceil(WORKGROUP_SIZE)
}

/// Where a dispatch gets its instance count from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceCount {
    /// Count passed alongside the dispatch.
    Explicit(u32),
    /// Count read from `records[0].num_instances`; zero when there are no
    /// records.
    FromFirstRecord,
}

impl InstanceCount {
    /// Resolve against an instance array.
    #[must_use]
    pub fn resolve(self, instances: &[InstanceRecord]) -> u32 {
        match self {
            Self::Explicit(n) => n,
            Self::FromFirstRecord => {
                instances.first().map_or(0, |r| r.num_instances)
            }
        }
    }
}

/// Per-dispatch parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullParams {
    /// Instance count source.
    pub count: InstanceCount,
    /// Bounding half-extent shared by all instances.
    pub bounding_extent: f32,
    /// `index_count` written into the indirect args on reset.
    pub index_count: u32,
}

impl CullParams {
    /// Explicit count with the default extent and cube index count.
    #[must_use]
    pub fn explicit(instance_count: u32) -> Self {
        Self {
            count: InstanceCount::Explicit(instance_count),
            ..Self::default()
        }
    }
}

impl Default for CullParams {
    fn default() -> Self {
        Self {
            count: InstanceCount::FromFirstRecord,
            bounding_extent: DEFAULT_BOUNDING_EXTENT,
            index_count: DEFAULT_INDEX_COUNT,
        }
    }
}

/// Compacted output of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CullResult {
    /// Indirect args after the dispatch; `instance_count` is the counter.
    pub args: DrawIndexedIndirectArgs,
    /// Slots `0..counter` of the visible-index array, unordered.
    pub visible: Vec<u32>,
}

impl CullResult {
    /// Number of visible instances.
    #[must_use]
    pub fn visible_count(&self) -> u32 {
        self.args.instance_count
    }

    /// Visible indices as a set, for order-independent comparison.
    #[must_use]
    pub fn visible_set(&self) -> FxHashSet<u32> {
        self.visible.iter().copied().collect()
    }

    /// Visible indices in ascending order.
    #[must_use]
    pub fn sorted(&self) -> Vec<u32> {
        let mut sorted = self.visible.clone();
        sorted.sort_unstable();
        sorted
    }
}

/// A backend able to run the cull kernel end to end: reset the counter,
/// dispatch, and hand back the compacted output.
pub trait Culler {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Cull `instances` against `frustum`.
    ///
    /// # Errors
    ///
    /// Returns [`CullError`] when a precondition does not hold (see
    /// [`validate`]) or the backend fails to execute.
    fn cull(
        &mut self,
        frustum: &Frustum,
        instances: &[InstanceRecord],
        params: &CullParams,
    ) -> Result<CullResult, CullError>;
}

/// Resolve the instance count and check the dispatch preconditions.
///
/// # Errors
///
/// - [`CullError::InstanceCount`] when the count exceeds `instances.len()`
/// - [`CullError::IndexCapacity`] when `index_capacity` is below the count
/// - [`CullError::InvalidExtent`] for negative or non-finite extents
pub fn validate(
    instances: &[InstanceRecord],
    params: &CullParams,
    index_capacity: usize,
) -> Result<u32, CullError> {
    let count = params.count.resolve(instances);
    if count as usize > instances.len() {
        return Err(CullError::InstanceCount {
            requested: count,
            available: instances.len(),
        });
    }
    if count as usize > index_capacity {
        return Err(CullError::IndexCapacity {
            required: count,
            capacity: index_capacity,
        });
    }
    if !params.bounding_extent.is_finite() || params.bounding_extent < 0.0 {
        return Err(CullError::InvalidExtent(params.bounding_extent));
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn default_extent_is_shrunk_half_unit() {
        assert!((DEFAULT_BOUNDING_EXTENT - 0.475).abs() < 1e-7);
    }

    #[test]
    fn groups_cover_every_lane() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
        assert_eq!(workgroup_count(23), 1);
    }

    #[test]
    fn count_from_first_record() {
        let mut records = vec![InstanceRecord::at(Vec3::ZERO); 4];
        records[0].num_instances = 3;
        assert_eq!(InstanceCount::FromFirstRecord.resolve(&records), 3);
        assert_eq!(InstanceCount::Explicit(2).resolve(&records), 2);
        assert_eq!(InstanceCount::FromFirstRecord.resolve(&[]), 0);
    }

    #[test]
    fn validate_rejects_overcount() {
        let records = vec![InstanceRecord::at(Vec3::ZERO); 2];
        let err = validate(&records, &CullParams::explicit(3), 8).unwrap_err();
        assert!(matches!(
            err,
            CullError::InstanceCount {
                requested: 3,
                available: 2
            }
        ));
    }

    #[test]
    fn validate_rejects_small_index_array() {
        let records = vec![InstanceRecord::at(Vec3::ZERO); 10];
        let err = validate(&records, &CullParams::explicit(10), 9).unwrap_err();
        assert!(matches!(
            err,
            CullError::IndexCapacity {
                required: 10,
                capacity: 9
            }
        ));
    }

    #[test]
    fn validate_rejects_bad_extent() {
        let records = vec![InstanceRecord::at(Vec3::ZERO); 1];
        let params = CullParams {
            bounding_extent: f32::NAN,
            ..CullParams::explicit(1)
        };
        assert!(matches!(
            validate(&records, &params, 1),
            Err(CullError::InvalidExtent(_))
        ));
    }

    #[test]
    fn validate_accepts_undercount() {
        let records = vec![InstanceRecord::at(Vec3::ZERO); 10];
        assert_eq!(validate(&records, &CullParams::explicit(4), 4).unwrap(), 4);
    }
}
