use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cull::{
    CullParams, InstanceCount, DEFAULT_INDEX_COUNT, EXTENT_SHRINK,
    UNIT_HALF_EXTENT,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Kernel", inline)]
#[serde(default)]
/// Cull kernel constants.
pub struct KernelOptions {
    /// Half-size of the cube every instance is assumed to be.
    #[schemars(title = "Half Extent", range(min = 0.0, max = 10.0), extend("step" = 0.05))]
    pub unit_half_extent: f32,
    /// Shrink factor applied to the half extent.
    #[schemars(title = "Shrink", range(min = 0.0, max = 2.0), extend("step" = 0.01))]
    pub extent_shrink: f32,
    /// Indices per instance seeded into the indirect args.
    #[schemars(skip)]
    pub index_count_per_instance: u32,
    /// Initial size of the visible index array, in instances.
    #[schemars(skip)]
    pub initial_capacity: usize,
}

impl Default for KernelOptions {
    fn default() -> Self {
        Self {
            unit_half_extent: UNIT_HALF_EXTENT,
            extent_shrink: EXTENT_SHRINK,
            index_count_per_instance: DEFAULT_INDEX_COUNT,
            initial_capacity: 1024,
        }
    }
}

impl KernelOptions {
    /// Bounding half-extent applied to every instance.
    #[must_use]
    pub fn bounding_extent(&self) -> f32 {
        self.unit_half_extent * self.extent_shrink
    }

    /// Dispatch parameters for an explicit instance count.
    #[must_use]
    pub fn params(&self, instance_count: u32) -> CullParams {
        CullParams {
            count: InstanceCount::Explicit(instance_count),
            bounding_extent: self.bounding_extent(),
            index_count: self.index_count_per_instance,
        }
    }
}
