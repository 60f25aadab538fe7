use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;

use super::{
    validate, workgroup_count, CullParams, CullResult, Culler,
    DrawIndexedIndirectArgs, InstanceRecord, WORKGROUP_SIZE,
};
use crate::camera::Frustum;
use crate::error::CullError;

/// CPU model of the kernel's two output buffers.
///
/// `args` mirrors the indirect-args buffer word for word, so the counter is
/// word [`DrawIndexedIndirectArgs::COUNTER_WORD`]. `indices` is the
/// host-presized visible-index array.
pub struct VisibilityOutput {
    args: [AtomicU32; DrawIndexedIndirectArgs::WORDS],
    indices: Box<[AtomicU32]>,
}

impl VisibilityOutput {
    /// Zeroed output with room for `capacity` visible indices.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            args: std::array::from_fn(|_| AtomicU32::new(0)),
            indices: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Seed the args with `index_count` and zero the counter. Must run
    /// before every dispatch.
    pub fn reset(&mut self, index_count: u32) {
        let words = DrawIndexedIndirectArgs::reset(index_count).to_words();
        for (cell, word) in self.args.iter_mut().zip(words) {
            *cell.get_mut() = word;
        }
    }

    /// Current counter value.
    #[must_use]
    pub fn counter(&self) -> u32 {
        self.counter_cell().load(Ordering::Acquire)
    }

    /// Slots in the visible-index array.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.indices.len()
    }

    /// Snapshot of the indirect args.
    #[must_use]
    pub fn draw_args(&self) -> DrawIndexedIndirectArgs {
        DrawIndexedIndirectArgs::from_words(
            self.args.each_ref().map(|w| w.load(Ordering::Acquire)),
        )
    }

    /// Slots `0..counter` of the visible-index array.
    #[must_use]
    pub fn visible(&self) -> Vec<u32> {
        let n = (self.counter() as usize).min(self.indices.len());
        self.indices[..n]
            .iter()
            .map(|slot| slot.load(Ordering::Acquire))
            .collect()
    }

    /// Args and visible indices together.
    #[must_use]
    pub fn snapshot(&self) -> CullResult {
        CullResult {
            args: self.draw_args(),
            visible: self.visible(),
        }
    }

    fn counter_cell(&self) -> &AtomicU32 {
        &self.args[DrawIndexedIndirectArgs::COUNTER_WORD]
    }

    fn store_slot(&self, slot: u32, lane: u32) {
        let cell = self.indices.get(slot as usize);
        debug_assert!(
            cell.is_some(),
            "visible slot {slot} past index capacity {}",
            self.indices.len()
        );
        if let Some(cell) = cell {
            cell.store(lane, Ordering::Relaxed);
        }
    }
}

/// Run the cull kernel over `instance_count` lanes.
///
/// Lanes are grouped [`WORKGROUP_SIZE`] at a time; groups run in parallel on
/// the rayon pool and lanes within a group run in order. The counter is not
/// reset here: a non-zero counter shifts every reserved slot by its value.
pub fn dispatch(
    frustum: &Frustum,
    instances: &[InstanceRecord],
    instance_count: u32,
    bounding_extent: f32,
    output: &VisibilityOutput,
) {
    let stale = output.counter();
    if stale != 0 {
        log::warn!("cull dispatch starting with uncleared counter {stale}");
    }

    let groups = workgroup_count(instance_count);
    (0..groups).into_par_iter().for_each(|group| {
        for lane in group_lanes(group, instance_count) {
            run_lane(
                lane,
                frustum,
                instances,
                instance_count,
                bounding_extent,
                output,
            );
        }
    });
}

/// Live lanes of `group`. The final group stops at `instance_count`
/// instead of walking its idle tail.
fn group_lanes(group: u32, instance_count: u32) -> Range<u32> {
    let first = group.saturating_mul(WORKGROUP_SIZE).min(instance_count);
    first..first.saturating_add(WORKGROUP_SIZE).min(instance_count)
}

#[inline]
fn run_lane(
    lane: u32,
    frustum: &Frustum,
    instances: &[InstanceRecord],
    instance_count: u32,
    bounding_extent: f32,
    output: &VisibilityOutput,
) {
    if lane >= instance_count {
        return;
    }
    let record = instances.get(lane as usize);
    debug_assert!(
        record.is_some(),
        "lane {lane} past the {} records supplied",
        instances.len()
    );
    let Some(record) = record else {
        return;
    };

    if frustum.is_aabb_in_frustum(record.translation(), bounding_extent) {
        // fetch_add hands back the pre-increment value: the lane's own slot
        let slot = output.counter_cell().fetch_add(1, Ordering::Relaxed);
        output.store_slot(slot, lane);
    }
}

/// CPU backend. Keeps its output buffers between frames and grows the
/// index array when a larger instance set arrives.
pub struct CpuCuller {
    output: VisibilityOutput,
}

impl CpuCuller {
    /// Culler with room for `capacity` visible indices.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        log::info!("CPU culler ready ({} threads)", rayon::current_num_threads());
        Self {
            output: VisibilityOutput::with_capacity(capacity),
        }
    }

    /// Output buffers of the last dispatch.
    #[must_use]
    pub fn output(&self) -> &VisibilityOutput {
        &self.output
    }

    fn ensure_capacity(&mut self, required: usize) {
        if required <= self.output.capacity() {
            return;
        }
        let new_capacity = (self.output.capacity() * 2).max(required);
        log::warn!(
            "growing visible index array {} -> {new_capacity}",
            self.output.capacity()
        );
        self.output = VisibilityOutput::with_capacity(new_capacity);
    }
}

impl Culler for CpuCuller {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn cull(
        &mut self,
        frustum: &Frustum,
        instances: &[InstanceRecord],
        params: &CullParams,
    ) -> Result<CullResult, CullError> {
        let wanted = params.count.resolve(instances) as usize;
        self.ensure_capacity(wanted.min(instances.len()));
        let count = validate(instances, params, self.output.capacity())?;

        self.output.reset(params.index_count);
        dispatch(
            frustum,
            instances,
            count,
            params.bounding_extent,
            &self.output,
        );

        let result = self.output.snapshot();
        log::debug!(
            "cpu cull: {count} instances, {} groups, {} visible",
            workgroup_count(count),
            result.visible_count()
        );
        Ok(result)
    }
}
