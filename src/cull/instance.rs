//! Per-instance records as laid out in the instance storage buffer.

use glam::{Mat4, Vec3};

/// One renderable instance.
///
/// Layout matches the WGSL `InstanceRecord` struct: a column-major model
/// matrix (64 bytes), two `u32`s, and a `vec2<f32>` of padding, 80 bytes
/// total. Written by the host once per frame and read-only while the kernel
/// runs.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRecord {
    /// Column-major model transform; translation lives in column 3.
    pub model: [[f32; 4]; 4],
    /// Texture/material slot consumed by the draw, ignored by culling.
    pub texture_index: u32,
    /// Total instance count. Only meaningful on record 0, and only when the
    /// dispatch uses [`InstanceCount::FromFirstRecord`].
    ///
    /// [`InstanceCount::FromFirstRecord`]: super::InstanceCount::FromFirstRecord
    pub num_instances: u32,
    pub(crate) _padding: [f32; 2],
}

impl InstanceRecord {
    /// Record with the given transform and texture slot.
    #[must_use]
    pub fn new(model: Mat4, texture_index: u32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            texture_index,
            num_instances: 0,
            _padding: [0.0; 2],
        }
    }

    /// Record translated to `position` with an identity basis.
    #[must_use]
    pub fn at(position: Vec3) -> Self {
        Self::new(Mat4::from_translation(position), 0)
    }

    /// World-space translation, the center of the instance's bounding box.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        let [x, y, z, _] = self.model[3];
        Vec3::new(x, y, z)
    }
}

/// Write the slice length into record 0's `num_instances`, the layout
/// expected by dispatches that read their count from the first record.
/// No-op on an empty slice.
pub fn stamp_instance_count(records: &mut [InstanceRecord]) {
    let count = records.len() as u32;
    if let Some(first) = records.first_mut() {
        first.num_instances = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_80_bytes() {
        assert_eq!(size_of::<InstanceRecord>(), 80);
        assert_eq!(align_of::<InstanceRecord>(), 4);
    }

    #[test]
    fn translation_reads_column_three() {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(0.5),
            glam::Quat::from_rotation_y(1.2),
            Vec3::new(3.0, -2.0, 7.5),
        );
        let record = InstanceRecord::new(model, 1);
        assert!(record.translation().abs_diff_eq(Vec3::new(3.0, -2.0, 7.5), 1e-6));
        assert_eq!(record.texture_index, 1);
    }

    #[test]
    fn stamp_writes_only_first_record() {
        let mut records = vec![InstanceRecord::at(Vec3::ZERO); 3];
        stamp_instance_count(&mut records);
        assert_eq!(records[0].num_instances, 3);
        assert_eq!(records[1].num_instances, 0);
        assert_eq!(records[2].num_instances, 0);

        let mut empty: Vec<InstanceRecord> = Vec::new();
        stamp_instance_count(&mut empty);
    }
}
