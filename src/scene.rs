//! Demo instance layouts.
//!
//! Culling never builds scenes itself; these helpers produce realistic
//! instance arrays for the binary, tests, and benchmarks.

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};

use crate::cull::{stamp_instance_count, InstanceRecord};
use crate::options::SceneOptions;

/// One instance at the origin followed by two rings in the XZ plane.
///
/// Ring members alternate texture slots 0 and 1. Record 0 carries the total
/// count so the array also works with count-from-first-record dispatches.
#[must_use]
pub fn ring_layout(options: &SceneOptions) -> Vec<InstanceRecord> {
    let scale = Mat4::from_scale(Vec3::splat(options.scale));
    let mut records = Vec::with_capacity(
        1 + options.inner_count as usize + options.outer_count as usize,
    );
    records.push(InstanceRecord::new(scale, 0));

    for (count, radius) in [
        (options.inner_count, options.inner_radius),
        (options.outer_count, options.outer_radius),
    ] {
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let position =
                Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
            records.push(InstanceRecord::new(
                Mat4::from_translation(position) * scale,
                i % 2,
            ));
        }
    }

    stamp_instance_count(&mut records);
    records
}

/// `dim³` instances on a grid centered at the origin.
#[must_use]
pub fn grid_layout(dim: u32, spacing: f32) -> Vec<InstanceRecord> {
    let half = (dim.saturating_sub(1)) as f32 * spacing * 0.5;
    let mut records = Vec::with_capacity((dim * dim * dim) as usize);
    for z in 0..dim {
        for y in 0..dim {
            for x in 0..dim {
                let position =
                    Vec3::new(x as f32, y as f32, z as f32) * spacing
                        - Vec3::splat(half);
                records.push(InstanceRecord::new(
                    Mat4::from_translation(position),
                    (x + y + z) % 2,
                ));
            }
        }
    }
    stamp_instance_count(&mut records);
    records
}

/// Rebuild every model as scale, then rotation about Y, then the record's
/// existing translation.
pub fn spin_y(records: &mut [InstanceRecord], angle: f32, scale: f32) {
    let rotation = Quat::from_rotation_y(angle);
    for record in records {
        let model = Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            rotation,
            record.translation(),
        );
        record.model = model.to_cols_array_2d();
    }
}
