//! GPU kernel against the CPU kernel. Every test returns early when no
//! compute-capable adapter is present.

use cullpass::camera::{Camera, Frustum};
use cullpass::cull::{
    CpuCuller, CullParams, Culler, DrawIndexedIndirectArgs, InstanceRecord,
};
use cullpass::gpu::{ComputeContext, GpuCuller};
use cullpass::options::{CameraOptions, SceneOptions};
use cullpass::scene::{grid_layout, ring_layout, spin_y};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gpu_culler(capacity: usize) -> Option<GpuCuller> {
    let context = match pollster::block_on(ComputeContext::new(false)) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("skipping GPU test: {e}");
            return None;
        }
    };
    Some(GpuCuller::new(context, capacity).unwrap())
}

fn box_frustum() -> Frustum {
    Frustum::from_bounds(Vec3::splat(-10.0), Vec3::splat(10.0))
}

fn assert_backends_agree(
    gpu: &mut GpuCuller,
    frustum: &Frustum,
    records: &[InstanceRecord],
) {
    let params = CullParams::explicit(records.len() as u32);
    let mut cpu = CpuCuller::new(records.len());
    let expected = cpu.cull(frustum, records, &params).unwrap();
    let actual = gpu.cull(frustum, records, &params).unwrap();

    assert_eq!(actual.args, expected.args);
    assert_eq!(actual.sorted(), expected.sorted());
}

#[test]
fn three_instance_scenario_on_gpu() {
    let Some(mut gpu) = gpu_culler(3) else {
        return;
    };
    let records: Vec<_> = [
        Vec3::ZERO,
        Vec3::new(15.0, 0.0, 0.0),
        Vec3::new(9.99, 0.0, 0.0),
    ]
    .into_iter()
    .map(InstanceRecord::at)
    .collect();

    let result = gpu
        .cull(&box_frustum(), &records, &CullParams::explicit(3))
        .unwrap();
    assert_eq!(result.visible_count(), 2);
    assert_eq!(result.args.index_count, 36);
    assert_eq!(result.sorted(), vec![0, 2]);
}

#[test]
fn zero_instances_leave_counter_at_zero() {
    let Some(mut gpu) = gpu_culler(4) else {
        return;
    };
    let records = vec![InstanceRecord::at(Vec3::ZERO); 4];
    let result = gpu
        .cull(&box_frustum(), &records, &CullParams::explicit(0))
        .unwrap();
    assert_eq!(result.visible_count(), 0);
    assert!(result.visible.is_empty());
}

#[test]
fn random_sets_match_cpu() {
    let Some(mut gpu) = gpu_culler(64) else {
        return;
    };
    let mut rng = StdRng::seed_from_u64(0xc0ffee);
    let frustum = Camera::from_options(&CameraOptions::default()).frustum();

    // Sizes straddle the workgroup boundary and force the buffers to grow.
    for n in [1_usize, 63, 64, 65, 1_000, 20_000] {
        let records: Vec<_> = (0..n)
            .map(|_| {
                InstanceRecord::at(Vec3::new(
                    rng.random_range(-30.0..30.0),
                    rng.random_range(-30.0..30.0),
                    rng.random_range(-30.0..30.0),
                ))
            })
            .collect();
        assert_backends_agree(&mut gpu, &frustum, &records);
    }
    assert!(gpu.capacity() >= 20_000);
}

#[test]
fn spinning_ring_matches_cpu_every_frame() {
    let Some(mut gpu) = gpu_culler(32) else {
        return;
    };
    let scene = SceneOptions::default();
    let frustum = Camera::from_options(&CameraOptions::default()).frustum();
    let mut records = ring_layout(&scene);

    for frame in 0..8 {
        spin_y(&mut records, frame as f32 * 0.5, scene.scale);
        assert_backends_agree(&mut gpu, &frustum, &records);
    }
}

#[test]
fn grid_rerun_keeps_visible_set() {
    let Some(mut gpu) = gpu_culler(4_096) else {
        return;
    };
    let records = grid_layout(16, 1.5);
    let params = CullParams::explicit(records.len() as u32);
    let frustum = box_frustum();

    let first = gpu.cull(&frustum, &records, &params).unwrap();
    let second = gpu.cull(&frustum, &records, &params).unwrap();
    assert_eq!(first.visible_count(), second.visible_count());
    assert_eq!(first.visible_set(), second.visible_set());
}

/// Device requested by the host, as a renderer would own it.
fn host_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::default();
    let adapter = pollster::block_on(
        instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
    )
    .ok()?;
    if !adapter
        .get_downlevel_capabilities()
        .flags
        .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
    {
        return None;
    }
    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("Host Device"),
        required_limits: wgpu::Limits::downlevel_defaults(),
        ..Default::default()
    }))
    .ok()
}

fn read_back(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &wgpu::Buffer,
    bytes: u64,
) -> Vec<u32> {
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Host Staging"),
        size: bytes,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Host Readback"),
        });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, bytes);
    let _ = queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    let _ = device
        .poll(wgpu::PollType::Wait)
        .unwrap();
    receiver.recv().unwrap().unwrap();
    let words =
        bytemuck::pod_collect_to_vec::<u8, u32>(&slice.get_mapped_range());
    staging.unmap();
    words
}

#[test]
fn shared_device_buffers_hold_the_draw() {
    let Some((device, queue)) = host_device() else {
        eprintln!("skipping GPU test: no compute adapter");
        return;
    };
    // A second handle stays with the host for its own reads.
    let (host_device, host_queue) = (device.clone(), queue.clone());
    let mut gpu =
        GpuCuller::new(ComputeContext::from_device(device, queue), 8).unwrap();

    let records: Vec<_> = [
        Vec3::ZERO,
        Vec3::new(15.0, 0.0, 0.0),
        Vec3::new(9.99, 0.0, 0.0),
    ]
    .into_iter()
    .map(InstanceRecord::at)
    .collect();
    let result = gpu
        .cull(&box_frustum(), &records, &CullParams::explicit(3))
        .unwrap();

    let args = read_back(
        &host_device,
        &host_queue,
        gpu.indirect_args_buffer(),
        DrawIndexedIndirectArgs::SIZE as u64,
    );
    assert_eq!(args, vec![36, 2, 0, 0, 0]);
    assert_eq!(
        args[DrawIndexedIndirectArgs::COUNTER_WORD],
        result.visible_count()
    );

    let mut indices =
        read_back(&host_device, &host_queue, gpu.visible_index_buffer(), 8);
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 2]);

    assert!(gpu
        .indirect_args_buffer()
        .usage()
        .contains(wgpu::BufferUsages::INDIRECT));
}
