//! wgpu compute backend for the cull kernel.
//!
//! Bindings (group 0):
//!
//! | binding | contents                    | access                  |
//! |---------|-----------------------------|-------------------------|
//! | 0       | [`CullUniforms`]            | uniform                 |
//! | 1       | [`InstanceRecord`] array    | storage, read           |
//! | 2       | indirect draw args          | storage, atomic counter |
//! | 3       | visible index array         | storage, write          |
//!
//! The args buffer carries `INDIRECT` usage, so a renderer sharing the
//! device can draw straight from it after the dispatch.

use std::sync::mpsc;

use wgpu::util::DeviceExt;

use super::compute_context::ComputeContext;
use super::dynamic_buffer::TypedBuffer;
use super::pipeline_helpers::{
    create_compute_pipeline, readback_buffer, storage_buffer, uniform_buffer,
};
use super::shader_composer::{
    ShaderComposer, FRUSTUM_CULL_ENTRY, FRUSTUM_CULL_SHADER,
};
use crate::camera::Frustum;
use crate::cull::{
    validate, workgroup_count, CullParams, CullResult, Culler,
    DrawIndexedIndirectArgs, InstanceRecord, PLANE_COUNT,
};
use crate::error::CullError;

const ARGS_SIZE: u64 = DrawIndexedIndirectArgs::SIZE as u64;

/// Uniform block read by every lane.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CullUniforms {
    /// Frustum planes as `(nx, ny, nz, d)`.
    pub planes: [[f32; 4]; PLANE_COUNT],
    /// Lanes at or past this index exit immediately.
    pub instance_count: u32,
    /// Bounding half-extent shared by all instances.
    pub bounding_extent: f32,
    pub(crate) _pad: [u32; 2],
}

impl CullUniforms {
    /// Uniforms for one dispatch.
    #[must_use]
    pub fn new(frustum: &Frustum, instance_count: u32, bounding_extent: f32) -> Self {
        Self {
            planes: frustum.to_gpu(),
            instance_count,
            bounding_extent,
            _pad: [0; 2],
        }
    }
}

/// GPU backend: owns the pipeline and all kernel buffers.
pub struct GpuCuller {
    context: ComputeContext,
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniforms: wgpu::Buffer,
    instances: TypedBuffer<InstanceRecord>,
    args: wgpu::Buffer,
    visible: TypedBuffer<u32>,
    args_readback: wgpu::Buffer,
    visible_readback: wgpu::Buffer,
}

impl GpuCuller {
    /// Build the pipeline and buffers sized for `capacity` instances.
    ///
    /// # Errors
    ///
    /// Returns [`CullError::Shader`] if the cull shader fails to compose.
    pub fn new(context: ComputeContext, capacity: usize) -> Result<Self, CullError> {
        let device = &context.device;
        let capacity = capacity.max(1);

        let mut composer = ShaderComposer::new()?;
        let shader = composer.compose(
            device,
            "Frustum Cull Shader",
            FRUSTUM_CULL_SHADER,
            "compute/frustum_cull.wgsl",
        )?;

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frustum Cull Bind Group Layout"),
                entries: &[
                    uniform_buffer(0),
                    storage_buffer(1, true),
                    storage_buffer(2, false),
                    storage_buffer(3, false),
                ],
            });
        let pipeline = create_compute_pipeline(
            device,
            "Frustum Cull",
            &shader,
            FRUSTUM_CULL_ENTRY,
            &layout,
        );

        let uniforms =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cull Uniforms"),
                contents: bytemuck::bytes_of(
                    &<CullUniforms as bytemuck::Zeroable>::zeroed(),
                ),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let args =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Cull Indirect Args"),
                contents: bytemuck::bytes_of(
                    &DrawIndexedIndirectArgs::default(),
                ),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::INDIRECT
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            });
        let instances = TypedBuffer::with_capacity(
            device,
            "Cull Instances",
            capacity,
            wgpu::BufferUsages::STORAGE,
        );
        let visible = TypedBuffer::with_capacity(
            device,
            "Visible Indices",
            capacity,
            wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
        );
        let args_readback =
            readback_buffer(device, "Cull Args Readback", ARGS_SIZE);
        let visible_readback = readback_buffer(
            device,
            "Visible Indices Readback",
            visible.byte_capacity(),
        );

        let bind_group = create_bind_group(
            device, &layout, &uniforms, &instances, &args, &visible,
        );

        log::info!("GPU culler ready (capacity {capacity})");

        Ok(Self {
            context,
            pipeline,
            layout,
            bind_group,
            uniforms,
            instances,
            args,
            visible,
            args_readback,
            visible_readback,
        })
    }

    /// Indirect args buffer; `instance_count` at byte offset 4 holds the
    /// visible count after a dispatch.
    #[must_use]
    pub fn indirect_args_buffer(&self) -> &wgpu::Buffer {
        &self.args
    }

    /// Compacted visible-index buffer.
    #[must_use]
    pub fn visible_index_buffer(&self) -> &wgpu::Buffer {
        self.visible.buffer()
    }

    /// Slots in the visible-index buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.visible.capacity()
    }

    fn ensure_capacity(&mut self, required: usize) {
        let device = &self.context.device;
        let grown = self.visible.ensure_capacity(device, required);
        if grown {
            log::warn!(
                "visible index buffer grown to {} slots",
                self.visible.capacity()
            );
            self.visible_readback = readback_buffer(
                device,
                "Visible Indices Readback",
                self.visible.byte_capacity(),
            );
            self.rebuild_bind_group();
        }
    }

    fn rebuild_bind_group(&mut self) {
        self.bind_group = create_bind_group(
            &self.context.device,
            &self.layout,
            &self.uniforms,
            &self.instances,
            &self.args,
            &self.visible,
        );
    }

    /// Upload inputs, reset the counter, and record the dispatch plus
    /// readback copies into `encoder`.
    fn encode(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        frustum: &Frustum,
        instances: &[InstanceRecord],
        count: u32,
        params: &CullParams,
    ) {
        let queue = &self.context.queue;
        let uniforms =
            CullUniforms::new(frustum, count, params.bounding_extent);
        queue.write_buffer(&self.uniforms, 0, bytemuck::bytes_of(&uniforms));
        queue.write_buffer(
            &self.args,
            0,
            bytemuck::bytes_of(&DrawIndexedIndirectArgs::reset(
                params.index_count,
            )),
        );
        if self
            .instances
            .write(&self.context.device, queue, instances)
        {
            self.rebuild_bind_group();
        }

        if count > 0 {
            let mut pass =
                encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: Some("Frustum Cull Pass"),
                    timestamp_writes: None,
                });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);
            pass.dispatch_workgroups(workgroup_count(count), 1, 1);
        }

        encoder.copy_buffer_to_buffer(
            &self.args,
            0,
            &self.args_readback,
            0,
            ARGS_SIZE,
        );
        if count > 0 {
            encoder.copy_buffer_to_buffer(
                self.visible.buffer(),
                0,
                &self.visible_readback,
                0,
                u64::from(count) * 4,
            );
        }
    }

    /// Block until `bytes` of `buffer` are mapped, then copy them out as
    /// words.
    fn read_words(&self, buffer: &wgpu::Buffer, bytes: u64) -> Result<Vec<u32>, CullError> {
        if bytes == 0 {
            return Ok(Vec::new());
        }
        let slice = buffer.slice(..bytes);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        let _ = self
            .context
            .device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| CullError::Poll(e.to_string()))?;
        receiver.recv().map_err(|_| {
            CullError::Poll("map callback dropped before completing".to_owned())
        })??;

        let data = slice.get_mapped_range();
        let words = bytemuck::pod_collect_to_vec::<u8, u32>(&data);
        drop(data);
        buffer.unmap();
        Ok(words)
    }
}

impl Culler for GpuCuller {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn cull(
        &mut self,
        frustum: &Frustum,
        instances: &[InstanceRecord],
        params: &CullParams,
    ) -> Result<CullResult, CullError> {
        let wanted = params.count.resolve(instances) as usize;
        self.ensure_capacity(wanted.min(instances.len()));
        let count = validate(instances, params, self.visible.capacity())?;

        let mut encoder = self.context.create_encoder();
        self.encode(&mut encoder, frustum, instances, count, params);
        self.context.submit(encoder);

        let words = self.read_words(&self.args_readback, ARGS_SIZE)?;
        let mut raw = [0u32; DrawIndexedIndirectArgs::WORDS];
        raw.copy_from_slice(&words[..DrawIndexedIndirectArgs::WORDS]);
        let args = DrawIndexedIndirectArgs::from_words(raw);

        let visible_count = args.instance_count.min(count);
        let visible = self
            .read_words(&self.visible_readback, u64::from(visible_count) * 4)?;

        log::debug!(
            "gpu cull: {count} instances, {} groups, {} visible",
            workgroup_count(count),
            args.instance_count
        );
        Ok(CullResult { args, visible })
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniforms: &wgpu::Buffer,
    instances: &TypedBuffer<InstanceRecord>,
    args: &wgpu::Buffer,
    visible: &TypedBuffer<u32>,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Frustum Cull Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniforms.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: instances.buffer().as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: args.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: visible.buffer().as_entire_binding(),
            },
        ],
    })
}
