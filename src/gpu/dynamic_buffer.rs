//! Dynamic GPU buffer management with automatic resizing
//!
//! Provides buffers that grow automatically when data exceeds capacity,
//! using a 2x growth strategy to minimize reallocations.

/// A GPU buffer that can grow dynamically
///
/// Uses a 2x growth strategy when capacity is exceeded.
/// Never shrinks (GPU buffers cannot be resized in place).
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize, // Capacity in bytes
    min_capacity: usize,
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity. `min_capacity` is the
    /// smallest size ever allocated, so a storage binding always covers at
    /// least one element.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: usize,
        min_capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let min_capacity = min_capacity.max(16);
        let capacity = initial_capacity.max(min_capacity);
        let buffer = Self::allocate(device, label, capacity, usage);

        Self {
            buffer,
            capacity,
            min_capacity,
            usage,
            label: label.to_owned(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Grow to hold at least `needed` bytes. Contents are not preserved.
    ///
    /// Returns `true` if buffer was reallocated (bind groups need recreation)
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, needed: usize) -> bool {
        if needed <= self.capacity {
            return false;
        }
        // 2x growth
        let new_capacity = (needed * 2).max(self.min_capacity);
        log::debug!(
            "{}: growing {} -> {new_capacity} bytes",
            self.label,
            self.capacity
        );
        self.buffer = Self::allocate(device, &self.label, new_capacity, self.usage);
        self.capacity = new_capacity;
        true
    }

    /// Write data to buffer, growing if necessary
    ///
    /// Returns `true` if buffer was reallocated (bind groups need recreation)
    pub fn write<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) -> bool {
        let data_bytes: &[u8] = bytemuck::cast_slice(data);
        let needed = data_bytes.len();
        let reallocated = self.ensure_capacity(device, needed);

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data_bytes);
        }

        reallocated
    }

    /// The underlying wgpu buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Allocated size in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Typed wrapper for DynamicBuffer with cleaner API
///
/// Sizes are in items rather than bytes.
pub struct TypedBuffer<T> {
    inner: DynamicBuffer,
    _marker: std::marker::PhantomData<T>,
}

impl<T: bytemuck::Pod> TypedBuffer<T> {
    /// Specified initial capacity (in items), never less than one item.
    pub fn with_capacity(
        device: &wgpu::Device,
        label: &str,
        capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let item = size_of::<T>();
        Self {
            inner: DynamicBuffer::new(device, label, item * capacity, item, usage),
            _marker: std::marker::PhantomData,
        }
    }

    /// Write data to buffer, growing if necessary
    ///
    /// Returns `true` if buffer was reallocated (bind groups need recreation)
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) -> bool {
        self.inner.write(device, queue, data)
    }

    /// Grow to hold at least `items` elements without writing anything.
    ///
    /// Returns `true` if buffer was reallocated (bind groups need recreation)
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, items: usize) -> bool {
        self.inner
            .ensure_capacity(device, items * size_of::<T>())
    }

    /// The underlying wgpu buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.inner.buffer()
    }

    /// Capacity in items.
    pub fn capacity(&self) -> usize {
        self.inner.capacity() / size_of::<T>()
    }

    /// Capacity in bytes.
    pub fn byte_capacity(&self) -> u64 {
        self.inner.capacity() as u64
    }
}
