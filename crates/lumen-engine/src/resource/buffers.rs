use crate::device::ComputeContext;
use crate::scene::{ColorRecord, SceneObject};

use super::ResourceError;

const COLOR_RECORD_SIZE: u64 = std::mem::size_of::<ColorRecord>() as u64;
const SCENE_OBJECT_SIZE: u64 = std::mem::size_of::<SceneObject>() as u64;

/// Device-resident image the kernel writes, one [`ColorRecord`] per pixel.
pub struct OutputBuffer {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl OutputBuffer {
    /// Allocates `width * height * size_of::<ColorRecord>()` bytes.
    pub fn allocate(ctx: &ComputeContext, width: u32, height: u32) -> Result<Self, ResourceError> {
        let pixels = u64::from(width) * u64::from(height);
        if pixels == 0 {
            return Err(ResourceError::EmptyImage { width, height });
        }

        let size = pixels * COLOR_RECORD_SIZE;
        check_storage_size(ctx, "output buffer", size)?;

        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen output"),
            size,
            // Device writes it; the host only copies it out.
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        log::debug!("allocated output buffer: {width}x{height}, {size} bytes");

        Ok(Self {
            buffer,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Device-resident, kernel-read-only copy of the scene.
pub struct SceneBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl SceneBuffer {
    /// Allocates room for `count` scene objects.
    pub fn allocate(ctx: &ComputeContext, count: usize) -> Result<Self, ResourceError> {
        if count == 0 {
            return Err(ResourceError::EmptyScene);
        }

        let size = count as u64 * SCENE_OBJECT_SIZE;
        check_storage_size(ctx, "scene buffer", size)?;

        let buffer = ctx.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("lumen scene"),
            size,
            // COPY_SRC lets the upload be verified by reading it back.
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        log::debug!("allocated scene buffer: {count} objects, {size} bytes");

        Ok(Self {
            buffer,
            capacity: count,
        })
    }

    /// Copies `scene` into the buffer and blocks until the device has it.
    ///
    /// Must complete before any kernel reading the buffer is enqueued.
    pub fn upload(&self, ctx: &ComputeContext, scene: &[SceneObject]) -> Result<(), ResourceError> {
        if scene.len() > self.capacity {
            return Err(ResourceError::UploadOverflow {
                len: scene.len(),
                capacity: self.capacity,
            });
        }

        ctx.queue()
            .write_buffer(&self.buffer, 0, bytemuck::cast_slice(scene));
        ctx.submit_and_wait(std::iter::empty())?;

        log::debug!("uploaded {} scene objects", scene.len());
        Ok(())
    }

    /// Number of objects the buffer was sized for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

fn check_storage_size(
    ctx: &ComputeContext,
    label: &'static str,
    size: u64,
) -> Result<(), ResourceError> {
    let limits = ctx.limits();
    let max = u64::from(limits.max_buffer_size)
        .min(u64::from(limits.max_storage_buffer_binding_size));
    if size > max {
        return Err(ResourceError::BufferTooLarge { label, size, max });
    }
    Ok(())
}
