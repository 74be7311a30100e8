use wgpu::util::DeviceExt;

use crate::device::{DriverError, checked};

/// Immutable vertex data resident on the device.
///
/// One device buffer per instance, exclusively owned; the payload is
/// uploaded once at creation with static usage and is never rewritten.
/// Dropping the value releases the device buffer.
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    len_bytes: u64,
}

impl VertexBuffer {
    /// Allocates the device buffer and uploads `contents`.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        contents: &[u8],
    ) -> Result<Self, DriverError> {
        let buffer = checked(device, "create_buffer_init(vertex)", file!(), line!(), || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        })?;

        Ok(Self {
            buffer,
            len_bytes: contents.len() as u64,
        })
    }

    /// Rebinds this buffer to vertex slot `slot` for subsequent draws.
    ///
    /// Binding one buffer does not disturb buffers bound at other slots.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) {
        pass.set_vertex_buffer(slot, self.buffer.slice(..));
    }

    pub fn len_bytes(&self) -> u64 {
        self.len_bytes
    }
}

/// Immutable index data resident on the device.
///
/// Same ownership and upload model as [`VertexBuffer`], plus the element
/// count needed by indexed draw calls.
pub struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    /// Allocates the device buffer and uploads `indices`.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        indices: &[u16],
    ) -> Result<Self, DriverError> {
        let buffer = checked(device, "create_buffer_init(index)", file!(), line!(), || {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        })?;

        Ok(Self {
            buffer,
            count: indices.len() as u32,
        })
    }

    /// Rebinds this buffer as the active index buffer for `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_index_buffer(self.buffer.slice(..), wgpu::IndexFormat::Uint16);
    }

    /// Number of indices uploaded; the value to hand to an indexed draw.
    pub fn count(&self) -> u32 {
        self.count
    }
}
