use wgpu::util::DeviceExt;

use crate::geometry::{Mesh, MeshError};

struct MeshBuffers {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
}

/// Device-side copy of a `Mesh`.
///
/// Buffers are created once in `upload` and freed by `release` or on drop,
/// whichever comes first. The vertex layout is `geometry::Vertex::layout()`.
pub struct GpuMesh {
    buffers: Option<MeshBuffers>,
    vertex_count: u32,
    index_count: u32,
}

impl GpuMesh {
    /// Fails if the mesh is too large for a single `u32` indexed draw.
    pub fn upload(device: &wgpu::Device, mesh: &Mesh) -> Result<Self, MeshError> {
        let vertex_count = draw_range(mesh.vertex_count())?;
        let index_count = draw_range(mesh.index_count())?;

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen mesh vbo"),
            contents: bytemuck::cast_slice(mesh.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lumen mesh ibo"),
            contents: bytemuck::cast_slice(mesh.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!("uploaded mesh: {vertex_count} vertices, {index_count} indices");

        Ok(Self {
            buffers: Some(MeshBuffers { vbo, ibo }),
            vertex_count,
            index_count,
        })
    }

    /// A handle that owns nothing. Drawing and releasing it are no-ops.
    pub fn empty() -> Self {
        Self {
            buffers: None,
            vertex_count: 0,
            index_count: 0,
        }
    }

    #[inline]
    pub fn is_resident(&self) -> bool {
        self.buffers.is_some()
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the buffers and issues one indexed draw over the whole mesh.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        let Some(buffers) = self.buffers.as_ref() else { return };
        if self.index_count == 0 {
            return;
        }

        rpass.set_vertex_buffer(0, buffers.vbo.slice(..));
        rpass.set_index_buffer(buffers.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Frees the device buffers. Safe to call any number of times.
    pub fn release(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            buffers.vbo.destroy();
            buffers.ibo.destroy();
            log::debug!("released mesh ({} indices)", self.index_count);
        }
        self.vertex_count = 0;
        self.index_count = 0;
    }
}

fn draw_range(count: usize) -> Result<u32, MeshError> {
    u32::try_from(count).map_err(|_| MeshError::DrawRangeOverflow { count })
}

impl Default for GpuMesh {
    fn default() -> Self {
        Self::empty()
    }
}

impl Drop for GpuMesh {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_handle_release_is_idempotent() {
        let mut mesh = GpuMesh::empty();
        assert!(!mesh.is_resident());
        mesh.release();
        mesh.release();
        assert_eq!(mesh.index_count(), 0);
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn draw_range_rejects_counts_past_u32() {
        assert_eq!(draw_range(0), Ok(0));
        assert_eq!(draw_range(u32::MAX as usize), Ok(u32::MAX));
        let count = u32::MAX as usize + 1;
        assert_eq!(draw_range(count), Err(MeshError::DrawRangeOverflow { count }));
    }
}
