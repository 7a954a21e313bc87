//! CPU-side mesh construction.
//!
//! Meshes are built once on the CPU and handed to `render::GpuMesh` for upload.
//! Nothing in this module touches the GPU, so it is fully unit-testable.

mod error;
mod mesh;
mod sphere;
mod vertex;

pub use error::MeshError;
pub use mesh::Mesh;
pub use sphere::uv_sphere;
pub use vertex::Vertex;
