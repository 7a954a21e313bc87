//! GPU rendering subsystem.
//!
//! - `GpuMesh` owns uploaded vertex/index buffers and draws them.
//! - `ShadingProgram` owns a WGSL vertex+fragment pipeline and its named uniforms.
//! - `RenderCtx`/`RenderTarget` are handed out per frame by `core::FrameCtx`.

mod ctx;
mod mesh;
mod program;
mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::GpuMesh;
pub use program::{ProgramDesc, ShadingPass, ShadingProgram};
pub use uniforms::{UniformBlockLayout, UniformKind, UniformSlot};
