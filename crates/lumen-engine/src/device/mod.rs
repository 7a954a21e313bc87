//! Adapter and device setup, the window surface, and frame acquisition.

mod context;
mod depth;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use depth::DepthTarget;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
