//! Lumen engine crate.
//!
//! Owns the platform + GPU runtime pieces used by the demo binaries:
//! windowing and the frame loop, keyboard state, frame timing, CPU mesh
//! construction, and the wgpu mesh/shader wrappers.

pub mod core;
pub mod device;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
