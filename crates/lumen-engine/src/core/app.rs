use anyhow::Result;
use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::render::RenderCtx;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called once after the window and GPU exist, before the first frame.
    ///
    /// Create device resources (meshes, pipelines) here. An error is fatal:
    /// the runtime stops and `Runtime::run` returns it.
    fn on_gpu_ready(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once when the loop exits, while the GPU is still alive.
    fn on_exit(&mut self) {}
}
