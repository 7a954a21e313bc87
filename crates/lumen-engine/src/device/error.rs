/// Outcome of a failed frame acquisition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was lost or outdated and has been configured again.
    Reconfigured,
    /// Try again next frame.
    SkipFrame,
    /// Out of memory. Stop rendering.
    Fatal,
}

impl SurfaceErrorAction {
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }
}
