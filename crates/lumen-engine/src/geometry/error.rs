use thiserror::Error;

/// Reasons a mesh cannot be built.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum MeshError {
    #[error("sphere needs at least one stack")]
    ZeroStacks,

    #[error("sphere needs at least one slice")]
    ZeroSlices,

    #[error("{stacks}x{slices} sphere has more vertices than u32 indices can address")]
    TooManyVertices { stacks: u32, slices: u32 },

    #[error("{stacks}x{slices} sphere has more indices than one u32 draw can cover")]
    TooManyIndices { stacks: u32, slices: u32 },

    #[error("{count} elements exceed the u32 draw range")]
    DrawRangeOverflow { count: usize },
}
