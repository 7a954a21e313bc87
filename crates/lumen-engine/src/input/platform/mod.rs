//! Window-system adapters.

pub(crate) mod winit;
