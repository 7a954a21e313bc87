//! Named uniform slots over CPU-side staging blocks.
//!
//! A `UniformBlockLayout` mirrors a WGSL struct in the uniform address space.
//! Offsets follow WGSL alignment: scalars align to 4, `vec3`/`vec4`/`mat4x4`
//! to 16, array elements are strided to 16. Writes go into a byte staging
//! buffer that the owning program uploads when a pass ends.

use std::num::NonZeroU64;

/// Uniform member type.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    I32,
    F32,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    #[inline]
    pub const fn size(self) -> u32 {
        match self {
            Self::I32 | Self::F32 => 4,
            Self::Vec3 => 12,
            Self::Vec4 => 16,
            Self::Mat4 => 64,
        }
    }

    #[inline]
    pub const fn align(self) -> u32 {
        match self {
            Self::I32 | Self::F32 => 4,
            Self::Vec3 | Self::Vec4 | Self::Mat4 => 16,
        }
    }
}

#[inline]
pub(crate) const fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

#[derive(Debug, Clone, PartialEq)]
struct UniformField {
    name: String,
    kind: UniformKind,
    offset: u32,
}

/// Field table of one uniform struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlockLayout {
    fields: Vec<UniformField>,
    cursor: u32,
    align: u32,
}

impl UniformBlockLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member.
    pub fn field(mut self, name: impl Into<String>, kind: UniformKind) -> Self {
        let offset = round_up(self.cursor, kind.align());
        self.push(name.into(), kind, offset);
        self.cursor = offset + kind.size();
        self
    }

    /// Appends `array<kind, len>`; elements are addressed as `name[i]`.
    pub fn array(mut self, name: &str, kind: UniformKind, len: u32) -> Self {
        let stride = round_up(kind.size(), 16);
        let base = round_up(self.cursor, 16);
        for i in 0..len {
            self.push(format!("{name}[{i}]"), kind, base + i * stride);
        }
        self.align = self.align.max(16);
        self.cursor = base + len * stride;
        self
    }

    pub fn i32(self, name: impl Into<String>) -> Self {
        self.field(name, UniformKind::I32)
    }

    pub fn f32(self, name: impl Into<String>) -> Self {
        self.field(name, UniformKind::F32)
    }

    pub fn vec3(self, name: impl Into<String>) -> Self {
        self.field(name, UniformKind::Vec3)
    }

    pub fn vec4(self, name: impl Into<String>) -> Self {
        self.field(name, UniformKind::Vec4)
    }

    pub fn mat4(self, name: impl Into<String>) -> Self {
        self.field(name, UniformKind::Mat4)
    }

    fn push(&mut self, name: String, kind: UniformKind, offset: u32) {
        debug_assert!(self.lookup(&name).is_none(), "duplicate uniform `{name}`");
        self.align = self.align.max(kind.align());
        self.fields.push(UniformField { name, kind, offset });
    }

    /// Struct size: end of the last member rounded up to the struct alignment.
    pub fn size(&self) -> u32 {
        round_up(self.cursor, self.align.max(4))
    }

    pub fn min_binding_size(&self) -> NonZeroU64 {
        NonZeroU64::new(u64::from(self.size())).unwrap_or(NonZeroU64::MIN)
    }

    pub fn lookup(&self, name: &str) -> Option<(UniformKind, u32)> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| (f.kind, f.offset))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Which block a slot belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum BlockId {
    /// Written once per pass, shared by all draws.
    Frame,
    /// Snapshotted on every draw.
    Draw,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct SlotTarget {
    block: BlockId,
    kind: UniformKind,
    offset: u32,
}

/// Resolved uniform location, or the invalid slot.
///
/// Writes to the invalid slot are ignored.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot(Option<SlotTarget>);

impl UniformSlot {
    pub const INVALID: Self = Self(None);

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0.is_some()
    }

    pub fn kind(self) -> Option<UniformKind> {
        self.0.map(|t| t.kind)
    }
}

/// Layout plus the staged bytes for one block.
#[derive(Debug, Clone)]
pub(crate) struct UniformBlock {
    layout: UniformBlockLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    pub(crate) fn new(layout: UniformBlockLayout) -> Self {
        let data = vec![0u8; layout.size() as usize];
        Self { layout, data }
    }

    pub(crate) fn layout(&self) -> &UniformBlockLayout {
        &self.layout
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) {
        let start = offset as usize;
        self.data[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

/// The frame and draw blocks of a program, addressed by name.
#[derive(Debug, Clone)]
pub(crate) struct UniformSet {
    pub(crate) frame: UniformBlock,
    pub(crate) draw: UniformBlock,
}

impl UniformSet {
    pub(crate) fn new(frame: UniformBlockLayout, draw: UniformBlockLayout) -> Self {
        Self {
            frame: UniformBlock::new(frame),
            draw: UniformBlock::new(draw),
        }
    }

    /// Frame block wins when both blocks declare the same name.
    pub(crate) fn location(&self, name: &str) -> UniformSlot {
        let found = self
            .frame
            .layout
            .lookup(name)
            .map(|(kind, offset)| (BlockId::Frame, kind, offset))
            .or_else(|| {
                self.draw
                    .layout
                    .lookup(name)
                    .map(|(kind, offset)| (BlockId::Draw, kind, offset))
            });

        UniformSlot(found.map(|(block, kind, offset)| SlotTarget { block, kind, offset }))
    }

    pub(crate) fn write(&mut self, slot: UniformSlot, kind: UniformKind, bytes: &[u8]) {
        let Some(target) = slot.0 else { return };
        if target.kind != kind {
            return;
        }
        debug_assert_eq!(bytes.len() as u32, kind.size());
        let block = match target.block {
            BlockId::Frame => &mut self.frame,
            BlockId::Draw => &mut self.draw,
        };
        block.write(target.offset, bytes);
    }
}
