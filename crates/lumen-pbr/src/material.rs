//! Material presets, display mode and the metallic/roughness grid.

use glam::{Mat4, Vec3};

/// Albedo preset, cycled with a key press.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum AlbedoPreset {
    #[default]
    Brass,
    Copper,
    Bronze,
}

impl AlbedoPreset {
    pub const ALL: [AlbedoPreset; 3] = [Self::Brass, Self::Copper, Self::Bronze];

    /// Next preset in the cycle, wrapping to the first.
    pub fn next(self) -> Self {
        match self {
            Self::Brass => Self::Copper,
            Self::Copper => Self::Bronze,
            Self::Bronze => Self::Brass,
        }
    }

    /// Albedo in display (gamma) space.
    pub fn albedo_srgb(self) -> Vec3 {
        match self {
            Self::Brass => Vec3::new(1.0, 0.886, 0.608),
            Self::Copper => Vec3::new(0.955, 0.638, 0.538),
            Self::Bronze => Vec3::new(0.804, 0.498, 0.196),
        }
    }

    /// Albedo ready for shading.
    pub fn albedo_linear(self) -> Vec3 {
        srgb_to_linear(self.albedo_srgb())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Brass => "brass",
            Self::Copper => "copper",
            Self::Bronze => "bronze",
        }
    }
}

/// Gamma 2.2 approximation of the sRGB decode curve, per channel.
pub fn srgb_to_linear(c: Vec3) -> Vec3 {
    Vec3::new(c.x.powf(2.2), c.y.powf(2.2), c.z.powf(2.2))
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DisplayMode {
    #[default]
    Grid,
    SingleSphere,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Grid => Self::SingleSphere,
            Self::SingleSphere => Self::Grid,
        }
    }
}

/// Everything the key bindings can change.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct MaterialState {
    pub mode: DisplayMode,
    pub preset: AlbedoPreset,
}

/// Lowest roughness in the grid; zero roughness is a singular GGX lobe.
pub const ROUGHNESS_FLOOR: f32 = 0.05;

/// Sphere grid: metallic grows down the rows, roughness across the columns.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub spacing: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 5,
            cols: 5,
            spacing: 2.2,
        }
    }
}

/// One sphere of the grid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridCell {
    pub row: u32,
    pub col: u32,
    pub translation: Vec3,
    pub metallic: f32,
    pub roughness: f32,
}

impl GridLayout {
    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// 0 at row 0, 1 at the last row.
    pub fn metallic(&self, row: u32) -> f32 {
        unit_step(row, self.rows)
    }

    /// `ROUGHNESS_FLOOR` at column 0, 1 at the last column.
    pub fn roughness(&self, col: u32) -> f32 {
        ROUGHNESS_FLOOR + unit_step(col, self.cols) * (1.0 - ROUGHNESS_FLOOR)
    }

    /// Grid centered on the origin in the XY plane, row 0 on top.
    ///
    /// Indices past the last row or column continue the lattice outward.
    pub fn translation(&self, row: u32, col: u32) -> Vec3 {
        let last_col = self.cols.saturating_sub(1) as f32;
        let last_row = self.rows.saturating_sub(1) as f32;
        let x = (col as f32 - 0.5 * last_col) * self.spacing;
        let y = (0.5 * last_row - row as f32) * self.spacing;
        Vec3::new(x, y, 0.0)
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| GridCell {
                row,
                col,
                translation: self.translation(row, col),
                metallic: self.metallic(row),
                roughness: self.roughness(col),
            })
        })
    }
}

/// `i / (n - 1)`, or 0 when there is a single step.
fn unit_step(i: u32, n: u32) -> f32 {
    if n <= 1 {
        0.0
    } else {
        i as f32 / (n - 1) as f32
    }
}

/// One sphere to draw this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawInstance {
    pub model: Mat4,
    pub metallic: f32,
    pub roughness: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    // ── presets ───────────────────────────────────────────────────────────

    #[test]
    fn preset_cycle_has_length_three() {
        let start = AlbedoPreset::default();
        assert_eq!(start, AlbedoPreset::Brass);
        let mut p = start;
        for _ in 0..3 {
            p = p.next();
        }
        assert_eq!(p, start);
        assert_eq!(start.next(), AlbedoPreset::Copper);
        assert_eq!(start.next().next(), AlbedoPreset::Bronze);
    }

    #[test]
    fn presets_are_distinct() {
        let a: Vec<Vec3> = AlbedoPreset::ALL.iter().map(|p| p.albedo_srgb()).collect();
        assert_ne!(a[0], a[1]);
        assert_ne!(a[1], a[2]);
        assert_ne!(a[0], a[2]);
    }

    #[test]
    fn linear_conversion() {
        let lin = srgb_to_linear(Vec3::new(0.0, 0.5, 1.0));
        assert_eq!(lin.x, 0.0);
        assert!((lin.y - 0.5f32.powf(2.2)).abs() < EPS);
        assert!((lin.z - 1.0).abs() < EPS);

        // Darkens every non-saturated channel.
        let brass = AlbedoPreset::Brass;
        assert!(brass.albedo_linear().y < brass.albedo_srgb().y);
    }

    // ── mode ──────────────────────────────────────────────────────────────

    #[test]
    fn mode_toggles_back_and_forth() {
        let m = DisplayMode::default();
        assert_eq!(m, DisplayMode::Grid);
        assert_eq!(m.toggled(), DisplayMode::SingleSphere);
        assert_eq!(m.toggled().toggled(), DisplayMode::Grid);
    }

    // ── grid ──────────────────────────────────────────────────────────────

    #[test]
    fn metallic_spans_rows() {
        let g = GridLayout::default();
        assert_eq!(g.metallic(0), 0.0);
        assert!((g.metallic(2) - 0.5).abs() < EPS);
        assert_eq!(g.metallic(4), 1.0);
    }

    #[test]
    fn roughness_spans_columns_with_floor() {
        let g = GridLayout::default();
        assert!((g.roughness(0) - 0.05).abs() < EPS);
        assert!((g.roughness(2) - 0.525).abs() < EPS);
        assert!((g.roughness(4) - 1.0).abs() < EPS);
    }

    #[test]
    fn grid_is_centered_with_row_zero_on_top() {
        let g = GridLayout::default();
        let top_left = g.translation(0, 0);
        let bottom_right = g.translation(4, 4);
        assert!((top_left - Vec3::new(-4.4, 4.4, 0.0)).length() < 1e-5);
        assert!((bottom_right - Vec3::new(4.4, -4.4, 0.0)).length() < 1e-5);
        assert!(g.translation(2, 2).length() < 1e-5);
    }

    #[test]
    fn translation_outside_grid_extends_lattice() {
        let g = GridLayout::default();
        let below = g.translation(5, 0);
        assert!((below - Vec3::new(-4.4, -6.6, 0.0)).length() < 1e-5);

        let empty = GridLayout {
            rows: 0,
            cols: 0,
            spacing: 2.2,
        };
        assert!(empty.translation(0, 0).length() < 1e-5);
        assert!((empty.translation(1, 1) - Vec3::new(2.2, -2.2, 0.0)).length() < 1e-5);
    }

    #[test]
    fn cells_cover_grid_in_row_major_order() {
        let g = GridLayout { rows: 2, cols: 3, spacing: 1.0 };
        let cells: Vec<GridCell> = g.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!((cells[0].row, cells[0].col), (0, 0));
        assert_eq!((cells[2].row, cells[2].col), (0, 2));
        assert_eq!((cells[3].row, cells[3].col), (1, 0));
        assert_eq!(cells[5].metallic, 1.0);
        assert!((cells[5].roughness - 1.0).abs() < EPS);
    }

    #[test]
    fn single_row_and_column_do_not_divide_by_zero() {
        let g = GridLayout { rows: 1, cols: 1, spacing: 2.0 };
        assert_eq!(g.metallic(0), 0.0);
        assert!((g.roughness(0) - ROUGHNESS_FLOOR).abs() < EPS);
        assert_eq!(g.translation(0, 0), Vec3::ZERO);
    }
}
