use glam::Vec3;

use crate::controls::Bindings;
use crate::material::GridLayout;

/// Fixed camera placement and projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 13.6),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Material and transform used in single-sphere mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleSphereConfig {
    pub scale: f32,
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for SingleSphereConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            metallic: 1.0,
            roughness: 0.2,
        }
    }
}

/// Scene configuration. Everything here is fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub title: String,
    /// Logical window size; also fixes the projection aspect ratio.
    pub window_size: (f64, f64),

    pub sphere_stacks: u32,
    pub sphere_slices: u32,

    pub grid: GridLayout,
    pub single: SingleSphereConfig,
    pub camera: CameraConfig,

    pub ambient_occlusion: f32,
    pub clear_color: wgpu::Color,

    pub bindings: Bindings,
}

impl SceneConfig {
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.window_size;
        if h <= 0.0 { 1.0 } else { (w / h) as f32 }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            title: "Lab 2 - Physically Based Rendering (PBR)".to_string(),
            window_size: (900.0, 650.0),
            sphere_stacks: 32,
            sphere_slices: 64,
            grid: GridLayout::default(),
            single: SingleSphereConfig::default(),
            camera: CameraConfig::default(),
            ambient_occlusion: 1.0,
            clear_color: wgpu::Color {
                r: 0.08,
                g: 0.08,
                b: 0.10,
                a: 1.0,
            },
            bindings: Bindings::default(),
        }
    }
}
