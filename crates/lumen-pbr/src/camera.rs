use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

/// View and projection computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub view: Mat4,
    pub proj: Mat4,
}

impl Camera {
    /// Right-handed view; projection maps depth to wgpu's `[0, 1]` range.
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let view = Mat4::look_at_rh(config.position, config.target, config.up);
        let proj = Mat4::perspective_rh(
            config.fov_y_degrees.to_radians(),
            aspect.max(f32::EPSILON),
            config.near,
            config.far,
        );

        Self {
            position: config.position,
            view,
            proj,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_proj(cam: &Camera) -> Mat4 {
        cam.proj * cam.view
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = Camera::new(&CameraConfig::default(), 900.0 / 650.0);
        let clip = view_proj(&cam) * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn whole_grid_is_in_view() {
        let cam = Camera::new(&CameraConfig::default(), 900.0 / 650.0);
        // Outer sphere surfaces of the default 5x5 grid.
        for p in [Vec3::new(-5.4, 5.4, 0.0), Vec3::new(5.4, -5.4, 0.0)] {
            let clip = view_proj(&cam) * p.extend(1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{p} -> {ndc}");
        }
    }
}
