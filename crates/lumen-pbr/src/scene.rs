//! The PBR sphere scene: input, per-frame uniforms and draw dispatch.

use anyhow::{Context, Result};
use glam::{Mat4, Vec3};

use lumen_engine::core::{App, AppControl, FrameCtx};
use lumen_engine::geometry::{uv_sphere, Vertex};
use lumen_engine::render::{
    GpuMesh, ProgramDesc, RenderCtx, ShadingProgram, UniformBlockLayout, UniformKind, UniformSlot,
};

use crate::camera::Camera;
use crate::config::{SceneConfig, SingleSphereConfig};
use crate::controls::{Action, Controls};
use crate::lights::{light_positions, LIGHT_COUNT, LIGHT_INTENSITIES};
use crate::material::{DisplayMode, DrawInstance, GridLayout, MaterialState};

const VERTEX_SHADER: &str = include_str!("shaders/pbr.vert.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/pbr.frag.wgsl");

/// Mirrors `FrameUniforms` in the shaders.
pub fn frame_layout() -> UniformBlockLayout {
    UniformBlockLayout::new()
        .mat4("view")
        .mat4("proj")
        .vec3("cam_pos")
        .i32("light_count")
        .vec3("albedo")
        .f32("ao")
        .array("light_pos", UniformKind::Vec3, LIGHT_COUNT as u32)
        .array("light_color", UniformKind::Vec3, LIGHT_COUNT as u32)
}

/// Mirrors `DrawUniforms` in the shaders.
pub fn draw_layout() -> UniformBlockLayout {
    UniformBlockLayout::new()
        .mat4("model")
        .f32("metallic")
        .f32("roughness")
}

struct Slots {
    view: UniformSlot,
    proj: UniformSlot,
    cam_pos: UniformSlot,
    light_count: UniformSlot,
    light_pos: [UniformSlot; LIGHT_COUNT],
    light_color: [UniformSlot; LIGHT_COUNT],
    albedo: UniformSlot,
    ao: UniformSlot,
    model: UniformSlot,
    metallic: UniformSlot,
    roughness: UniformSlot,
}

impl Slots {
    fn resolve(mut locate: impl FnMut(&str) -> UniformSlot) -> Self {
        Self {
            view: locate("view"),
            proj: locate("proj"),
            cam_pos: locate("cam_pos"),
            light_count: locate("light_count"),
            light_pos: std::array::from_fn(|i| locate(&format!("light_pos[{i}]"))),
            light_color: std::array::from_fn(|i| locate(&format!("light_color[{i}]"))),
            albedo: locate("albedo"),
            ao: locate("ao"),
            model: locate("model"),
            metallic: locate("metallic"),
            roughness: locate("roughness"),
        }
    }
}

struct SceneGpu {
    program: ShadingProgram,
    sphere: GpuMesh,
    slots: Slots,
}

/// Spheres to draw for the current mode.
pub fn draw_instances(mode: DisplayMode, grid: &GridLayout, single: &SingleSphereConfig) -> Vec<DrawInstance> {
    match mode {
        DisplayMode::SingleSphere => vec![DrawInstance {
            model: Mat4::from_scale(Vec3::splat(single.scale)),
            metallic: single.metallic,
            roughness: single.roughness,
        }],
        DisplayMode::Grid => grid
            .cells()
            .map(|cell| DrawInstance {
                model: Mat4::from_translation(cell.translation),
                metallic: cell.metallic,
                roughness: cell.roughness,
            })
            .collect(),
    }
}

pub struct PbrScene {
    config: SceneConfig,
    camera: Camera,
    controls: Controls,
    state: MaterialState,
    gpu: Option<SceneGpu>,
}

impl PbrScene {
    pub fn new(config: SceneConfig) -> Self {
        let camera = Camera::new(&config.camera, config.aspect_ratio());
        let controls = Controls::new(config.bindings.clone());
        Self {
            config,
            camera,
            controls,
            state: MaterialState::default(),
            gpu: None,
        }
    }

    /// Applies fired actions in order. Returns `Exit` if quit fired.
    fn apply(&mut self, actions: &[Action]) -> AppControl {
        let mut control = AppControl::Continue;
        for action in actions {
            match action {
                Action::Quit => control = AppControl::Exit,
                Action::ToggleMode => {
                    self.state.mode = self.state.mode.toggled();
                    log::info!("display mode: {:?}", self.state.mode);
                }
                Action::CyclePreset => {
                    self.state.preset = self.state.preset.next();
                    log::info!("albedo preset: {}", self.state.preset.name());
                }
            }
        }
        control
    }
}

impl App for PbrScene {
    fn on_gpu_ready(&mut self, ctx: &RenderCtx<'_>) -> Result<()> {
        let mesh = uv_sphere(self.config.sphere_stacks, self.config.sphere_slices)
            .context("failed to build sphere mesh")?;
        let sphere = GpuMesh::upload(ctx.device, &mesh).context("failed to upload sphere mesh")?;

        let program = ShadingProgram::new(
            ctx,
            ProgramDesc {
                label: "pbr",
                vertex_source: VERTEX_SHADER,
                fragment_source: FRAGMENT_SHADER,
                frame_uniforms: frame_layout(),
                draw_uniforms: draw_layout(),
                vertex_layout: Vertex::layout(),
                cull_mode: Some(wgpu::Face::Back),
            },
        )
        .context("failed to create PBR program")?;

        let slots = Slots::resolve(|name| program.uniform_location(name));

        log::info!(
            "scene ready: {} triangles per sphere, {} grid cells",
            mesh.triangle_count(),
            self.config.grid.cell_count()
        );

        self.gpu = Some(SceneGpu {
            program,
            sphere,
            slots,
        });
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let actions = self.controls.poll(ctx.input);
        if self.apply(&actions) == AppControl::Exit {
            log::info!("quit requested");
            return AppControl::Exit;
        }

        let Some(gpu) = self.gpu.as_mut() else {
            return AppControl::Continue;
        };

        let lights = light_positions(ctx.time.elapsed);
        let instances = draw_instances(self.state.mode, &self.config.grid, &self.config.single);
        let albedo = self.state.preset.albedo_linear();
        let ao = self.config.ambient_occlusion;
        let clear = self.config.clear_color;
        let camera = self.camera;

        ctx.render(|rctx, target| {
            let SceneGpu {
                program,
                sphere,
                slots,
            } = gpu;

            let mut pass = program.begin_pass(rctx, target, clear, instances.len() as u32);

            pass.set_mat4(slots.view, &camera.view);
            pass.set_mat4(slots.proj, &camera.proj);
            pass.set_vec3(slots.cam_pos, camera.position);

            pass.set_i32(slots.light_count, LIGHT_COUNT as i32);
            for i in 0..LIGHT_COUNT {
                pass.set_vec3(slots.light_pos[i], lights[i]);
                pass.set_vec3(slots.light_color[i], LIGHT_INTENSITIES[i]);
            }

            pass.set_vec3(slots.albedo, albedo);
            pass.set_f32(slots.ao, ao);

            for inst in &instances {
                pass.set_mat4(slots.model, &inst.model);
                pass.set_f32(slots.metallic, inst.metallic);
                pass.set_f32(slots.roughness, inst.roughness);
                pass.draw(sphere);
            }

            debug_assert_eq!(pass.draw_count() as usize, instances.len());
            pass.finish();
        })
    }

    fn on_exit(&mut self) {
        if let Some(mut gpu) = self.gpu.take() {
            gpu.sphere.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_engine::input::InputState;

    fn scene() -> PbrScene {
        PbrScene::new(SceneConfig::default())
    }

    // ── actions ───────────────────────────────────────────────────────────

    #[test]
    fn toggle_flips_mode_and_back() {
        let mut s = scene();
        assert_eq!(s.state.mode, DisplayMode::Grid);
        s.apply(&[Action::ToggleMode]);
        assert_eq!(s.state.mode, DisplayMode::SingleSphere);
        s.apply(&[Action::ToggleMode]);
        assert_eq!(s.state.mode, DisplayMode::Grid);
    }

    #[test]
    fn three_cycles_restore_preset() {
        let mut s = scene();
        let start = s.state.preset;
        for _ in 0..3 {
            s.apply(&[Action::CyclePreset]);
        }
        assert_eq!(s.state.preset, start);
    }

    #[test]
    fn quit_exits_without_touching_state() {
        let mut s = scene();
        assert_eq!(s.apply(&[Action::Quit]), AppControl::Exit);
        assert_eq!(s.state, MaterialState::default());
        assert_eq!(s.apply(&[]), AppControl::Continue);
    }

    #[test]
    fn held_toggle_key_flips_mode_once_per_press() {
        let mut s = scene();
        let mut input = InputState::default();
        let g = s.config.bindings.toggle_mode;

        input.keys_down.insert(g);
        for _ in 0..5 {
            let actions = s.controls.poll(&input);
            s.apply(&actions);
        }
        assert_eq!(s.state.mode, DisplayMode::SingleSphere);

        input.keys_down.remove(&g);
        let actions = s.controls.poll(&input);
        s.apply(&actions);
        assert_eq!(s.state.mode, DisplayMode::SingleSphere);

        input.keys_down.insert(g);
        for _ in 0..3 {
            let actions = s.controls.poll(&input);
            s.apply(&actions);
        }
        assert_eq!(s.state.mode, DisplayMode::Grid);
    }

    // ── draws ─────────────────────────────────────────────────────────────

    #[test]
    fn grid_mode_draws_every_cell() {
        let cfg = SceneConfig::default();
        let draws = draw_instances(DisplayMode::Grid, &cfg.grid, &cfg.single);
        assert_eq!(draws.len(), 25);

        assert_eq!(draws[0].metallic, 0.0);
        assert!((draws[0].roughness - 0.05).abs() < 1e-6);
        assert_eq!(draws[24].metallic, 1.0);
        assert!((draws[24].roughness - 1.0).abs() < 1e-6);

        let top_left = draws[0].model.transform_point3(Vec3::ZERO);
        assert!((top_left - Vec3::new(-4.4, 4.4, 0.0)).length() < 1e-5);
    }

    #[test]
    fn single_mode_draws_one_scaled_sphere() {
        let cfg = SceneConfig::default();
        let draws = draw_instances(DisplayMode::SingleSphere, &cfg.grid, &cfg.single);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].metallic, 1.0);
        assert_eq!(draws[0].roughness, 0.2);
        assert_eq!(draws[0].model.transform_point3(Vec3::X), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(draws[0].model.transform_point3(Vec3::ZERO), Vec3::ZERO);
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn every_slot_name_exists_in_a_layout() {
        let frame = frame_layout();
        let draw = draw_layout();
        let mut missing = Vec::new();
        Slots::resolve(|name| {
            if frame.lookup(name).is_none() && draw.lookup(name).is_none() {
                missing.push(name.to_string());
            }
            UniformSlot::INVALID
        });
        assert!(missing.is_empty(), "missing uniforms: {missing:?}");
    }

    /// Parses and validates a shader, then checks that the named WGSL struct
    /// has exactly the members, kinds and offsets of `layout`.
    fn assert_struct_matches(source: &str, struct_name: &str, layout: &UniformBlockLayout) {
        use naga::{ArraySize, ScalarKind, TypeInner, VectorSize};

        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{struct_name}: {e:?}"));

        let kind_of = |inner: &TypeInner| match inner {
            TypeInner::Scalar(s) if s.kind == ScalarKind::Sint => Some(UniformKind::I32),
            TypeInner::Scalar(s) if s.kind == ScalarKind::Float => Some(UniformKind::F32),
            TypeInner::Vector { size: VectorSize::Tri, .. } => Some(UniformKind::Vec3),
            TypeInner::Vector { size: VectorSize::Quad, .. } => Some(UniformKind::Vec4),
            TypeInner::Matrix {
                columns: VectorSize::Quad,
                rows: VectorSize::Quad,
                ..
            } => Some(UniformKind::Mat4),
            _ => None,
        };

        let (members, span) = module
            .types
            .iter()
            .find_map(|(_, ty)| match &ty.inner {
                TypeInner::Struct { members, span } if ty.name.as_deref() == Some(struct_name) => {
                    Some((members, *span))
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no struct `{struct_name}`"));

        assert_eq!(span, layout.size(), "{struct_name} size");

        let mut covered = 0;
        for member in members {
            let name = member.name.as_deref().unwrap_or_default();
            match &module.types[member.ty].inner {
                TypeInner::Array {
                    base,
                    size: ArraySize::Constant(len),
                    stride,
                } => {
                    let kind = kind_of(&module.types[*base].inner)
                        .unwrap_or_else(|| panic!("{name}: unsupported element type"));
                    for i in 0..len.get() {
                        let expected = (kind, member.offset + i * stride);
                        assert_eq!(layout.lookup(&format!("{name}[{i}]")), Some(expected), "{name}[{i}]");
                        covered += 1;
                    }
                }
                inner => {
                    let kind = kind_of(inner).unwrap_or_else(|| panic!("{name}: unsupported type"));
                    assert_eq!(layout.lookup(name), Some((kind, member.offset)), "{name}");
                    covered += 1;
                }
            }
        }
        assert_eq!(covered, layout.len(), "{struct_name}: layout has fields the shader lacks");
    }

    #[test]
    fn vertex_shader_structs_match_layouts() {
        assert_struct_matches(VERTEX_SHADER, "FrameUniforms", &frame_layout());
        assert_struct_matches(VERTEX_SHADER, "DrawUniforms", &draw_layout());
    }

    #[test]
    fn fragment_shader_structs_match_layouts() {
        assert_struct_matches(FRAGMENT_SHADER, "FrameUniforms", &frame_layout());
        assert_struct_matches(FRAGMENT_SHADER, "DrawUniforms", &draw_layout());
    }

    #[test]
    fn shaders_export_entry_points() {
        let vs = naga::front::wgsl::parse_str(VERTEX_SHADER).unwrap();
        let fs = naga::front::wgsl::parse_str(FRAGMENT_SHADER).unwrap();
        assert!(vs.entry_points.iter().any(|e| e.name == "vs_main" && e.stage == naga::ShaderStage::Vertex));
        assert!(fs.entry_points.iter().any(|e| e.name == "fs_main" && e.stage == naga::ShaderStage::Fragment));
    }
}
