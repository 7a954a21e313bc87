use anyhow::Result;
use winit::dpi::LogicalSize;

use lumen_engine::device::GpuInit;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::window::{Runtime, RuntimeConfig};

mod camera;
mod config;
mod controls;
mod lights;
mod material;
mod scene;

use config::SceneConfig;
use material::AlbedoPreset;
use scene::PbrScene;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = SceneConfig::default();
    let (width, height) = config.window_size;
    let runtime = RuntimeConfig {
        title: config.title.clone(),
        initial_size: LogicalSize::new(width, height),
        resizable: true,
    };

    let presets: Vec<&str> = AlbedoPreset::ALL.iter().map(|p| p.name()).collect();
    log::info!(
        "controls: {:?} quit, {:?} grid/single sphere, {:?} cycle albedo ({})",
        config.bindings.quit,
        config.bindings.toggle_mode,
        config.bindings.cycle_preset,
        presets.join(" -> ")
    );

    Runtime::run(runtime, GpuInit::default(), PbrScene::new(config))
}
