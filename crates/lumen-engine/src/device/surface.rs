use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::{GpuInit, SurfaceErrorAction};

/// Window surface together with the configuration last applied to it.
///
/// `size` tracks the window even while it is minimized; `config` only ever
/// holds a non-zero extent because wgpu rejects 0x0 surfaces.
pub(crate) struct SurfaceState<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> SurfaceState<'w> {
    pub(crate) fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        init: &GpuInit,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.prefer_srgb)
            .context("surface reports no supported formats")?;
        let alpha_mode = pick_alpha_mode(&caps.alpha_modes, init.alpha_mode);
        log::debug!("surface format {format:?}, alpha {alpha_mode:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode,
            view_formats: Vec::new(),
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn has_area(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Records the new size and reconfigures when it has area. Returns whether
    /// the surface was reconfigured.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) -> bool {
        self.size = size;
        if !self.has_area() {
            return false;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
        true
    }

    pub(crate) fn acquire(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// Lost and outdated surfaces are reconfigured in place.
    pub(crate) fn recover(&self, device: &wgpu::Device, err: &wgpu::SurfaceError) -> SurfaceErrorAction {
        let action = classify(err);
        if action == SurfaceErrorAction::Reconfigured && self.has_area() {
            self.surface.configure(device, &self.config);
        }
        action
    }
}

fn classify(err: &wgpu::SurfaceError) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => SurfaceErrorAction::Reconfigured,
        wgpu::SurfaceError::OutOfMemory => SurfaceErrorAction::Fatal,
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => SurfaceErrorAction::SkipFrame,
    }
}

/// First sRGB 8-bit format when preferred, else whatever the surface lists first.
fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| {
        matches!(
            f,
            wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
        )
    });
    match srgb {
        Some(f) if prefer_srgb => Some(f),
        _ => formats.first().copied(),
    }
}

fn pick_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode as Alpha, TextureFormat as Fmt};

    #[test]
    fn srgb_is_picked_when_preferred() {
        let formats = [Fmt::Bgra8Unorm, Fmt::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(Fmt::Rgba8UnormSrgb));
        assert_eq!(pick_format(&formats, false), Some(Fmt::Bgra8Unorm));
    }

    #[test]
    fn falls_back_to_first_format() {
        assert_eq!(pick_format(&[Fmt::Rgba16Float], true), Some(Fmt::Rgba16Float));
        assert_eq!(pick_format(&[], true), None);
    }

    #[test]
    fn unsupported_alpha_request_is_ignored() {
        let supported = [Alpha::Opaque, Alpha::PreMultiplied];
        assert_eq!(pick_alpha_mode(&supported, Some(Alpha::PreMultiplied)), Alpha::PreMultiplied);
        assert_eq!(pick_alpha_mode(&supported, Some(Alpha::PostMultiplied)), Alpha::Opaque);
        assert_eq!(pick_alpha_mode(&[], None), Alpha::Auto);
    }

    #[test]
    fn surface_errors_map_to_actions() {
        assert_eq!(classify(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify(&wgpu::SurfaceError::Outdated), SurfaceErrorAction::Reconfigured);
        assert_eq!(classify(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert!(classify(&wgpu::SurfaceError::OutOfMemory).is_fatal());
    }
}
