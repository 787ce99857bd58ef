use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::SessionError;
use crate::types::{GpuOptions, GpuPowerPreference, Viewport};

pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
    max_dimension: u32,
}

impl GpuContext {
    pub(crate) fn new<T>(
        target: Arc<T>,
        initial_size: Viewport,
        options: GpuOptions,
    ) -> Result<Self, SessionError>
    where
        T: HasDisplayHandle + HasWindowHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let surface = instance
            .create_surface(target)
            .map_err(|err| unavailable("failed to create rendering surface", err))?;

        let power_preference = match options.power {
            GpuPowerPreference::Low => wgpu::PowerPreference::LowPower,
            GpuPowerPreference::High => wgpu::PowerPreference::HighPerformance,
        };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| unavailable("failed to find a suitable GPU adapter", err))?;

        let adapter_info = adapter.get_info();
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            "selected GPU adapter"
        );

        let limits = adapter.limits();
        let max_dimension = limits.max_texture_dimension_2d;

        let surface_caps = surface.get_capabilities(&adapter);
        // Colours are authored for direct display, so prefer a non-sRGB target.
        let surface_format = match surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
        {
            Some(format) => format,
            None => {
                let fallback = surface_caps.formats.first().copied().ok_or_else(|| {
                    SessionError::ContextUnavailable(
                        "surface reports no supported formats for this adapter".to_string(),
                    )
                })?;
                tracing::warn!(
                    ?fallback,
                    "no linear (non-sRGB) surface format available; falling back to {:?}",
                    fallback
                );
                fallback
            }
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("cosmos device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| unavailable("failed to create GPU device", err))?;

        let present_mode = choose_present_mode(&surface_caps.present_modes, options.vsync);
        let alpha_mode = choose_alpha_mode(&surface_caps.alpha_modes, options.transparent);
        tracing::debug!(?present_mode, ?alpha_mode, "configuring surface");

        let size = clamp_size(initial_size, max_dimension);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            surface_format,
            max_dimension,
        })
    }

    pub(crate) fn size(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    pub(crate) fn resize(&mut self, new_size: Viewport) {
        if new_size.is_empty() {
            return;
        }
        let size = clamp_size(new_size, self.max_dimension);
        if size != new_size {
            tracing::warn!(requested = %new_size, clamped = %size, "surface size exceeds GPU limits");
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
    }

    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> SessionError {
    SessionError::ContextUnavailable(format!("{context}: {err}"))
}

/// Clamps to `[1, max_dimension]` on both axes.
fn clamp_size(size: Viewport, max_dimension: u32) -> Viewport {
    let max_dimension = max_dimension.max(1);
    Viewport::new(
        size.width.clamp(1, max_dimension),
        size.height.clamp(1, max_dimension),
    )
}

/// Fifo when vsync is requested; otherwise Immediate, then Mailbox.
fn choose_present_mode(modes: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    let find = |wanted: wgpu::PresentMode| modes.iter().copied().find(|mode| *mode == wanted);
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    find(wgpu::PresentMode::Immediate)
        .or_else(|| find(wgpu::PresentMode::Mailbox))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Picks a compositing alpha mode when the surface should let the desktop
/// show through.
fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    transparent: bool,
) -> wgpu::CompositeAlphaMode {
    let first = modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);
    if !transparent {
        return first;
    }
    let preferred = [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ];
    match preferred.into_iter().find(|mode| modes.contains(mode)) {
        Some(mode) => mode,
        None => {
            tracing::warn!(
                ?modes,
                "surface does not support transparent compositing; using {:?}",
                first
            );
            first
        }
    }
}
