// Rendering system using wgpu

mod camera;
mod canvas;
mod shapes;
mod text;
mod vertex;

pub use camera::{Camera, CameraUniform};
pub use canvas::{Canvas, Color};
pub use shapes::{ShapeBatch, ShapeRenderer};
pub use text::{GlyphAtlas, TextBatch, TextRenderer};
pub use vertex::{TextVertex, Vertex};

use glam::Vec2;
use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;
use winit::window::Window;

use crate::core::Rect;

/// Errors raised while setting up or presenting the render surface
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create render surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to parse embedded font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("failed to find suitable GPU adapter")]
    NoAdapter,

    #[error("failed to request GPU device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to acquire next surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Main renderer responsible for initializing wgpu and presenting frames.
///
/// Drawing goes through the [`Canvas`] impl, which queues shapes into a
/// [`ShapeBatch`] and glyphs into a [`TextBatch`]; [`Renderer::render`]
/// uploads and presents them, text on top.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    shape_renderer: ShapeRenderer,
    batch: ShapeBatch,
    text_renderer: TextRenderer,
    text_batch: TextBatch,
    atlas: GlyphAtlas,
    /// The surface encodes to sRGB, so colors are decoded before upload
    linear_output: bool,
    camera: Camera,
}

impl Renderer {
    /// Create a new renderer for the given window, showing a playfield of
    /// `playfield` pixels
    pub async fn new(window: Arc<Window>, playfield: Vec2) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let camera = Camera::new(
            playfield,
            Vec2::new(config.width as f32, config.height as f32),
        );
        let shape_renderer = ShapeRenderer::new(&device, surface_format, &camera);
        let atlas = GlyphAtlas::new()?;
        let text_renderer = TextRenderer::new(&device, &queue, surface_format, &camera, &atlas);

        info!(
            "Renderer initialized with {}x{} resolution",
            config.width, config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            shape_renderer,
            batch: ShapeBatch::new(),
            text_renderer,
            text_batch: TextBatch::new(),
            atlas,
            linear_output: surface_format.is_srgb(),
            camera,
        })
    }

    /// Resize the renderer
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.camera
                .resize(new_size.width as f32, new_size.height as f32);
            info!("Renderer resized to {}x{}", new_size.width, new_size.height);
        }
    }

    /// Reconfigure the surface at its current size (after it was lost)
    pub fn reconfigure(&mut self) {
        self.resize(self.size);
    }

    /// Upload the queued shapes and present a frame
    pub fn render(&mut self) -> Result<(), RenderError> {
        if self.batch.dropped() > 0 {
            warn!("Dropped {} shapes over the batch limit", self.batch.dropped());
        }
        if self.text_batch.dropped() > 0 {
            warn!("Dropped {} glyphs over the batch limit", self.text_batch.dropped());
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.shape_renderer.update_camera(&self.queue, &self.camera);
        self.shape_renderer
            .prepare(&self.device, &self.queue, &self.batch);
        self.text_renderer.update_camera(&self.queue, &self.camera);
        self.text_renderer
            .prepare(&self.device, &self.queue, &self.text_batch);

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.batch.clear_color().into()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.shape_renderer.render(&mut render_pass);
            self.text_renderer.render(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Get a reference to the camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Color as the render target wants it written
    fn output_color(&self, color: Color) -> Color {
        if self.linear_output {
            color.to_linear()
        } else {
            color
        }
    }
}

impl Canvas for Renderer {
    fn clear(&mut self, color: Color) {
        let color = self.output_color(color);
        self.batch.clear(color);
        self.text_batch.clear();
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let color = self.output_color(color);
        self.batch.push_rect(rect, color);
    }

    fn fill_text(&mut self, text: &str, center: Vec2, size: f32, color: Color) {
        let color = self.output_color(color);
        for quad in self.atlas.layout_centered(text, center, size) {
            self.text_batch.push_glyph(quad, color);
        }
    }
}
