// Text rendering: an ab_glyph glyph atlas drawn as textured quads

use std::collections::HashMap;

use ab_glyph::{point, Font, FontArc, GlyphId, InvalidFont, PxScale, ScaleFont};
use glam::Vec2;
use wgpu::util::DeviceExt;

use super::{Camera, CameraUniform, Color, TextVertex};
use crate::core::Rect;

const FONT_BYTES: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans-Bold.ttf"
));

/// Glyphs are rasterized once at this pixel height and scaled when drawn
const ATLAS_PX: f32 = 48.0;
const ATLAS_WIDTH: u32 = 1024;
/// Empty texels between packed glyphs so linear filtering never bleeds
const PADDING: u32 = 1;
/// Characters baked into the atlas
const CHARSET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 !?.,:'-";

/// Same u16 index limit as the shape batch
const MAX_QUADS: usize = (u16::MAX as usize + 1) / 4;

#[derive(Debug, Clone, Copy)]
struct GlyphInfo {
    id: GlyphId,
    advance: f32,
    /// Bitmap placement, `None` for blank glyphs such as space
    bitmap: Option<GlyphBitmap>,
}

#[derive(Debug, Clone, Copy)]
struct GlyphBitmap {
    uv_min: Vec2,
    uv_max: Vec2,
    /// Top-left of the bitmap relative to the pen position on the baseline
    offset: Vec2,
    size: Vec2,
}

/// One glyph of laid-out text, in playfield pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphQuad {
    pub rect: Rect,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

/// Coverage atlas for the embedded font.
///
/// Built on the CPU once at startup; the renderer uploads `pixels` as a
/// single-channel texture.
pub struct GlyphAtlas {
    font: FontArc,
    ascent: f32,
    descent: f32,
    glyphs: HashMap<char, GlyphInfo>,
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl GlyphAtlas {
    /// Rasterize the embedded font
    pub fn new() -> Result<Self, InvalidFont> {
        let font = FontArc::try_from_slice(FONT_BYTES)?;
        let scale = PxScale::from(ATLAS_PX);
        let scaled = font.as_scaled(scale);

        // Shelf-pack every outline first so the atlas height is known
        let mut cursor_x = PADDING;
        let mut cursor_y = PADDING;
        let mut row_height = 0;
        let mut placed = Vec::new();
        let mut glyphs = HashMap::new();

        for ch in CHARSET.chars() {
            let id = font.glyph_id(ch);
            let advance = scaled.h_advance(id);
            let glyph = id.with_scale_and_position(scale, point(0.0, 0.0));

            let Some(outline) = font.outline_glyph(glyph) else {
                glyphs.insert(ch, GlyphInfo { id, advance, bitmap: None });
                continue;
            };

            let bounds = outline.px_bounds();
            let w = (bounds.width().ceil() as u32).max(1);
            let h = (bounds.height().ceil() as u32).max(1);

            if cursor_x + w + PADDING > ATLAS_WIDTH {
                cursor_x = PADDING;
                cursor_y += row_height + PADDING;
                row_height = 0;
            }

            placed.push((ch, id, advance, outline, cursor_x, cursor_y, w, h));
            cursor_x += w + PADDING;
            row_height = row_height.max(h);
        }

        let width = ATLAS_WIDTH;
        let height = (cursor_y + row_height + PADDING).next_power_of_two();
        let mut pixels = vec![0u8; (width * height) as usize];

        for (ch, id, advance, outline, x0, y0, w, h) in placed {
            outline.draw(|x, y, coverage| {
                let px = x0 + x;
                let py = y0 + y;
                if px < width && py < height {
                    let idx = (py * width + px) as usize;
                    pixels[idx] = pixels[idx].max((coverage.clamp(0.0, 1.0) * 255.0) as u8);
                }
            });

            let bounds = outline.px_bounds();
            let atlas_size = Vec2::new(width as f32, height as f32);
            glyphs.insert(
                ch,
                GlyphInfo {
                    id,
                    advance,
                    bitmap: Some(GlyphBitmap {
                        uv_min: Vec2::new(x0 as f32, y0 as f32) / atlas_size,
                        uv_max: Vec2::new((x0 + w) as f32, (y0 + h) as f32) / atlas_size,
                        offset: Vec2::new(bounds.min.x, bounds.min.y),
                        size: Vec2::new(w as f32, h as f32),
                    }),
                },
            );
        }

        log::debug!(
            "Glyph atlas built: {} glyphs in {}x{}",
            glyphs.len(),
            width,
            height
        );

        Ok(Self {
            ascent: scaled.ascent(),
            descent: scaled.descent(),
            font,
            glyphs,
            pixels,
            width,
            height,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pen offsets (in atlas pixels) of every known character, kerning applied
    fn pen_positions<'a>(&'a self, text: &'a str) -> impl Iterator<Item = (f32, GlyphInfo)> + 'a {
        let scaled = self.font.as_scaled(PxScale::from(ATLAS_PX));
        let mut pen = 0.0;
        let mut prev: Option<GlyphId> = None;
        text.chars()
            .filter_map(|ch| self.glyphs.get(&ch).copied())
            .map(move |info| {
                if let Some(prev) = prev {
                    pen += scaled.kern(prev, info.id);
                }
                let at = pen;
                pen += info.advance;
                prev = Some(info.id);
                (at, info)
            })
    }

    /// Advance width and line height of `text` drawn `size` pixels tall
    pub fn measure(&self, text: &str, size: f32) -> Vec2 {
        let k = size / ATLAS_PX;
        let width = self
            .pen_positions(text)
            .last()
            .map(|(pen, info)| pen + info.advance)
            .unwrap_or(0.0);
        Vec2::new(width, self.ascent - self.descent) * k
    }

    /// Lay out one line of `text`, `size` pixels tall, with its line box
    /// centered on `center`. Characters outside the atlas are skipped.
    pub fn layout_centered(&self, text: &str, center: Vec2, size: f32) -> Vec<GlyphQuad> {
        let k = size / ATLAS_PX;
        let top_left = center - self.measure(text, size) / 2.0;
        let baseline = Vec2::new(top_left.x, top_left.y + self.ascent * k);

        self.pen_positions(text)
            .filter_map(|(pen, info)| {
                let bitmap = info.bitmap?;
                Some(GlyphQuad {
                    rect: Rect {
                        origin: baseline + (Vec2::new(pen, 0.0) + bitmap.offset) * k,
                        size: bitmap.size * k,
                    },
                    uv_min: bitmap.uv_min,
                    uv_max: bitmap.uv_max,
                })
            })
            .collect()
    }
}

/// CPU-side list of glyph quads for one frame
#[derive(Debug, Default)]
pub struct TextBatch {
    vertices: Vec<TextVertex>,
    indices: Vec<u16>,
    dropped: usize,
}

impl TextBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.dropped = 0;
    }

    /// Queue one glyph
    pub fn push_glyph(&mut self, quad: GlyphQuad, color: Color) {
        if quad.rect.is_empty() {
            return;
        }
        if self.vertices.len() / 4 >= MAX_QUADS {
            self.dropped += 1;
            return;
        }

        let start_idx = self.vertices.len() as u16;
        let min = quad.rect.min();
        let max = quad.rect.max();

        for (corner, uv) in [
            (min, quad.uv_min),
            (Vec2::new(max.x, min.y), Vec2::new(quad.uv_max.x, quad.uv_min.y)),
            (max, quad.uv_max),
            (Vec2::new(min.x, max.y), Vec2::new(quad.uv_min.x, quad.uv_max.y)),
        ] {
            self.vertices.push(TextVertex::new(corner, uv, color));
        }

        for offset in [0, 1, 2, 0, 2, 3] {
            self.indices.push(start_idx + offset);
        }
    }

    pub fn vertices(&self) -> &[TextVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// GPU pipeline sampling the glyph atlas
pub struct TextRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    atlas_bind_group: wgpu::BindGroup,
    index_count: u32,
}

impl TextRenderer {
    /// Upload `atlas` and build the text pipeline
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        camera: &Camera,
        atlas: &GlyphAtlas,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Text Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/text.wgsl").into()),
        });

        let (width, height) = atlas.size();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Glyph Atlas"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            atlas.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Glyph Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Text Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new(camera)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Text Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let atlas_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Glyph Atlas Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Text Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let atlas_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glyph Atlas Bind Group"),
            layout: &atlas_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Text Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &atlas_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Text Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[TextVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Text Vertex Buffer"),
            size: 4096,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Text Index Buffer"),
            size: 1024,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            vertex_buffer,
            index_buffer,
            camera_buffer,
            camera_bind_group,
            atlas_bind_group,
            index_count: 0,
        }
    }

    /// Upload the camera matrix
    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[CameraUniform::new(camera)]),
        );
    }

    /// Upload a frame's glyphs
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &TextBatch) {
        self.index_count = batch.indices().len() as u32;
        if batch.indices().is_empty() {
            return;
        }

        if std::mem::size_of_val(batch.vertices()) as u64 > self.vertex_buffer.size() {
            self.vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Text Vertex Buffer"),
                contents: bytemuck::cast_slice(batch.vertices()),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        } else {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(batch.vertices()));
        }

        if std::mem::size_of_val(batch.indices()) as u64 > self.index_buffer.size() {
            self.index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Text Index Buffer"),
                contents: bytemuck::cast_slice(batch.indices()),
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            });
        } else {
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(batch.indices()));
        }
    }

    /// Draw the prepared glyphs
    pub fn render<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.index_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.atlas_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
