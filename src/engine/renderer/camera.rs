// Camera that maps the fixed playfield onto the window surface

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2};

/// 2D camera over the playfield.
///
/// World space is playfield pixels with the origin in the top-left corner
/// and y growing downward. The whole playfield is stretched over the
/// surface, whatever its size.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Playfield size in world units (pixels)
    playfield: Vec2,
    /// Surface size in physical pixels
    surface: Vec2,
    /// View-projection matrix
    view_proj: Mat4,
}

impl Camera {
    /// Create a new camera
    pub fn new(playfield: Vec2, surface: Vec2) -> Self {
        let mut camera = Self {
            playfield,
            surface,
            view_proj: Mat4::IDENTITY,
        };
        camera.update_view_proj();
        camera
    }

    /// Update the view-projection matrix
    fn update_view_proj(&mut self) {
        // Bottom/top swapped so that y points down the screen
        self.view_proj = Mat4::orthographic_rh(
            0.0,
            self.playfield.x,
            self.playfield.y,
            0.0,
            -1.0, // Near plane
            1.0,  // Far plane
        );
    }

    /// Resize the surface the playfield is drawn to
    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface = Vec2::new(width, height);
        self.update_view_proj();
    }

    /// Get the view-projection matrix
    pub fn view_proj_matrix(&self) -> Mat4 {
        self.view_proj
    }

    /// Convert surface pixel coordinates to playfield coordinates
    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        if self.surface.x <= 0.0 || self.surface.y <= 0.0 {
            return Vec2::ZERO;
        }
        screen_pos / self.surface * self.playfield
    }
}

/// Camera uniform for GPU
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Create a new camera uniform from a camera
    pub fn new(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj_matrix().to_cols_array_2d(),
        }
    }
}
