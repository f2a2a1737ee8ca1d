use anyhow::Result;
use glam::Vec2;
use log::{debug, error, info, warn};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::{Window, WindowBuilder},
};

mod core;
mod engine;
mod game;

use engine::game_loop::GameLoop;
use engine::input::InputManager;
use engine::renderer::{Camera, RenderError, Renderer};
use game::arena::Match;
use game::config::MatchConfig;

const WINDOW_TITLE: &str = "Rect Brawl";

fn main() -> Result<()> {
    // Initialize logger (RUST_LOG overrides the default level)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    info!("Starting Rect Brawl...");

    let config = MatchConfig::default();
    let playfield = config.playfield;

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(
                playfield.width,
                playfield.height,
            ))
            .with_resizable(true)
            .build(&event_loop)?,
    );

    info!("Window created successfully");

    let mut renderer = pollster::block_on(Renderer::new(window.clone(), playfield.size()))?;
    let mut arena = Match::new(config);
    let mut input = InputManager::new();
    let mut game_loop = GameLoop::new();

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                }
                WindowEvent::Focused(false) => {
                    // Keys released while unfocused never reach us
                    input.reset_all();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input.process_keyboard_event(&event);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input.process_mouse_button(state, button);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input.set_cursor(Vec2::new(position.x as f32, position.y as f32));
                }
                WindowEvent::CursorLeft { .. } => {
                    input.clear_cursor();
                }
                WindowEvent::RedrawRequested => {
                    update(&mut arena, &mut game_loop, &mut input, &renderer, &window);
                    arena.render(&mut renderer);

                    match renderer.render() {
                        Ok(()) => {}
                        Err(RenderError::Surface(
                            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                        )) => renderer.reconfigure(),
                        Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                            error!("GPU out of memory, shutting down");
                            elwt.exit();
                        }
                        Err(e) => warn!("Skipping frame: {}", e),
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}

/// Handle restart requests, run the due steps and halt the loop on a knockout
fn update(
    arena: &mut Match,
    game_loop: &mut GameLoop,
    input: &mut InputManager,
    renderer: &Renderer,
    window: &Window,
) {
    if handle_restart(arena, game_loop, input, renderer.camera()) {
        window.set_title(WINDOW_TITLE);
    }

    let status = arena.drive(game_loop, input.state());

    if game_loop.frame_count() % 600 == 0 {
        debug!(
            "{:.1} fps, {} updates, match frame {}",
            game_loop.fps(),
            game_loop.update_count(),
            arena.frames()
        );
    }

    if status.is_over() && !game_loop.is_halted() {
        game_loop.halt();
        if let Some(message) = arena.win_message() {
            window.set_title(&format!("{} - {}", WINDOW_TITLE, message));
        }
    }
}

/// Restart the match if a restart press arrived while the restart control
/// is showing. Presses are consumed every frame, so one made mid-match
/// never fires after the knockout.
fn handle_restart(
    arena: &mut Match,
    game_loop: &mut GameLoop,
    input: &mut InputManager,
    camera: &Camera,
) -> bool {
    let requested = input.take_restart_request(arena.restart_button(), camera);
    if !requested || !arena.restart_visible() {
        return false;
    }

    arena.restart();
    game_loop.rearm();
    true
}
