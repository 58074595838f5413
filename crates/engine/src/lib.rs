//! Fixed-step arcade runtime: window loop, input, scene hosting, a software
//! canvas and the in-process automation harness driver.

pub mod app;

pub use app::{
    glyph_advance, line_advance, run_app, run_app_with_metrics, screen_to_world, text_width,
    world_to_screen, AppError, Camera2D, Canvas, GrantResource, HarnessLinePump, InputAction,
    InputSnapshot, LoopConfig, LoopMetricsSnapshot, MetricsHandle, NoopLinePump, RenderError,
    Renderer, Rgba, Scene, SceneCommand, SceneDebugCommand, SceneDebugCommandResult, Tilemap,
    TilemapError, Vec2, Viewport, SLOW_FRAME_ENV_VAR,
};
