mod harness;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use harness::{HarnessLinePump, NoopLinePump};
pub use input::InputAction;
pub use loop_runner::{run_app, run_app_with_metrics, AppError, LoopConfig, SLOW_FRAME_ENV_VAR};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use rendering::{
    glyph_advance, line_advance, screen_to_world, text_width, world_to_screen, Canvas, RenderError,
    Renderer, Rgba, Viewport,
};
pub use scene::{
    Camera2D, GrantResource, InputSnapshot, Scene, SceneCommand, SceneDebugCommand,
    SceneDebugCommandResult, Tilemap, TilemapError, Vec2,
};
