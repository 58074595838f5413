use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::harness::{HarnessDriver, HarnessLinePump};
use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::rendering::RenderError;
use super::scene::SceneHost;
use super::{InputAction, InputSnapshot, MetricsHandle, Renderer, Scene, SceneCommand, Vec2};

pub const SLOW_FRAME_ENV_VAR: &str = "ARCADE_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Initial window size as a multiple of the canvas size.
    pub window_scale: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Arcade".to_string(),
            canvas_width: 320,
            canvas_height: 256,
            window_scale: 3,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] RenderError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    pump: Box<dyn HarnessLinePump>,
) -> Result<(), AppError> {
    run_app_with_metrics(config, scene, pump, MetricsHandle::default())
}

pub fn run_app_with_metrics(
    config: LoopConfig,
    scene: Box<dyn Scene>,
    mut pump: Box<dyn HarnessLinePump>,
    metrics_handle: MetricsHandle,
) -> Result<(), AppError> {
    let canvas_width = config.canvas_width.max(1);
    let canvas_height = config.canvas_height.max(1);
    let window_scale = config.window_scale.max(1);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                (canvas_width * window_scale) as f64,
                (canvas_height * window_scale) as f64,
            ))
            .with_min_inner_size(LogicalSize::new(canvas_width as f64, canvas_height as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), canvas_width, canvas_height)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);

    let mut host = SceneHost::new(scene);
    host.load();
    info!(phase = host.phase().as_token(), canvas_width, canvas_height, "scene_loaded");

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut driver = HarnessDriver::new(metrics_handle.clone());
    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let cursor = renderer.window_pos_to_canvas(position.x, position.y);
                    input_collector.set_cursor_position_px(cursor);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.set_cursor_position_px(None);
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;
                    input_collector.handle_physical_key(event.physical_key, pressed);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    if slow_frame_delay > Duration::ZERO {
                        // Explicit debug perturbation only; this is not the FPS cap.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let tick_now = Instant::now();
                        driver.pump_commands(pump.as_mut(), &mut host, tick_now);
                        if driver.quit_requested() {
                            window_target.exit();
                            break;
                        }

                        let input =
                            driver.apply_injection(input_collector.snapshot_for_tick(), tick_now);
                        match host.update(fixed_dt_seconds, &input) {
                            SceneCommand::None => {}
                            SceneCommand::Restart => {
                                host.hard_reset();
                                info!(phase = host.phase().as_token(), "scene_restarted");
                            }
                            SceneCommand::Quit => {
                                info!(reason = "scene_command", "shutdown_requested");
                                window_target.exit();
                            }
                        }
                        driver.finish_tick(pump.as_mut(), &host);
                    }
                    metrics_accumulator.record_ticks(step_plan.ticks_to_run);
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        let dropped_steps = (step_plan.dropped_backlog.as_nanos()
                            / fixed_dt.as_nanos().max(1))
                            as u32;
                        metrics_accumulator.record_dropped_steps(dropped_steps);
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            dropped_steps,
                            max_ticks_per_frame,
                            "sim_clamp_triggered"
                        );
                    }

                    // Single authoritative FPS cap sleep point for render pacing.
                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.render_scene(&host) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    if let Some(path) = driver.take_pending_screenshot() {
                        let result = renderer.save_last_frame_png(&path);
                        driver.complete_screenshot(pump.as_mut(), &path, result);
                    }

                    let next_title = host.debug_title();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }

                    metrics_accumulator.record_frame(raw_frame_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        metrics_handle.publish(snapshot);
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            dropped_steps = snapshot.dropped_steps,
                            tick = host.tick(),
                            phase = host.phase().as_token(),
                            harness_telemetry = driver.telemetry_enabled(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                host.shutdown();
                info!(tick = host.tick(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Folds window events into held actions plus per-tick press edges.
///
/// Fire is held while either Space or the left mouse button is down.
#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    key_states: ActionStates,
    left_mouse_is_down: bool,
    pressed_edges: ActionStates,
    cursor_position_px: Option<Vec2>,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn held_actions(&self) -> ActionStates {
        let mut held = self.key_states;
        if self.left_mouse_is_down {
            held.set(InputAction::Fire, true);
        }
        held
    }

    fn update_held(&mut self, change: impl FnOnce(&mut Self)) {
        let before = self.held_actions();
        change(self);
        let after = self.held_actions();
        for action in InputAction::ALL {
            if after.is_down(action) && !before.is_down(action) {
                self.pressed_edges.set(action, true);
            }
        }
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let Some(action) = action_for_key(key) else {
            return;
        };
        self.update_held(|collector| collector.key_states.set(action, is_pressed));
        if action == InputAction::Quit && is_pressed {
            self.mark_quit_requested();
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        let is_down = state == ElementState::Pressed;
        self.update_held(|collector| collector.left_mouse_is_down = is_down);
    }

    fn set_cursor_position_px(&mut self, position: Option<Vec2>) {
        self.cursor_position_px = position;
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.quit_requested,
            self.held_actions(),
            self.pressed_edges,
            self.cursor_position_px,
        );
        self.pressed_edges = ActionStates::default();
        snapshot
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Space => Some(InputAction::Fire),
        KeyCode::KeyR => Some(InputAction::Reload),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(InputAction::Confirm),
        KeyCode::Escape => Some(InputAction::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    parse_slow_frame_delay(env::var(SLOW_FRAME_ENV_VAR).ok().as_deref(), config_slow_frame_ms)
}

fn parse_slow_frame_delay(raw: Option<&str>, config_slow_frame_ms: u64) -> Duration {
    match raw {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value,
                    "invalid_slow_frame_env_value_using_config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        None => Duration::from_millis(config_slow_frame_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(50), fixed_dt, 5);
        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(2));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);
        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn key_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Enter), true);
        let first = input.snapshot_for_tick();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Enter), true);
        let second = input.snapshot_for_tick();

        assert!(first.just_pressed(InputAction::Confirm));
        assert!(second.is_down(InputAction::Confirm));
        assert!(!second.just_pressed(InputAction::Confirm));

        input.handle_physical_key(PhysicalKey::Code(KeyCode::Enter), false);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Enter), true);
        assert!(input.snapshot_for_tick().just_pressed(InputAction::Confirm));
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyW), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), true);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyR), true);
        let snapshot = input.snapshot_for_tick();

        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::Reload));
        assert!(!snapshot.is_down(InputAction::MoveRight));

        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyW), false);
        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveUp));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyQ), true);
        let snapshot = input.snapshot_for_tick();
        for action in InputAction::ALL {
            assert!(!snapshot.is_down(action));
        }
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn mouse_and_space_share_fire_without_double_edges() {
        let mut input = InputCollector::default();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), true);
        let first = input.snapshot_for_tick();
        assert!(first.just_pressed(InputAction::Fire));

        input.handle_mouse_input(MouseButton::Left, ElementState::Released);
        let second = input.snapshot_for_tick();
        assert!(second.is_down(InputAction::Fire));
        assert!(!second.just_pressed(InputAction::Fire));

        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), false);
        assert!(!input.snapshot_for_tick().is_down(InputAction::Fire));

        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().is_down(InputAction::Fire));
    }

    #[test]
    fn snapshot_carries_cursor_position() {
        let mut input = InputCollector::default();
        input.set_cursor_position_px(Some(Vec2 { x: 12.0, y: 30.0 }));
        assert_eq!(
            input.snapshot_for_tick().cursor_position_px(),
            Some(Vec2 { x: 12.0, y: 30.0 })
        );
        input.set_cursor_position_px(None);
        assert_eq!(input.snapshot_for_tick().cursor_position_px(), None);
    }

    #[test]
    fn slow_frame_value_parsing_falls_back_to_config() {
        assert_eq!(parse_slow_frame_delay(Some("40"), 0), Duration::from_millis(40));
        assert_eq!(parse_slow_frame_delay(Some("soon"), 7), Duration::from_millis(7));
        assert_eq!(parse_slow_frame_delay(None, 3), Duration::from_millis(3));
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn target_frame_duration_for_60hz_is_expected() {
        let duration = target_frame_duration(Some(60)).expect("duration");
        assert!((duration.as_secs_f64() - (1.0 / 60.0)).abs() < 0.000_001);
    }

    #[test]
    fn compute_cap_sleep_depends_on_budget() {
        let target = target_frame_duration(Some(60));
        assert_eq!(compute_cap_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
        assert_eq!(compute_cap_sleep(Duration::from_millis(5), None), Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
        assert_eq!(format_render_cap(None), "off");
    }
}
