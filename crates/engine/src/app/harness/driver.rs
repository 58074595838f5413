use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use harness_proto::{frame_line, phase_payload, state_payload, HarnessAction, SYNC_OK_PAYLOAD};
use tracing::{info, warn};

use crate::app::input::{ActionStates, InputAction};
use crate::app::scene::SceneHost;
use crate::app::{InputSnapshot, MetricsHandle, SceneDebugCommand, SceneDebugCommandResult, Vec2};

use super::commands::{HarnessCommand, HarnessCommandRegistry};
use super::pump::HarnessLinePump;

#[derive(Debug)]
struct ActiveInjection {
    label: String,
    actions: ActionStates,
    cursor_position_px: Option<Vec2>,
    deadline: Instant,
    ticks: u32,
}

impl ActiveInjection {
    fn new(action: &HarnessAction, duration: Duration, now: Instant) -> Self {
        let mut actions = ActionStates::default();
        for key in &action.keys {
            actions.set(InputAction::from_held_key(*key), true);
        }
        let cursor_position_px = action.click.map(|(x, y)| Vec2 { x, y });
        if cursor_position_px.is_some() {
            // A click aims at the point and holds the trigger.
            actions.set(InputAction::Fire, true);
        }
        Self {
            label: action.describe(),
            actions,
            cursor_position_px,
            deadline: now + duration,
            ticks: 0,
        }
    }
}

/// In-process half of the automation harness: parses command lines, applies
/// them to the scene and merges injected input into each tick.
pub(crate) struct HarnessDriver {
    registry: HarnessCommandRegistry,
    metrics: MetricsHandle,
    telemetry_enabled: bool,
    active_injection: Option<ActiveInjection>,
    pending_screenshot: Option<PathBuf>,
    quit_requested: bool,
    outbound: Vec<String>,
    inbound_scratch: Vec<String>,
}

impl HarnessDriver {
    pub(crate) fn new(metrics: MetricsHandle) -> Self {
        Self {
            registry: HarnessCommandRegistry::with_builtins(),
            metrics,
            telemetry_enabled: false,
            active_injection: None,
            pending_screenshot: None,
            quit_requested: false,
            outbound: Vec::new(),
            inbound_scratch: Vec::new(),
        }
    }

    pub(crate) fn telemetry_enabled(&self) -> bool {
        self.telemetry_enabled
    }

    pub(crate) fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub(crate) fn pump_commands(
        &mut self,
        pump: &mut dyn HarnessLinePump,
        host: &mut SceneHost,
        now: Instant,
    ) {
        if pump.take_disconnect_reset_requested() {
            self.handle_clients_gone();
        }

        let mut lines = std::mem::take(&mut self.inbound_scratch);
        pump.poll_lines(&mut lines);
        for line in lines.drain(..) {
            match self.registry.parse_line(&line) {
                Ok(Some(command)) => self.apply_command(command, pump, host, now),
                Ok(None) => {}
                Err(reply) => self.outbound.push(reply),
            }
        }
        self.inbound_scratch = lines;
        self.flush(pump);
    }

    /// Merges the active injection into `input`, retiring it once its
    /// deadline has passed. Every injection covers at least one tick and its
    /// press edges land on that first tick only.
    pub(crate) fn apply_injection(&mut self, input: InputSnapshot, now: Instant) -> InputSnapshot {
        let Some(injection) = self.active_injection.as_mut() else {
            return input;
        };

        if injection.ticks > 0 && now >= injection.deadline {
            if let Some(done) = self.active_injection.take() {
                info!(action = %done.label, ticks = done.ticks, "harness_execute_done");
                self.outbound.push(format!(
                    "ok: execute done action:{} ticks:{}",
                    done.label, done.ticks
                ));
            }
            return input;
        }

        let pressed = if injection.ticks == 0 {
            injection.actions
        } else {
            ActionStates::default()
        };
        injection.ticks = injection.ticks.saturating_add(1);
        input.merged_with(injection.actions, pressed, injection.cursor_position_px)
    }

    /// Emits telemetry for the tick that just ran and flushes queued replies.
    pub(crate) fn finish_tick(&mut self, pump: &mut dyn HarnessLinePump, host: &SceneHost) {
        if self.telemetry_enabled {
            pump.send_frame_line(&frame_line(host.tick(), host.phase()));
        }
        self.flush(pump);
    }

    pub(crate) fn take_pending_screenshot(&mut self) -> Option<PathBuf> {
        self.pending_screenshot.take()
    }

    pub(crate) fn complete_screenshot<E: Display>(
        &mut self,
        pump: &mut dyn HarnessLinePump,
        path: &Path,
        result: Result<(), E>,
    ) {
        match result {
            Ok(()) => {
                info!(path = %path.display(), "harness_screenshot_saved");
                self.outbound
                    .push(format!("ok: screenshot saved path:{}", path.display()));
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "harness_screenshot_failed");
                self.outbound.push(format!(
                    "error: screenshot failed path:{} reason:{error}",
                    path.display()
                ));
            }
        }
        self.flush(pump);
    }

    fn apply_command(
        &mut self,
        command: HarnessCommand,
        pump: &mut dyn HarnessLinePump,
        host: &mut SceneHost,
        now: Instant,
    ) {
        match command {
            HarnessCommand::Help => self.outbound.extend(self.registry.help_lines()),
            HarnessCommand::GetState => match state_payload(&host.snapshot()) {
                Ok(payload) => self.outbound.push(payload),
                Err(error) => self
                    .outbound
                    .push(format!("error: state serialization failed: {error}")),
            },
            HarnessCommand::GetPhase => self.outbound.push(phase_payload(host.phase())),
            HarnessCommand::Execute {
                action,
                duration_ms,
            } => {
                self.cancel_injection("replaced");
                let injection =
                    ActiveInjection::new(&action, Duration::from_millis(duration_ms), now);
                info!(action = %injection.label, duration_ms, "harness_execute_started");
                self.outbound.push(format!(
                    "ok: execute started action:{} duration_ms:{duration_ms}",
                    injection.label
                ));
                self.active_injection = Some(injection);
            }
            HarnessCommand::Scene(scene_command) => {
                let name = scene_command_name(&scene_command);
                let reply = match host.execute_debug_command(scene_command) {
                    SceneDebugCommandResult::Success(detail) => format!("ok: {detail}"),
                    SceneDebugCommandResult::Error(reason) => format!("error: {reason}"),
                    SceneDebugCommandResult::Unsupported => {
                        format!("error: command '{name}' is not supported by this scene")
                    }
                };
                self.outbound.push(reply);
            }
            HarnessCommand::Reset => {
                self.cancel_injection("reset");
                host.hard_reset();
                info!(phase = host.phase().as_token(), "harness_scene_reset");
                self.outbound
                    .push(format!("ok: reset phase:{}", host.phase().as_token()));
            }
            HarnessCommand::Screenshot { path } => {
                self.outbound
                    .push(format!("ok: screenshot queued path:{}", path.display()));
                self.pending_screenshot = Some(path);
            }
            HarnessCommand::Telemetry { enabled } => {
                self.telemetry_enabled = enabled;
                self.outbound
                    .push(format!("ok: telemetry {}", if enabled { "on" } else { "off" }));
            }
            HarnessCommand::Status => {
                let transport = pump.status_line(self.telemetry_enabled);
                let loop_fields = self.metrics.snapshot().status_fields();
                self.outbound.push(format!("{transport} {loop_fields}"));
            }
            HarnessCommand::Sync => self.outbound.push(SYNC_OK_PAYLOAD.to_string()),
            HarnessCommand::Quit => {
                info!(reason = "harness_quit", "shutdown_requested");
                self.quit_requested = true;
                self.outbound.push("ok: quit".to_string());
            }
        }
    }

    fn cancel_injection(&mut self, reason: &'static str) {
        if let Some(cancelled) = self.active_injection.take() {
            info!(
                action = %cancelled.label,
                ticks = cancelled.ticks,
                reason,
                "harness_execute_cancelled"
            );
            self.outbound.push(format!(
                "ok: execute cancelled action:{} ticks:{}",
                cancelled.label, cancelled.ticks
            ));
        }
    }

    fn handle_clients_gone(&mut self) {
        if let Some(cancelled) = self.active_injection.take() {
            info!(action = %cancelled.label, "harness_injection_dropped_on_disconnect");
        }
        if self.telemetry_enabled {
            info!("harness_telemetry_disabled_on_disconnect");
        }
        self.telemetry_enabled = false;
        self.pending_screenshot = None;
        self.outbound.clear();
    }

    fn flush(&mut self, pump: &mut dyn HarnessLinePump) {
        if self.outbound.is_empty() {
            return;
        }
        pump.send_output_lines(&self.outbound);
        self.outbound.clear();
    }
}

fn scene_command_name(command: &SceneDebugCommand) -> &'static str {
    match command {
        SceneDebugCommand::ForceStart => "force_start",
        SceneDebugCommand::GodMode { .. } => "god_mode",
        SceneDebugCommand::Grant { .. } => "grant",
        SceneDebugCommand::SetHealth { .. } => "set_health",
        SceneDebugCommand::SpawnEnemy { .. } => "spawn_enemy",
        SceneDebugCommand::ShopBuy { .. } => "shop_buy",
    }
}

#[cfg(test)]
mod tests {
    use harness_proto::{parse_state_payload, GamePhase};

    use super::super::pump::test_support::ScriptedPump;
    use super::*;
    use crate::app::scene::test_support::RecordingScene;

    fn loaded_host() -> SceneHost {
        let mut host = SceneHost::new(Box::new(RecordingScene::default()));
        host.load();
        host
    }

    fn run_line(
        driver: &mut HarnessDriver,
        pump: &mut ScriptedPump,
        host: &mut SceneHost,
        line: &str,
        now: Instant,
    ) -> Vec<String> {
        pump.push(line);
        driver.pump_commands(pump, host, now);
        pump.take_sent()
    }

    #[test]
    fn get_state_and_phase_reply_with_payloads() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let now = Instant::now();

        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "get_phase", now),
            vec!["phase title"]
        );
        let replies = run_line(&mut driver, &mut pump, &mut host, "get_state", now);
        let snapshot = parse_state_payload(&replies[0]).expect("state payload");
        assert_eq!(snapshot.phase, GamePhase::Title);
        assert_eq!(snapshot.tick, 0);
    }

    #[test]
    fn replies_preserve_command_order_within_a_poll() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        pump.push("force_start");
        pump.push("bogus");
        pump.push("sync");
        driver.pump_commands(&mut pump, &mut host, Instant::now());

        assert_eq!(
            pump.take_sent(),
            vec![
                "ok: force_start phase:playing",
                "error: unknown command 'bogus'. try: help",
                "ok: sync",
            ]
        );
    }

    #[test]
    fn scene_errors_and_unsupported_commands_are_reported() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let now = Instant::now();

        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "shop_buy heal", now),
            vec!["error: shop is closed"]
        );
        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "god_mode on", now),
            vec!["error: command 'god_mode' is not supported by this scene"]
        );
    }

    #[test]
    fn execute_holds_input_until_deadline_then_reports_done() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let start = Instant::now();

        let replies = run_line(&mut driver, &mut pump, &mut host, "execute up+confirm 50", start);
        assert_eq!(replies, vec!["ok: execute started action:up+confirm duration_ms:50"]);

        let first = driver.apply_injection(InputSnapshot::empty(), start);
        assert!(first.is_down(InputAction::MoveUp));
        assert!(first.just_pressed(InputAction::Confirm));

        let second =
            driver.apply_injection(InputSnapshot::empty(), start + Duration::from_millis(16));
        assert!(second.is_down(InputAction::MoveUp));
        assert!(!second.just_pressed(InputAction::Confirm));
        driver.finish_tick(&mut pump, &host);
        assert!(pump.take_sent().is_empty());

        let after =
            driver.apply_injection(InputSnapshot::empty(), start + Duration::from_millis(50));
        assert!(!after.is_down(InputAction::MoveUp));
        driver.finish_tick(&mut pump, &host);
        assert_eq!(pump.take_sent(), vec!["ok: execute done action:up+confirm ticks:2"]);
    }

    #[test]
    fn zero_duration_execute_still_covers_one_tick() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let start = Instant::now();
        run_line(&mut driver, &mut pump, &mut host, "execute fire 0", start);

        let later = start + Duration::from_millis(5);
        assert!(driver
            .apply_injection(InputSnapshot::empty(), later)
            .is_down(InputAction::Fire));
        assert!(!driver
            .apply_injection(InputSnapshot::empty(), later)
            .is_down(InputAction::Fire));
        driver.finish_tick(&mut pump, &host);
        assert_eq!(pump.take_sent(), vec!["ok: execute done action:fire ticks:1"]);
    }

    #[test]
    fn click_sets_cursor_and_holds_fire() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let start = Instant::now();
        run_line(&mut driver, &mut pump, &mut host, "execute click:40,60 100", start);

        let input = driver.apply_injection(
            InputSnapshot::empty().with_cursor_position_px(Some(Vec2 { x: 1.0, y: 1.0 })),
            start,
        );
        assert_eq!(input.cursor_position_px(), Some(Vec2 { x: 40.0, y: 60.0 }));
        assert!(input.just_pressed(InputAction::Fire));
    }

    #[test]
    fn new_execute_replaces_active_one() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let start = Instant::now();
        run_line(&mut driver, &mut pump, &mut host, "execute left 1000", start);
        driver.apply_injection(InputSnapshot::empty(), start);

        let replies = run_line(&mut driver, &mut pump, &mut host, "execute right 1000", start);
        assert_eq!(
            replies,
            vec![
                "ok: execute cancelled action:left ticks:1",
                "ok: execute started action:right duration_ms:1000",
            ]
        );
        let input = driver.apply_injection(InputSnapshot::empty(), start);
        assert!(input.is_down(InputAction::MoveRight));
        assert!(!input.is_down(InputAction::MoveLeft));
    }

    #[test]
    fn telemetry_emits_frame_lines_per_tick_when_enabled() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let now = Instant::now();

        driver.finish_tick(&mut pump, &host);
        assert!(pump.frames.is_empty());

        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "telemetry on", now),
            vec!["ok: telemetry on"]
        );
        host.update(1.0 / 60.0, &InputSnapshot::empty());
        driver.finish_tick(&mut pump, &host);
        assert_eq!(pump.frames, vec!["harness.frame v1 tick:1 phase:title"]);
        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "status", now),
            vec![
                "harness.status v1 enabled:1 telemetry:1 clients:1 \
                 fps:0.0 tps:0.0 frame_ms:0.00 worst_ms:0.00 dropped:0"
            ]
        );
    }

    #[test]
    fn disconnect_cancels_injection_and_disables_telemetry() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let start = Instant::now();
        run_line(&mut driver, &mut pump, &mut host, "telemetry on", start);
        run_line(&mut driver, &mut pump, &mut host, "execute down 5000", start);

        pump.disconnect_pending = true;
        driver.pump_commands(&mut pump, &mut host, start);

        assert!(!driver.telemetry_enabled());
        assert!(!driver
            .apply_injection(InputSnapshot::empty(), start)
            .is_down(InputAction::MoveDown));
        assert!(pump.take_sent().is_empty());
    }

    #[test]
    fn reset_reloads_scene_and_cancels_injection() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        let start = Instant::now();
        run_line(&mut driver, &mut pump, &mut host, "force_start", start);
        run_line(&mut driver, &mut pump, &mut host, "execute fire 1000", start);

        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "reset", start),
            vec![
                "ok: execute cancelled action:fire ticks:0",
                "ok: reset phase:title"
            ]
        );
        assert_eq!(host.phase(), GamePhase::Title);
    }

    #[test]
    fn screenshot_is_deferred_until_after_render() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "screenshot shot.png", Instant::now()),
            vec!["ok: screenshot queued path:shot.png"]
        );

        let path = driver.take_pending_screenshot().expect("pending screenshot");
        assert!(driver.take_pending_screenshot().is_none());
        driver.complete_screenshot(&mut pump, &path, Err("disk full"));
        assert_eq!(
            pump.take_sent(),
            vec!["error: screenshot failed path:shot.png reason:disk full"]
        );
    }

    #[test]
    fn quit_sets_flag_and_acknowledges() {
        let mut driver = HarnessDriver::new(MetricsHandle::default());
        let mut pump = ScriptedPump::default();
        let mut host = loaded_host();
        assert!(!driver.quit_requested());
        assert_eq!(
            run_line(&mut driver, &mut pump, &mut host, "quit", Instant::now()),
            vec!["ok: quit"]
        );
        assert!(driver.quit_requested());
    }
}
