use arcade_engine::{
    Canvas, GrantResource, InputAction, InputSnapshot, Scene, SceneCommand, SceneDebugCommand,
    SceneDebugCommandResult, Vec2,
};
use harness_proto::{GamePhase, HarnessSnapshot};
use tracing::{error, info, warn};

use super::render::render_state;
use super::snapshot::build_snapshot;
use super::state::BreachState;
use super::systems::step_run;
use super::types::{EnemyKind, ShopItem};

pub(crate) struct BreachScene {
    seed: u64,
    state: Option<BreachState>,
}

impl BreachScene {
    pub(crate) fn new(seed: u64) -> Self {
        Self { seed, state: None }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> Option<&BreachState> {
        self.state.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> Option<&mut BreachState> {
        self.state.as_mut()
    }

    fn update_shop(state: &mut BreachState, input: &InputSnapshot) {
        if input.just_pressed(InputAction::MoveUp) {
            state.move_shop_selection(-1);
        }
        if input.just_pressed(InputAction::MoveDown) {
            state.move_shop_selection(1);
        }
        if input.just_pressed(InputAction::Confirm) {
            let item = ShopItem::ALL[state.shop_selected.min(ShopItem::ALL.len() - 1)];
            if let Err(reason) = state.buy(item) {
                info!(item = item.as_token(), reason = %reason, "shop_purchase_rejected");
            }
        }
    }
}

fn start_run(state: &mut BreachState) -> Result<(), String> {
    state
        .start_run()
        .map_err(|err| format!("floor build failed: {err}"))
}

fn require_run(state: &BreachState) -> Result<(), String> {
    match state.phase {
        GamePhase::Playing | GamePhase::Combat | GamePhase::Shop => Ok(()),
        other => Err(format!(
            "no active run (phase:{}). try: force_start",
            other.as_token()
        )),
    }
}

fn force_start(state: &mut BreachState) -> Result<String, String> {
    match state.phase {
        GamePhase::Title | GamePhase::GameOver | GamePhase::Victory => start_run(state)?,
        GamePhase::Shop => state
            .advance_floor()
            .map_err(|err| format!("floor build failed: {err}"))?,
        GamePhase::Playing | GamePhase::Combat => {}
    }
    Ok(format!("force_start phase:{}", state.phase.as_token()))
}

fn grant(state: &mut BreachState, resource: GrantResource, amount: u32) -> Result<String, String> {
    require_run(state)?;
    let (token, total) = match resource {
        GrantResource::Gold => {
            state.gold = state.gold.saturating_add(amount);
            ("gold", i64::from(state.gold))
        }
        GrantResource::Ammo => {
            state.player.reserve_ammo = state.player.reserve_ammo.saturating_add(amount);
            ("ammo", i64::from(state.player.reserve_ammo))
        }
        GrantResource::Health => {
            let amount = i32::try_from(amount).unwrap_or(i32::MAX);
            state.player.heal(amount);
            ("health", i64::from(state.player.health))
        }
        GrantResource::Score => {
            state.score = state.score.saturating_add(amount);
            ("score", i64::from(state.score))
        }
    };
    Ok(format!("grant {token}:+{amount} total:{total}"))
}

/// Sets health directly; zero or below ends the run on the spot.
/// Only reachable mid-floor, so a zero value always takes the in-run path to
/// `gameover`.
fn set_health(state: &mut BreachState, value: i32) -> Result<String, String> {
    require_run(state)?;
    if !state.phase.is_in_run() {
        return Err(format!(
            "set_health needs playing or combat (phase:{}). try: shop_buy continue",
            state.phase.as_token()
        ));
    }
    let player = &mut state.player;
    player.health = value.clamp(0, player.max_health);
    if player.health == 0 {
        info!(score = state.score, "player_died");
        state.set_phase(GamePhase::GameOver);
    }
    Ok(format!(
        "set_health health:{} phase:{}",
        state.player.health,
        state.phase.as_token()
    ))
}

fn spawn_enemy(
    state: &mut BreachState,
    kind: &str,
    position: Option<(f32, f32)>,
) -> Result<String, String> {
    if !state.phase.is_in_run() {
        return Err(format!(
            "enemies can only spawn during a run (phase:{})",
            state.phase.as_token()
        ));
    }
    let kind = EnemyKind::from_token(kind).ok_or_else(|| {
        format!("unknown enemy kind '{kind}'. expected: melee|ranged|patrol")
    })?;
    let position = match position {
        Some((x, y)) => {
            let requested = Vec2::new(x, y);
            if !state.is_open_for(requested, kind.half_size()) {
                return Err(format!("position {x},{y} is blocked or outside the room"));
            }
            requested
        }
        None => state.random_spawn_point(kind),
    };
    let id = state.spawn_enemy(kind, position);
    Ok(format!(
        "spawn_enemy id:{id} kind:{} x:{:.1} y:{:.1}",
        kind.as_token(),
        position.x,
        position.y
    ))
}

fn shop_buy(state: &mut BreachState, item: &str) -> Result<String, String> {
    let item = ShopItem::from_token(item).ok_or_else(|| {
        format!("unknown shop item '{item}'. expected: heal|ammo|damage|clip|max_health|continue")
    })?;
    state.buy(item)
}

impl Scene for BreachScene {
    fn load(&mut self) {
        match BreachState::new(self.seed) {
            Ok(state) => {
                info!(seed = self.seed, "breach_loaded");
                self.state = Some(state);
            }
            Err(err) => {
                error!(error = %err, seed = self.seed, "breach_load_failed");
                self.state = None;
            }
        }
    }

    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        let Some(state) = self.state.as_mut() else {
            return SceneCommand::None;
        };
        match state.phase {
            GamePhase::Title => {
                if input.just_pressed(InputAction::Confirm) {
                    if let Err(reason) = start_run(state) {
                        warn!(reason = %reason, "run_start_failed");
                    }
                }
            }
            GamePhase::Playing | GamePhase::Combat => step_run(state, fixed_dt_seconds, input),
            GamePhase::Shop => Self::update_shop(state, input),
            GamePhase::GameOver | GamePhase::Victory => {
                if input.just_pressed(InputAction::Confirm) {
                    info!(score = state.score, "restart_requested");
                    return SceneCommand::Restart;
                }
            }
        }
        SceneCommand::None
    }

    fn render(&self, canvas: &mut Canvas<'_>) {
        if let Some(state) = &self.state {
            render_state(state, canvas);
        }
    }

    fn unload(&mut self) {
        if let Some(state) = self.state.take() {
            info!(
                phase = state.phase.as_token(),
                score = state.score,
                "breach_unloaded"
            );
        }
    }

    fn phase(&self) -> GamePhase {
        self.state
            .as_ref()
            .map_or(GamePhase::Title, |state| state.phase)
    }

    fn harness_snapshot(&self) -> HarnessSnapshot {
        match &self.state {
            Some(state) => build_snapshot(state),
            None => HarnessSnapshot::empty(GamePhase::Title),
        }
    }

    fn debug_title(&self) -> Option<String> {
        let state = self.state.as_ref()?;
        Some(format!(
            "Hive Breach | {} | floor {} | score {}",
            state.phase.as_token(),
            state.floor_index + 1,
            state.score
        ))
    }

    fn execute_debug_command(&mut self, command: SceneDebugCommand) -> SceneDebugCommandResult {
        let Some(state) = self.state.as_mut() else {
            return SceneDebugCommandResult::Error("scene is not loaded".to_string());
        };
        let outcome = match command {
            SceneDebugCommand::ForceStart => force_start(state),
            SceneDebugCommand::GodMode { enabled } => require_run(state).map(|()| {
                state.player.god_mode = enabled;
                format!("god_mode {}", if enabled { "on" } else { "off" })
            }),
            SceneDebugCommand::Grant { resource, amount } => grant(state, resource, amount),
            SceneDebugCommand::SetHealth { value } => set_health(state, value),
            SceneDebugCommand::SpawnEnemy { kind, position } => {
                spawn_enemy(state, &kind, position)
            }
            SceneDebugCommand::ShopBuy { item } => shop_buy(state, &item),
        };
        match outcome {
            Ok(detail) => SceneDebugCommandResult::Success(detail),
            Err(reason) => SceneDebugCommandResult::Error(reason),
        }
    }
}
