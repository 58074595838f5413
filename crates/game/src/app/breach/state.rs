use arcade_engine::{Camera2D, TilemapError, Vec2};
use harness_proto::GamePhase;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::level::{
    box_hits_solid, build_floor, entry_point, in_room_bounds, neighbour_of, room_center,
    start_room, Floor, Room,
};
use super::types::{DoorSide, Enemy, EnemyKind, Pickup, PickupKind, Player, Projectile, ShopItem};
use super::{
    FLOOR_COUNT, FLOOR_TIME_SECONDS, INVULNERABLE_SECONDS, MIN_SPAWN_DISTANCE, ROOM_TILES_H,
    ROOM_TILES_W, SCORE_PER_FLOOR, SCORE_PER_KILL, SCORE_PER_ROOM, SHOP_AMMO_AMOUNT,
    SHOP_CLIP_BONUS, SHOP_DAMAGE_BONUS, SHOP_HEAL_AMOUNT, SHOP_MAX_HEALTH_BONUS, SPAWN_ATTEMPTS,
    TILE_SIZE,
};

/// The whole mutable game record. Owned by `BreachScene` and mutated only
/// from its update step and debug commands.
#[derive(Debug, Clone)]
pub(crate) struct BreachState {
    pub(crate) phase: GamePhase,
    pub(crate) rng: StdRng,
    pub(crate) floor_index: u32,
    pub(crate) floor: Floor,
    pub(crate) room: (u32, u32),
    pub(crate) player: Player,
    pub(crate) enemies: Vec<Enemy>,
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) pickups: Vec<Pickup>,
    pub(crate) next_enemy_id: u64,
    pub(crate) timer_seconds: f32,
    pub(crate) score: u32,
    pub(crate) gold: u32,
    pub(crate) kills: u32,
    pub(crate) shop_selected: usize,
}

impl BreachState {
    pub(crate) fn new(seed: u64) -> Result<Self, TilemapError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let floor = build_floor(&mut rng)?;
        Ok(Self {
            phase: GamePhase::Title,
            rng,
            floor_index: 0,
            floor,
            room: start_room(),
            player: Player::new(room_center()),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            pickups: Vec::new(),
            next_enemy_id: 1,
            timer_seconds: FLOOR_TIME_SECONDS,
            score: 0,
            gold: 0,
            kills: 0,
            shop_selected: 0,
        })
    }

    pub(crate) fn set_phase(&mut self, next: GamePhase) {
        if self.phase == next {
            return;
        }
        info!(
            from = self.phase.as_token(),
            to = next.as_token(),
            floor = self.floor_index + 1,
            score = self.score,
            "phase_changed"
        );
        self.phase = next;
    }

    /// Fresh run on floor 1. The RNG keeps its stream so consecutive runs
    /// get different layouts while staying reproducible for one seed.
    pub(crate) fn start_run(&mut self) -> Result<(), TilemapError> {
        self.floor_index = 0;
        self.floor = build_floor(&mut self.rng)?;
        self.room = start_room();
        self.player = Player::new(room_center());
        self.score = 0;
        self.gold = 0;
        self.kills = 0;
        self.next_enemy_id = 1;
        self.enter_floor_start();
        info!(floor = 1, "run_started");
        Ok(())
    }

    /// Leaves the shop for the next floor, keeping the player's upgrades.
    pub(crate) fn advance_floor(&mut self) -> Result<(), TilemapError> {
        self.floor_index += 1;
        self.floor = build_floor(&mut self.rng)?;
        self.room = start_room();
        self.player.position = room_center();
        self.enter_floor_start();
        info!(floor = self.floor_index + 1, "floor_started");
        Ok(())
    }

    fn enter_floor_start(&mut self) {
        self.player.velocity = Vec2::ZERO;
        self.player.invulnerable_remaining = 0.0;
        self.enemies.clear();
        self.projectiles.clear();
        self.pickups.clear();
        self.timer_seconds = FLOOR_TIME_SECONDS;
        self.shop_selected = 0;
        self.set_phase(GamePhase::Playing);
    }

    pub(crate) fn current_room(&self) -> Option<&Room> {
        self.floor.room(self.room.0, self.room.1)
    }

    pub(crate) fn doors_locked(&self) -> bool {
        self.phase == GamePhase::Combat
    }

    pub(crate) fn camera(&self) -> Camera2D {
        Camera2D {
            position: self.current_room().map(Room::origin).unwrap_or(Vec2::ZERO),
        }
    }

    /// Moves into the neighbouring room through `side`. Returns false when
    /// there is no room on that side.
    pub(crate) fn enter_room_through(&mut self, side: DoorSide) -> bool {
        let Some(next) = neighbour_of(self.room.0, self.room.1, side) else {
            return false;
        };
        self.room = next;
        self.player.position = entry_point(side.opposite());
        self.projectiles.clear();
        self.pickups.clear();
        self.enemies.clear();
        let cleared = self.current_room().is_some_and(|room| room.cleared);
        info!(room_x = next.0, room_y = next.1, cleared, "room_entered");
        if !cleared {
            self.spawn_room_wave();
            self.set_phase(GamePhase::Combat);
        }
        true
    }

    fn spawn_room_wave(&mut self) {
        let count = 2 + self.floor_index + self.rng.gen_range(0..=1);
        for _ in 0..count {
            let roll = self.rng.gen_range(0..100);
            let kind = match roll {
                0..=49 => EnemyKind::Melee,
                50..=79 => EnemyKind::Ranged,
                _ => EnemyKind::Patrol,
            };
            let position = self.random_spawn_point(kind);
            self.spawn_enemy(kind, position);
        }
    }

    pub(crate) fn random_spawn_point(&mut self, kind: EnemyKind) -> Vec2 {
        let half = kind.half_size();
        for _ in 0..SPAWN_ATTEMPTS {
            let tile_x = self.rng.gen_range(2..ROOM_TILES_W - 2);
            let tile_y = self.rng.gen_range(2..ROOM_TILES_H - 2);
            let candidate = Vec2::new(
                (tile_x as f32 + 0.5) * TILE_SIZE as f32,
                (tile_y as f32 + 0.5) * TILE_SIZE as f32,
            );
            if candidate.distance_to(self.player.position) < MIN_SPAWN_DISTANCE {
                continue;
            }
            if self.is_open_for(candidate, half) {
                return candidate;
            }
        }
        room_center()
    }

    pub(crate) fn is_open_for(&self, center: Vec2, half: f32) -> bool {
        in_room_bounds(center)
            && self
                .current_room()
                .is_some_and(|room| !box_hits_solid(&room.tiles, center, half, true))
    }

    pub(crate) fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2) -> u64 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        self.enemies.push(Enemy::new(id, kind, position));
        debug!(id, kind = kind.as_token(), x = position.x, y = position.y, "enemy_spawned");
        id
    }

    /// Applies damage unless god mode or post-hit invulnerability absorbs it.
    pub(crate) fn damage_player(&mut self, amount: i32) {
        if self.player.god_mode || self.player.invulnerable_remaining > 0.0 || amount <= 0 {
            return;
        }
        self.player.health = (self.player.health - amount).max(0);
        self.player.invulnerable_remaining = INVULNERABLE_SECONDS;
        debug!(amount, health = self.player.health, "player_damaged");
    }

    pub(crate) fn record_kill(&mut self, kind: EnemyKind, position: Vec2) {
        self.kills += 1;
        self.score += SCORE_PER_KILL;
        info!(kind = kind.as_token(), kills = self.kills, "enemy_killed");
        let roll = self.rng.gen_range(0..100);
        let drop = match roll {
            0..=19 => Some(PickupKind::Health),
            20..=44 => Some(PickupKind::Ammo),
            45..=74 => Some(PickupKind::Gold),
            _ => None,
        };
        if let Some(kind) = drop {
            self.pickups.push(Pickup { kind, position });
        }
    }

    /// Marks the current room cleared and moves on: back to exploring, to the
    /// shop once the floor quota is met, or to victory after the last floor.
    pub(crate) fn clear_current_room(&mut self) {
        if self.player.is_dead() {
            return;
        }
        let (room_x, room_y) = self.room;
        if let Some(room) = self.floor.room_mut(room_x, room_y) {
            room.cleared = true;
        }
        self.score += SCORE_PER_ROOM;
        info!(room_x, room_y, cleared_rooms = self.floor.cleared_count(), "room_cleared");

        if !self.floor.all_cleared() {
            self.set_phase(GamePhase::Playing);
            return;
        }
        self.score += SCORE_PER_FLOOR;
        self.projectiles.clear();
        if self.floor_index + 1 >= FLOOR_COUNT {
            self.set_phase(GamePhase::Victory);
        } else {
            self.shop_selected = 0;
            self.set_phase(GamePhase::Shop);
        }
    }

    pub(crate) fn is_affordable(&self, item: ShopItem) -> bool {
        self.gold >= item.cost()
    }

    pub(crate) fn move_shop_selection(&mut self, step: i32) {
        let len = ShopItem::ALL.len() as i32;
        self.shop_selected = (self.shop_selected as i32 + step).rem_euclid(len) as usize;
    }

    /// Buys one shop item. `Continue` leaves the shop for the next floor.
    pub(crate) fn buy(&mut self, item: ShopItem) -> Result<String, String> {
        if self.phase != GamePhase::Shop {
            return Err("shop is closed".to_string());
        }
        if item == ShopItem::Continue {
            self.advance_floor()
                .map_err(|err| format!("floor build failed: {err}"))?;
            return Ok(format!("shop_buy continue phase:{}", self.phase.as_token()));
        }
        if !self.is_affordable(item) {
            return Err(format!(
                "not enough gold for {}: cost {} have {}",
                item.as_token(),
                item.cost(),
                self.gold
            ));
        }
        self.gold -= item.cost();
        let player = &mut self.player;
        match item {
            ShopItem::Heal => player.heal(SHOP_HEAL_AMOUNT),
            ShopItem::Ammo => player.reserve_ammo += SHOP_AMMO_AMOUNT,
            ShopItem::Damage => {
                player.damage += SHOP_DAMAGE_BONUS;
                player.damage_upgrades += 1;
            }
            ShopItem::Clip => {
                player.clip_size += SHOP_CLIP_BONUS;
                player.clip_upgrades += 1;
            }
            ShopItem::MaxHealth => {
                player.max_health += SHOP_MAX_HEALTH_BONUS;
                player.heal(SHOP_MAX_HEALTH_BONUS);
                player.health_upgrades += 1;
            }
            ShopItem::Continue => {}
        }
        info!(item = item.as_token(), gold = self.gold, "shop_purchase");
        Ok(format!("shop_buy {} gold:{}", item.as_token(), self.gold))
    }
}
