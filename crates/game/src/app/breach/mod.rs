//! "Hive Breach": a twin-stick room-clearing roguelike.
//!
//! A run descends `FLOOR_COUNT` floors. Each floor is a 3x3 grid of rooms;
//! entering an uncleared room seals its doors and spawns a wave. Clearing every
//! room opens the shop, and clearing the last floor wins the run. The floor
//! timer running out or health reaching zero ends it.

mod level;
mod render;
mod scene;
mod snapshot;
mod state;
mod systems;
mod types;

pub(crate) use scene::BreachScene;

pub(crate) const TILE_SIZE: u32 = 16;
pub(crate) const ROOM_TILES_W: u32 = 20;
pub(crate) const ROOM_TILES_H: u32 = 15;
pub(crate) const FLOOR_GRID: u32 = 3;
pub(crate) const FLOOR_COUNT: u32 = 3;
pub(crate) const FLOOR_TIME_SECONDS: f32 = 180.0;
pub(crate) const HUD_HEIGHT_PX: u32 = 16;
pub(crate) const CANVAS_WIDTH: u32 = ROOM_TILES_W * TILE_SIZE;
pub(crate) const CANVAS_HEIGHT: u32 = ROOM_TILES_H * TILE_SIZE + HUD_HEIGHT_PX;

const PLAYER_SPEED: f32 = 90.0;
const PLAYER_HALF_SIZE: f32 = 5.0;
const PLAYER_MAX_HEALTH: i32 = 100;
const PLAYER_CLIP_SIZE: u32 = 12;
const PLAYER_START_RESERVE: u32 = 48;
const PLAYER_BULLET_DAMAGE: i32 = 10;
const PLAYER_BULLET_SPEED: f32 = 240.0;
const RELOAD_SECONDS: f32 = 1.2;
const FIRE_COOLDOWN_SECONDS: f32 = 0.18;
const INVULNERABLE_SECONDS: f32 = 0.5;
const BULLET_LIFETIME_SECONDS: f32 = 1.5;
const BULLET_HIT_SLOP: f32 = 2.0;

const ENEMY_BULLET_SPEED: f32 = 120.0;
const ENEMY_BULLET_DAMAGE: i32 = 8;
const ENEMY_SIGHT_RADIUS: f32 = 120.0;
const RANGED_PREFERRED_DISTANCE: f32 = 80.0;
const RANGED_DISTANCE_SLACK: f32 = 16.0;
const RANGED_FIRE_INTERVAL_SECONDS: f32 = 1.6;
const PATROL_ARRIVAL_THRESHOLD: f32 = 2.0;
const MIN_SPAWN_DISTANCE: f32 = 64.0;
const SPAWN_ATTEMPTS: u32 = 32;

const PICKUP_RADIUS: f32 = 10.0;
const HEALTH_PICKUP_AMOUNT: i32 = 25;
const AMMO_PICKUP_AMOUNT: u32 = 12;
const GOLD_PICKUP_AMOUNT: u32 = 5;

const SCORE_PER_KILL: u32 = 100;
const SCORE_PER_ROOM: u32 = 250;
const SCORE_PER_FLOOR: u32 = 1000;

const SHOP_HEAL_AMOUNT: i32 = 25;
const SHOP_AMMO_AMOUNT: u32 = 24;
const SHOP_DAMAGE_BONUS: i32 = 5;
const SHOP_CLIP_BONUS: u32 = 4;
const SHOP_MAX_HEALTH_BONUS: i32 = 20;
