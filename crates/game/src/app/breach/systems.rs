//! Per-tick simulation of a live run, in a fixed order:
//! input, player movement, room transition, firing, enemy AI, projectiles,
//! contact damage, deaths, pickups, timers and terminal checks.

use arcade_engine::{screen_to_world, InputAction, InputSnapshot, Vec2};
use harness_proto::GamePhase;
use tracing::info;

use super::level::{exit_side, in_room_bounds, move_with_collision, point_hits_solid};
use super::render::play_viewport;
use super::state::BreachState;
use super::types::{EnemyKind, PickupKind, Projectile, ProjectileOwner};
use super::{
    AMMO_PICKUP_AMOUNT, BULLET_HIT_SLOP, BULLET_LIFETIME_SECONDS, ENEMY_BULLET_DAMAGE,
    ENEMY_BULLET_SPEED, ENEMY_SIGHT_RADIUS, FIRE_COOLDOWN_SECONDS, GOLD_PICKUP_AMOUNT,
    HEALTH_PICKUP_AMOUNT, PATROL_ARRIVAL_THRESHOLD, PICKUP_RADIUS, PLAYER_BULLET_SPEED,
    PLAYER_HALF_SIZE, PLAYER_SPEED, RANGED_DISTANCE_SLACK, RANGED_FIRE_INTERVAL_SECONDS,
    RANGED_PREFERRED_DISTANCE, RELOAD_SECONDS,
};

pub(crate) fn step_run(state: &mut BreachState, dt: f32, input: &InputSnapshot) {
    update_aim(state, input);
    move_player(state, dt, input);
    if leave_room_if_outside(state) {
        return;
    }
    handle_weapon(state, input);
    update_enemies(state, dt);
    update_projectiles(state, dt);
    apply_contact_damage(state);
    resolve_deaths(state);
    collect_pickups(state);
    tick_timers(state, dt);
    check_terminal(state);
}

fn update_aim(state: &mut BreachState, input: &InputSnapshot) {
    let Some(cursor) = input.cursor_position_px() else {
        return;
    };
    let camera = state.camera();
    let target = screen_to_world(cursor, &camera, play_viewport()) - camera.position;
    let direction = (target - state.player.position).normalized_or_zero();
    if direction != Vec2::ZERO {
        state.player.aim = direction;
    }
}

pub(crate) fn movement_direction(input: &InputSnapshot) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if input.is_down(InputAction::MoveUp) {
        direction.y -= 1.0;
    }
    if input.is_down(InputAction::MoveDown) {
        direction.y += 1.0;
    }
    if input.is_down(InputAction::MoveLeft) {
        direction.x -= 1.0;
    }
    if input.is_down(InputAction::MoveRight) {
        direction.x += 1.0;
    }
    direction.normalized_or_zero()
}

fn move_player(state: &mut BreachState, dt: f32, input: &InputSnapshot) {
    let direction = movement_direction(input);
    state.player.velocity = direction * PLAYER_SPEED;
    if direction == Vec2::ZERO {
        return;
    }
    if input.cursor_position_px().is_none() {
        state.player.aim = direction;
    }
    let locked = state.doors_locked();
    let Some(room) = state.current_room() else {
        return;
    };
    let next = move_with_collision(
        &room.tiles,
        state.player.position,
        state.player.velocity * dt,
        PLAYER_HALF_SIZE,
        locked,
    );
    state.player.position = next;
}

/// True when the player walked through a doorway into the next room.
fn leave_room_if_outside(state: &mut BreachState) -> bool {
    let Some(side) = exit_side(state.player.position) else {
        return false;
    };
    if state.enter_room_through(side) {
        return true;
    }
    state.player.position = super::level::room_center();
    false
}

fn handle_weapon(state: &mut BreachState, input: &InputSnapshot) {
    let player = &mut state.player;
    if input.just_pressed(InputAction::Reload) && player.can_start_reload() {
        player.reload_remaining = RELOAD_SECONDS;
    }
    if !input.is_down(InputAction::Fire) || player.is_reloading() || player.fire_cooldown > 0.0 {
        return;
    }
    if player.ammo == 0 {
        if player.can_start_reload() {
            player.reload_remaining = RELOAD_SECONDS;
        }
        return;
    }
    player.ammo -= 1;
    player.fire_cooldown = FIRE_COOLDOWN_SECONDS;
    let projectile = Projectile {
        position: player.position + player.aim * (PLAYER_HALF_SIZE + 1.0),
        velocity: player.aim * PLAYER_BULLET_SPEED,
        damage: player.damage,
        lifetime: BULLET_LIFETIME_SECONDS,
        owner: ProjectileOwner::Player,
    };
    state.projectiles.push(projectile);
}

fn update_enemies(state: &mut BreachState, dt: f32) {
    let player_position = state.player.position;
    let Some(room) = state.floor.room(state.room.0, state.room.1) else {
        return;
    };
    let mut shots = Vec::new();
    for enemy in &mut state.enemies {
        if enemy.health <= 0 {
            continue;
        }
        enemy.attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);
        let to_player = player_position - enemy.position;
        let distance = to_player.length();
        enemy.visible = distance <= ENEMY_SIGHT_RADIUS;

        let heading = match enemy.kind {
            EnemyKind::Melee if enemy.visible => to_player.normalized_or_zero(),
            EnemyKind::Melee => Vec2::ZERO,
            EnemyKind::Ranged if enemy.visible => {
                if distance < RANGED_PREFERRED_DISTANCE - RANGED_DISTANCE_SLACK {
                    to_player.normalized_or_zero() * -1.0
                } else if distance > RANGED_PREFERRED_DISTANCE + RANGED_DISTANCE_SLACK {
                    to_player.normalized_or_zero()
                } else {
                    Vec2::ZERO
                }
            }
            EnemyKind::Ranged => Vec2::ZERO,
            EnemyKind::Patrol => {
                let target = enemy.waypoints[enemy.waypoint_index];
                if enemy.position.distance_to(target) <= PATROL_ARRIVAL_THRESHOLD {
                    enemy.waypoint_index = 1 - enemy.waypoint_index;
                }
                (enemy.waypoints[enemy.waypoint_index] - enemy.position).normalized_or_zero()
            }
        };

        enemy.velocity = heading * enemy.kind.speed();
        let before = enemy.position;
        enemy.position = move_with_collision(
            &room.tiles,
            enemy.position,
            enemy.velocity * dt,
            enemy.kind.half_size(),
            true,
        );
        if enemy.kind == EnemyKind::Patrol && heading != Vec2::ZERO && enemy.position == before {
            enemy.waypoint_index = 1 - enemy.waypoint_index;
        }

        if enemy.kind == EnemyKind::Ranged && enemy.visible && enemy.attack_cooldown <= 0.0 {
            enemy.attack_cooldown = RANGED_FIRE_INTERVAL_SECONDS;
            let direction = to_player.normalized_or_zero();
            if direction != Vec2::ZERO {
                shots.push(Projectile {
                    position: enemy.position + direction * (enemy.kind.half_size() + 1.0),
                    velocity: direction * ENEMY_BULLET_SPEED,
                    damage: ENEMY_BULLET_DAMAGE,
                    lifetime: BULLET_LIFETIME_SECONDS,
                    owner: ProjectileOwner::Enemy,
                });
            }
        }
    }
    state.projectiles.extend(shots);
}

fn update_projectiles(state: &mut BreachState, dt: f32) {
    let locked = state.doors_locked();
    let mut player_hits = Vec::new();
    {
        let Some(room) = state.floor.room(state.room.0, state.room.1) else {
            return;
        };
        let player_position = state.player.position;
        let enemies = &mut state.enemies;
        state.projectiles.retain_mut(|projectile| {
            projectile.lifetime -= dt;
            projectile.position = projectile.position + projectile.velocity * dt;
            if projectile.lifetime <= 0.0
                || !in_room_bounds(projectile.position)
                || point_hits_solid(&room.tiles, projectile.position, locked)
            {
                return false;
            }
            match projectile.owner {
                ProjectileOwner::Player => {
                    let hit = enemies.iter_mut().find(|enemy| {
                        enemy.health > 0
                            && overlaps(
                                projectile.position,
                                enemy.position,
                                enemy.kind.half_size() + BULLET_HIT_SLOP,
                            )
                    });
                    match hit {
                        Some(enemy) => {
                            enemy.health -= projectile.damage;
                            false
                        }
                        None => true,
                    }
                }
                ProjectileOwner::Enemy => {
                    if overlaps(
                        projectile.position,
                        player_position,
                        PLAYER_HALF_SIZE + BULLET_HIT_SLOP,
                    ) {
                        player_hits.push(projectile.damage);
                        false
                    } else {
                        true
                    }
                }
            }
        });
    }
    for damage in player_hits {
        state.damage_player(damage);
    }
}

fn overlaps(point: Vec2, center: Vec2, reach: f32) -> bool {
    (point.x - center.x).abs() <= reach && (point.y - center.y).abs() <= reach
}

fn apply_contact_damage(state: &mut BreachState) {
    let player_position = state.player.position;
    let contact = state
        .enemies
        .iter()
        .filter(|enemy| {
            enemy.health > 0
                && overlaps(
                    enemy.position,
                    player_position,
                    enemy.kind.half_size() + PLAYER_HALF_SIZE,
                )
        })
        .map(|enemy| enemy.kind.contact_damage())
        .max();
    if let Some(damage) = contact {
        state.damage_player(damage);
    }
}

fn resolve_deaths(state: &mut BreachState) {
    let mut fallen = Vec::new();
    state.enemies.retain(|enemy| {
        if enemy.health <= 0 {
            fallen.push((enemy.kind, enemy.position));
            false
        } else {
            true
        }
    });
    for (kind, position) in fallen {
        state.record_kill(kind, position);
    }
    // A player killed this tick loses the run even if the room emptied.
    let room_emptied = state.phase == GamePhase::Combat && state.enemies.is_empty();
    if room_emptied && !state.player.is_dead() {
        state.clear_current_room();
    }
}

fn collect_pickups(state: &mut BreachState) {
    let player_position = state.player.position;
    let mut collected = Vec::new();
    state.pickups.retain(|pickup| {
        if pickup.position.distance_to(player_position) <= PICKUP_RADIUS {
            collected.push(pickup.kind);
            false
        } else {
            true
        }
    });
    for kind in collected {
        match kind {
            PickupKind::Health => state.player.heal(HEALTH_PICKUP_AMOUNT),
            PickupKind::Ammo => state.player.reserve_ammo += AMMO_PICKUP_AMOUNT,
            PickupKind::Gold => state.gold += GOLD_PICKUP_AMOUNT,
        }
        info!(kind = kind.as_token(), "pickup_collected");
    }
}

fn tick_timers(state: &mut BreachState, dt: f32) {
    let player = &mut state.player;
    player.fire_cooldown = (player.fire_cooldown - dt).max(0.0);
    player.invulnerable_remaining = (player.invulnerable_remaining - dt).max(0.0);
    if player.is_reloading() {
        player.reload_remaining -= dt;
        if player.reload_remaining <= 0.0 {
            player.finish_reload();
        }
    }
    if state.phase.is_in_run() {
        state.timer_seconds = (state.timer_seconds - dt).max(0.0);
    }
}

fn check_terminal(state: &mut BreachState) {
    if !state.phase.is_in_run() {
        return;
    }
    if state.player.is_dead() {
        info!(score = state.score, kills = state.kills, "player_died");
        state.set_phase(GamePhase::GameOver);
    } else if state.timer_seconds <= 0.0 {
        info!(score = state.score, "floor_timer_expired");
        state.set_phase(GamePhase::GameOver);
    }
}
