use arcade_engine::{text_width, world_to_screen, Camera2D, Canvas, Rgba, Vec2, Viewport};
use harness_proto::GamePhase;

use super::level::{door_tiles, Room, TILE_DOOR, TILE_PILLAR, TILE_WALL};
use super::state::BreachState;
use super::types::{EnemyKind, PickupKind, ProjectileOwner, ShopItem};
use super::{CANVAS_WIDTH, HUD_HEIGHT_PX, PLAYER_HALF_SIZE, ROOM_TILES_H, TILE_SIZE};

const BACKGROUND: Rgba = [8, 8, 14, 255];
const FLOOR: Rgba = [28, 30, 38, 255];
const FLOOR_CLEARED: Rgba = [26, 36, 34, 255];
const WALL: Rgba = [70, 74, 92, 255];
const PILLAR: Rgba = [96, 88, 72, 255];
const DOOR_OPEN: Rgba = [40, 70, 60, 255];
const DOOR_LOCKED: Rgba = [150, 40, 40, 255];
const PLAYER: Rgba = [90, 200, 255, 255];
const PLAYER_HIT: Rgba = [255, 255, 255, 255];
const AIM_MARKER: Rgba = [255, 240, 120, 255];
const MELEE: Rgba = [220, 70, 60, 255];
const RANGED: Rgba = [220, 140, 40, 255];
const PATROL: Rgba = [170, 80, 200, 255];
const PLAYER_BULLET: Rgba = [255, 250, 180, 255];
const ENEMY_BULLET: Rgba = [255, 90, 90, 255];
const PICKUP_HEALTH: Rgba = [80, 220, 100, 255];
const PICKUP_AMMO: Rgba = [230, 210, 80, 255];
const PICKUP_GOLD: Rgba = [250, 180, 30, 255];
const HUD_BACKGROUND: Rgba = [16, 16, 24, 255];
const HUD_TEXT: Rgba = [220, 220, 230, 255];
const HUD_DIM: Rgba = [110, 110, 130, 255];
const HEALTH_FILL: Rgba = [200, 60, 70, 255];
const HEALTH_EMPTY: Rgba = [60, 24, 28, 255];
const PANEL_SHADE: Rgba = [0, 0, 0, 170];
const TITLE_TEXT: Rgba = [255, 210, 90, 255];

const AIM_MARKER_DISTANCE: f32 = 12.0;

pub(crate) fn play_viewport() -> Viewport {
    Viewport {
        origin_x: 0,
        origin_y: HUD_HEIGHT_PX as i32,
        width: CANVAS_WIDTH,
        height: ROOM_TILES_H * TILE_SIZE,
    }
}

pub(crate) fn render_state(state: &BreachState, canvas: &mut Canvas<'_>) {
    canvas.clear(BACKGROUND);
    let camera = state.camera();
    let viewport = play_viewport();
    if let Some(room) = state.current_room() {
        draw_room(canvas, room, state.doors_locked(), &camera, viewport);
    }
    let to_screen = |local: Vec2| world_to_screen(local + camera.position, &camera, viewport);

    if state.phase != GamePhase::Title {
        for pickup in &state.pickups {
            let (x, y) = to_screen(pickup.position);
            let color = match pickup.kind {
                PickupKind::Health => PICKUP_HEALTH,
                PickupKind::Ammo => PICKUP_AMMO,
                PickupKind::Gold => PICKUP_GOLD,
            };
            canvas.fill_square_centered(x, y, 3, color);
            if pickup.kind == PickupKind::Health {
                canvas.draw_cross(x, y, 2, PLAYER_HIT);
            }
        }
        for projectile in &state.projectiles {
            let (x, y) = to_screen(projectile.position);
            let color = match projectile.owner {
                ProjectileOwner::Player => PLAYER_BULLET,
                ProjectileOwner::Enemy => ENEMY_BULLET,
            };
            canvas.fill_square_centered(x, y, 1, color);
        }
        for enemy in &state.enemies {
            let (x, y) = to_screen(enemy.position);
            let base = match enemy.kind {
                EnemyKind::Melee => MELEE,
                EnemyKind::Ranged => RANGED,
                EnemyKind::Patrol => PATROL,
            };
            let color = if enemy.visible { base } else { dim(base) };
            canvas.fill_square_centered(x, y, enemy.kind.half_size() as i32, color);
        }

        let player = &state.player;
        let (px, py) = to_screen(player.position);
        let flashing = player.invulnerable_remaining > 0.0
            && (player.invulnerable_remaining * 20.0) as i32 % 2 == 0;
        let body = if flashing { PLAYER_HIT } else { PLAYER };
        canvas.fill_square_centered(px, py, PLAYER_HALF_SIZE as i32, body);
        let (ax, ay) = to_screen(player.position + player.aim * AIM_MARKER_DISTANCE);
        canvas.draw_line(px, py, ax, ay, AIM_MARKER);
        canvas.draw_cross(ax, ay, 2, AIM_MARKER);
    }

    draw_hud(state, canvas);
    match state.phase {
        GamePhase::Title => draw_title_panel(canvas),
        GamePhase::Shop => draw_shop_panel(state, canvas),
        GamePhase::GameOver => draw_end_panel(state, canvas, "GAME OVER"),
        GamePhase::Victory => draw_end_panel(state, canvas, "VICTORY!"),
        GamePhase::Playing | GamePhase::Combat => {}
    }
}

fn dim(color: Rgba) -> Rgba {
    [color[0] / 2, color[1] / 2, color[2] / 2, color[3]]
}

fn draw_room(
    canvas: &mut Canvas<'_>,
    room: &Room,
    doors_locked: bool,
    camera: &Camera2D,
    viewport: Viewport,
) {
    let size = room.tiles.tile_size_px() as i32;
    let origin = room.origin();
    let floor = if room.cleared { FLOOR_CLEARED } else { FLOOR };
    for ty in 0..room.tiles.height() {
        for tx in 0..room.tiles.width() {
            let Some(tile) = room.tiles.tile_at(tx, ty) else {
                continue;
            };
            let color = match tile {
                TILE_WALL => WALL,
                TILE_PILLAR => PILLAR,
                TILE_DOOR if doors_locked => DOOR_LOCKED,
                TILE_DOOR => DOOR_OPEN,
                _ => floor,
            };
            let world = origin + Vec2::new((tx as i32 * size) as f32, (ty as i32 * size) as f32);
            let (x, y) = world_to_screen(world, camera, viewport);
            canvas.fill_rect(x, y, size, size, color);
        }
    }
    if doors_locked {
        for side in room.doors() {
            for (tx, ty) in door_tiles(side) {
                let offset = Vec2::new((tx as i32 * size) as f32, (ty as i32 * size) as f32);
                let world = origin + offset;
                let (x, y) = world_to_screen(world, camera, viewport);
                canvas.stroke_rect(x, y, size, size, dim(DOOR_LOCKED));
            }
        }
    }
}

fn draw_hud(state: &BreachState, canvas: &mut Canvas<'_>) {
    canvas.fill_rect(0, 0, CANVAS_WIDTH as i32, HUD_HEIGHT_PX as i32, HUD_BACKGROUND);
    if state.phase == GamePhase::Title {
        return;
    }
    let player = &state.player;
    let health_fraction = player.health as f32 / player.max_health.max(1) as f32;
    canvas.draw_bar(4, 2, 60, 5, health_fraction, HEALTH_FILL, HEALTH_EMPTY);
    canvas.draw_text(
        4,
        9,
        &format!("HP {}/{}", player.health, player.max_health),
        1,
        HUD_TEXT,
    );

    if player.is_reloading() {
        canvas.draw_text(70, 2, "RELOAD", 1, AIM_MARKER);
    } else {
        for pip in 0..player.clip_size as i32 {
            let color = if (pip as u32) < player.ammo {
                PICKUP_AMMO
            } else {
                HUD_DIM
            };
            canvas.fill_rect(70 + pip * 3, 2, 2, 5, color);
        }
    }
    canvas.draw_text(70, 9, &format!("R {}", player.reserve_ammo), 1, HUD_TEXT);

    let right = CANVAS_WIDTH as i32 - 4;
    let score = format!("SCORE {}", state.score);
    canvas.draw_text(right - text_width(&score, 1), 2, &score, 1, HUD_TEXT);
    let total = state.timer_seconds.ceil().max(0.0) as u32;
    let status = format!(
        "G {}  F{}  {}:{:02}",
        state.gold,
        state.floor_index + 1,
        total / 60,
        total % 60
    );
    canvas.draw_text(right - text_width(&status, 1), 9, &status, 1, HUD_TEXT);
}

fn shade_play_area(canvas: &mut Canvas<'_>) {
    let viewport = play_viewport();
    canvas.fill_rect(
        viewport.origin_x,
        viewport.origin_y,
        viewport.width as i32,
        viewport.height as i32,
        PANEL_SHADE,
    );
}

fn draw_title_panel(canvas: &mut Canvas<'_>) {
    shade_play_area(canvas);
    let center_x = CANVAS_WIDTH as i32 / 2;
    canvas.draw_text_centered(center_x, 80, "HIVE BREACH", 3, TITLE_TEXT);
    canvas.draw_text_centered(center_x, 120, "CLEAR EVERY ROOM. SURVIVE THE CLOCK.", 1, HUD_TEXT);
    canvas.draw_text_centered(center_x, 150, "PRESS ENTER", 2, HUD_TEXT);
    canvas.draw_text_centered(
        center_x,
        200,
        "WASD MOVE  MOUSE AIM  SPACE FIRE  R RELOAD",
        1,
        HUD_DIM,
    );
}

fn draw_shop_panel(state: &BreachState, canvas: &mut Canvas<'_>) {
    shade_play_area(canvas);
    let center_x = CANVAS_WIDTH as i32 / 2;
    canvas.draw_text_centered(
        center_x,
        36,
        &format!("FLOOR {} CLEARED", state.floor_index + 1),
        2,
        TITLE_TEXT,
    );
    canvas.draw_text_centered(center_x, 56, &format!("GOLD {}", state.gold), 1, HUD_TEXT);
    let mut y = 76;
    for (index, item) in ShopItem::ALL.into_iter().enumerate() {
        let color = if item == ShopItem::Continue || state.is_affordable(item) {
            HUD_TEXT
        } else {
            HUD_DIM
        };
        if index == state.shop_selected {
            canvas.draw_text(96, y, ">", 1, AIM_MARKER);
        }
        canvas.draw_text(104, y, item.label(), 1, color);
        if item != ShopItem::Continue {
            canvas.draw_text(200, y, &format!("{}G", item.cost()), 1, color);
        }
        y += 14;
    }
    let player = &state.player;
    canvas.draw_text_centered(
        center_x,
        y + 8,
        &format!(
            "UPGRADES  DMG {}  CLIP {}  HP {}",
            player.damage_upgrades, player.clip_upgrades, player.health_upgrades
        ),
        1,
        HUD_DIM,
    );
}

fn draw_end_panel(state: &BreachState, canvas: &mut Canvas<'_>, heading: &str) {
    shade_play_area(canvas);
    let center_x = CANVAS_WIDTH as i32 / 2;
    canvas.draw_text_centered(center_x, 80, heading, 3, TITLE_TEXT);
    canvas.draw_text_centered(
        center_x,
        120,
        &format!("SCORE {}  KILLS {}", state.score, state.kills),
        1,
        HUD_TEXT,
    );
    canvas.draw_text_centered(center_x, 150, "PRESS ENTER", 2, HUD_TEXT);
}
