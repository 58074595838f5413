//! Floor layout: a grid of rooms, each a walled tile grid with doors towards
//! its neighbours, plus tile collision queries.

use arcade_engine::{Tilemap, TilemapError, Vec2};
use rand::seq::SliceRandom;
use rand::Rng;

use super::types::DoorSide;
use super::{FLOOR_GRID, ROOM_TILES_H, ROOM_TILES_W, TILE_SIZE};

pub(crate) const TILE_FLOOR: u16 = 0;
pub(crate) const TILE_WALL: u16 = 1;
pub(crate) const TILE_PILLAR: u16 = 2;
pub(crate) const TILE_DOOR: u16 = 3;

const DOOR_COLUMNS: [u32; 2] = [ROOM_TILES_W / 2 - 1, ROOM_TILES_W / 2];
const DOOR_ROWS: [u32; 3] = [ROOM_TILES_H / 2 - 1, ROOM_TILES_H / 2, ROOM_TILES_H / 2 + 1];
const PILLAR_SLOTS: [(u32, u32); 8] = [
    (4, 3),
    (15, 3),
    (4, 11),
    (15, 11),
    (7, 4),
    (12, 4),
    (7, 10),
    (12, 10),
];
const MAX_PILLARS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Room {
    pub(crate) grid_x: u32,
    pub(crate) grid_y: u32,
    pub(crate) tiles: Tilemap,
    pub(crate) cleared: bool,
}

impl Room {
    pub(crate) fn has_door(&self, side: DoorSide) -> bool {
        neighbour_of(self.grid_x, self.grid_y, side).is_some()
    }

    pub(crate) fn doors(&self) -> impl Iterator<Item = DoorSide> + '_ {
        DoorSide::ALL.into_iter().filter(|side| self.has_door(*side))
    }

    /// Floor-space pixel origin of this room; the camera sits here.
    pub(crate) fn origin(&self) -> Vec2 {
        let (width, height) = room_size_px();
        Vec2::new(self.grid_x as f32 * width, self.grid_y as f32 * height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Floor {
    pub(crate) rooms: Vec<Room>,
}

impl Floor {
    pub(crate) fn room(&self, grid_x: u32, grid_y: u32) -> Option<&Room> {
        self.rooms
            .iter()
            .find(|room| room.grid_x == grid_x && room.grid_y == grid_y)
    }

    pub(crate) fn room_mut(&mut self, grid_x: u32, grid_y: u32) -> Option<&mut Room> {
        self.rooms
            .iter_mut()
            .find(|room| room.grid_x == grid_x && room.grid_y == grid_y)
    }

    pub(crate) fn all_cleared(&self) -> bool {
        self.rooms.iter().all(|room| room.cleared)
    }

    pub(crate) fn cleared_count(&self) -> usize {
        self.rooms.iter().filter(|room| room.cleared).count()
    }
}

pub(crate) fn start_room() -> (u32, u32) {
    (FLOOR_GRID / 2, FLOOR_GRID / 2)
}

pub(crate) fn room_size_px() -> (f32, f32) {
    (
        (ROOM_TILES_W * TILE_SIZE) as f32,
        (ROOM_TILES_H * TILE_SIZE) as f32,
    )
}

pub(crate) fn room_center() -> Vec2 {
    let (width, height) = room_size_px();
    Vec2::new(width / 2.0, height / 2.0)
}

pub(crate) fn neighbour_of(grid_x: u32, grid_y: u32, side: DoorSide) -> Option<(u32, u32)> {
    let (dx, dy) = side.offset();
    let x = grid_x as i32 + dx;
    let y = grid_y as i32 + dy;
    let limit = FLOOR_GRID as i32;
    if x < 0 || y < 0 || x >= limit || y >= limit {
        return None;
    }
    Some((x as u32, y as u32))
}

pub(crate) fn build_floor(rng: &mut impl Rng) -> Result<Floor, TilemapError> {
    let (start_x, start_y) = start_room();
    let mut rooms = Vec::with_capacity((FLOOR_GRID * FLOOR_GRID) as usize);
    for grid_y in 0..FLOOR_GRID {
        for grid_x in 0..FLOOR_GRID {
            let is_start = (grid_x, grid_y) == (start_x, start_y);
            let pillars = if is_start {
                Vec::new()
            } else {
                let count = rng.gen_range(0..=MAX_PILLARS);
                PILLAR_SLOTS
                    .choose_multiple(rng, count)
                    .copied()
                    .collect::<Vec<_>>()
            };
            rooms.push(Room {
                grid_x,
                grid_y,
                tiles: build_room_tiles(grid_x, grid_y, &pillars)?,
                cleared: is_start,
            });
        }
    }
    Ok(Floor { rooms })
}

fn build_room_tiles(
    grid_x: u32,
    grid_y: u32,
    pillars: &[(u32, u32)],
) -> Result<Tilemap, TilemapError> {
    let mut tiles = Tilemap::filled(ROOM_TILES_W, ROOM_TILES_H, TILE_SIZE, TILE_FLOOR)?;
    for x in 0..ROOM_TILES_W {
        tiles.set_tile(x, 0, TILE_WALL);
        tiles.set_tile(x, ROOM_TILES_H - 1, TILE_WALL);
    }
    for y in 0..ROOM_TILES_H {
        tiles.set_tile(0, y, TILE_WALL);
        tiles.set_tile(ROOM_TILES_W - 1, y, TILE_WALL);
    }
    for side in DoorSide::ALL {
        if neighbour_of(grid_x, grid_y, side).is_none() {
            continue;
        }
        for (x, y) in door_tiles(side) {
            tiles.set_tile(x, y, TILE_DOOR);
        }
    }
    for &(x, y) in pillars {
        tiles.set_tile(x, y, TILE_PILLAR);
    }
    Ok(tiles)
}

pub(crate) fn door_tiles(side: DoorSide) -> Vec<(u32, u32)> {
    match side {
        DoorSide::North => DOOR_COLUMNS.iter().map(|&x| (x, 0)).collect(),
        DoorSide::South => DOOR_COLUMNS.iter().map(|&x| (x, ROOM_TILES_H - 1)).collect(),
        DoorSide::West => DOOR_ROWS.iter().map(|&y| (0, y)).collect(),
        DoorSide::East => DOOR_ROWS.iter().map(|&y| (ROOM_TILES_W - 1, y)).collect(),
    }
}

/// Where the player appears after coming in through `side`.
pub(crate) fn entry_point(side: DoorSide) -> Vec2 {
    let (width, height) = room_size_px();
    let center = room_center();
    let inset = TILE_SIZE as f32 * 1.5;
    match side {
        DoorSide::North => Vec2::new(center.x, inset),
        DoorSide::South => Vec2::new(center.x, height - inset),
        DoorSide::West => Vec2::new(inset, center.y),
        DoorSide::East => Vec2::new(width - inset, center.y),
    }
}

/// Side whose doorway the point has walked out through, if any.
pub(crate) fn exit_side(position: Vec2) -> Option<DoorSide> {
    let (width, height) = room_size_px();
    if position.y < 0.0 {
        Some(DoorSide::North)
    } else if position.y >= height {
        Some(DoorSide::South)
    } else if position.x < 0.0 {
        Some(DoorSide::West)
    } else if position.x >= width {
        Some(DoorSide::East)
    } else {
        None
    }
}

pub(crate) fn is_solid_tile(tile: u16, doors_locked: bool) -> bool {
    match tile {
        TILE_WALL | TILE_PILLAR => true,
        TILE_DOOR => doors_locked,
        _ => false,
    }
}

/// True when the axis-aligned box overlaps any solid tile. Space outside the
/// map is open so the player can step out through a doorway.
pub(crate) fn box_hits_solid(tiles: &Tilemap, center: Vec2, half: f32, doors_locked: bool) -> bool {
    let size = tiles.tile_size_px() as f32;
    let min_x = ((center.x - half) / size).floor() as i32;
    let max_x = ((center.x + half - 0.001) / size).floor() as i32;
    let min_y = ((center.y - half) / size).floor() as i32;
    let max_y = ((center.y + half - 0.001) / size).floor() as i32;
    for ty in min_y..=max_y {
        for tx in min_x..=max_x {
            if tx < 0 || ty < 0 {
                continue;
            }
            if let Some(tile) = tiles.tile_at(tx as u32, ty as u32) {
                if is_solid_tile(tile, doors_locked) {
                    return true;
                }
            }
        }
    }
    false
}

/// Moves a box by `delta` one axis at a time; a blocked axis keeps its
/// previous coordinate.
pub(crate) fn move_with_collision(
    tiles: &Tilemap,
    position: Vec2,
    delta: Vec2,
    half: f32,
    doors_locked: bool,
) -> Vec2 {
    let mut next = position;
    let try_x = Vec2::new(position.x + delta.x, next.y);
    if !box_hits_solid(tiles, try_x, half, doors_locked) {
        next = try_x;
    }
    let try_y = Vec2::new(next.x, position.y + delta.y);
    if !box_hits_solid(tiles, try_y, half, doors_locked) {
        next = try_y;
    }
    next
}

pub(crate) fn point_hits_solid(tiles: &Tilemap, point: Vec2, doors_locked: bool) -> bool {
    tiles
        .tile_coords_at(point)
        .and_then(|(x, y)| tiles.tile_at(x, y))
        .is_some_and(|tile| is_solid_tile(tile, doors_locked))
}

pub(crate) fn in_room_bounds(point: Vec2) -> bool {
    let (width, height) = room_size_px();
    point.x >= 0.0 && point.y >= 0.0 && point.x < width && point.y < height
}
