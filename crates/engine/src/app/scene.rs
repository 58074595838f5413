use std::ops::{Add, Mul, Sub};

use harness_proto::{GamePhase, HarnessSnapshot};
use thiserror::Error;

use super::input::{ActionStates, InputAction};
use super::rendering::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Unload and reload the scene from scratch.
    Restart,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantResource {
    Gold,
    Ammo,
    Health,
    Score,
}

impl GrantResource {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "gold" => Some(Self::Gold),
            "ammo" => Some(Self::Ammo),
            "health" => Some(Self::Health),
            "score" => Some(Self::Score),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneDebugCommand {
    ForceStart,
    GodMode { enabled: bool },
    Grant { resource: GrantResource, amount: u32 },
    SetHealth { value: i32 },
    SpawnEnemy {
        kind: String,
        position: Option<(f32, f32)>,
    },
    ShopBuy { item: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneDebugCommandResult {
    Unsupported,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    pressed: ActionStates,
    cursor_position_px: Option<Vec2>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        pressed: ActionStates,
        cursor_position_px: Option<Vec2>,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            pressed,
            cursor_position_px,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    /// True only on the tick the action went down.
    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.pressed.is_down(action)
    }

    pub fn cursor_position_px(&self) -> Option<Vec2> {
        self.cursor_position_px
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    /// Marks the action as held and freshly pressed.
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.set(action, true);
        self.pressed.set(action, true);
        self
    }

    pub fn with_cursor_position_px(mut self, cursor_position_px: Option<Vec2>) -> Self {
        self.cursor_position_px = cursor_position_px;
        self
    }

    /// Overlays harness-injected input on top of this snapshot.
    pub(crate) fn merged_with(
        mut self,
        actions: ActionStates,
        pressed: ActionStates,
        cursor_position_px: Option<Vec2>,
    ) -> Self {
        self.actions = self.actions.merged(actions);
        self.pressed = self.pressed.merged(pressed);
        if cursor_position_px.is_some() {
            self.cursor_position_px = cursor_position_px;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    pub fn normalized_or_zero(self) -> Vec2 {
        let length = self.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Vec2::ZERO;
        }
        Vec2 {
            x: self.x / length,
            y: self.y / length,
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Canvas-space camera: `position` is the world point drawn at the
/// top-left of the play area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
}

/// Row-major tile grid. Tile (x,y) covers
/// `[x*tile_size, (x+1)*tile_size) x [y*tile_size, (y+1)*tile_size)` in world pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_size_px: u32,
    tiles: Vec<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile size must be non-zero")]
    ZeroTileSize,
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_size_px: u32,
        tiles: Vec<u16>,
    ) -> Result<Self, TilemapError> {
        if tile_size_px == 0 {
            return Err(TilemapError::ZeroTileSize);
        }
        let expected = width as usize * height as usize;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tile_size_px,
            tiles,
        })
    }

    pub fn filled(
        width: u32,
        height: u32,
        tile_size_px: u32,
        tile: u16,
    ) -> Result<Self, TilemapError> {
        Self::new(
            width,
            height,
            tile_size_px,
            vec![tile; width as usize * height as usize],
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size_px(&self) -> u32 {
        self.tile_size_px
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<u16> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn set_tile(&mut self, x: u32, y: u32, tile: u16) -> bool {
        match self.index_of(x, y) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Tile coordinates under a world point, `None` outside the map.
    pub fn tile_coords_at(&self, point: Vec2) -> Option<(u32, u32)> {
        if point.x < 0.0 || point.y < 0.0 || !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        let size = self.tile_size_px as f32;
        let x = (point.x / size).floor() as u32;
        let y = (point.y / size).floor() as u32;
        self.index_of(x, y).map(|_| (x, y))
    }

    pub fn tile_center(&self, x: u32, y: u32) -> Option<Vec2> {
        self.index_of(x, y)?;
        let size = self.tile_size_px as f32;
        Some(Vec2 {
            x: (x as f32 + 0.5) * size,
            y: (y as f32 + 0.5) * size,
        })
    }

    pub fn size_px(&self) -> (f32, f32) {
        (
            (self.width * self.tile_size_px) as f32,
            (self.height * self.tile_size_px) as f32,
        )
    }
}

/// Contract between the engine loop and one game.
pub trait Scene {
    fn load(&mut self);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand;
    fn render(&self, canvas: &mut Canvas<'_>);
    fn unload(&mut self);
    fn phase(&self) -> GamePhase;
    fn harness_snapshot(&self) -> HarnessSnapshot;
    fn debug_title(&self) -> Option<String> {
        None
    }
    fn execute_debug_command(&mut self, _command: SceneDebugCommand) -> SceneDebugCommandResult {
        SceneDebugCommandResult::Unsupported
    }
}

pub(crate) struct SceneHost {
    scene: Box<dyn Scene>,
    is_loaded: bool,
    tick: u64,
}

impl SceneHost {
    pub(crate) fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            is_loaded: false,
            tick: 0,
        }
    }

    pub(crate) fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load();
        self.is_loaded = true;
    }

    pub(crate) fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> SceneCommand {
        self.tick = self.tick.saturating_add(1);
        self.scene.update(fixed_dt_seconds, input)
    }

    pub(crate) fn render(&self, canvas: &mut Canvas<'_>) {
        self.scene.render(canvas);
    }

    pub(crate) fn tick(&self) -> u64 {
        self.tick
    }

    pub(crate) fn phase(&self) -> GamePhase {
        self.scene.phase()
    }

    pub(crate) fn snapshot(&self) -> HarnessSnapshot {
        let mut snapshot = self.scene.harness_snapshot();
        snapshot.tick = self.tick;
        snapshot
    }

    pub(crate) fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub(crate) fn execute_debug_command(
        &mut self,
        command: SceneDebugCommand,
    ) -> SceneDebugCommandResult {
        self.scene.execute_debug_command(command)
    }

    pub(crate) fn hard_reset(&mut self) {
        if self.is_loaded {
            self.scene.unload();
        }
        self.scene.load();
        self.is_loaded = true;
    }

    pub(crate) fn shutdown(&mut self) {
        if self.is_loaded {
            self.scene.unload();
            self.is_loaded = false;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingScene;
    use super::*;

    #[test]
    fn tilemap_rejects_mismatched_tile_count() {
        assert_eq!(
            Tilemap::new(3, 2, 16, vec![0; 5]),
            Err(TilemapError::TileCountMismatch {
                expected: 6,
                actual: 5
            })
        );
        assert_eq!(
            Tilemap::new(1, 1, 0, vec![0]),
            Err(TilemapError::ZeroTileSize)
        );
    }

    #[test]
    fn tilemap_coordinates_follow_tile_size() {
        let mut map = Tilemap::filled(4, 3, 16, 0).expect("map");
        assert!(map.set_tile(2, 1, 7));
        assert!(!map.set_tile(4, 0, 7));
        assert_eq!(map.tile_coords_at(Vec2::new(40.0, 20.0)), Some((2, 1)));
        assert_eq!(map.tile_at(2, 1), Some(7));
        assert_eq!(map.tile_coords_at(Vec2::new(-1.0, 4.0)), None);
        assert_eq!(map.tile_coords_at(Vec2::new(64.0, 4.0)), None);
        assert_eq!(map.tile_center(0, 0), Some(Vec2::new(8.0, 8.0)));
        assert_eq!(map.size_px(), (64.0, 48.0));
    }

    #[test]
    fn vec2_normalization_handles_zero() {
        assert_eq!(Vec2::ZERO.normalized_or_zero(), Vec2::ZERO);
        let unit = Vec2::new(3.0, 4.0).normalized_or_zero();
        assert!((unit.length() - 1.0).abs() < 0.0001);
        assert!((Vec2::new(0.0, 0.0).distance_to(Vec2::new(3.0, 4.0)) - 5.0).abs() < 0.0001);
    }

    #[test]
    fn just_pressed_implies_down() {
        let snapshot = InputSnapshot::empty().with_action_pressed(InputAction::Confirm);
        assert!(snapshot.is_down(InputAction::Confirm));
        assert!(snapshot.just_pressed(InputAction::Confirm));
        assert!(!snapshot.just_pressed(InputAction::Fire));
    }

    #[test]
    fn merged_injection_keeps_real_cursor_when_none_injected() {
        let real = InputSnapshot::empty().with_cursor_position_px(Some(Vec2::new(5.0, 6.0)));
        let mut injected = ActionStates::default();
        injected.set(InputAction::MoveLeft, true);

        let merged = real.merged_with(injected, ActionStates::default(), None);
        assert!(merged.is_down(InputAction::MoveLeft));
        assert_eq!(merged.cursor_position_px(), Some(Vec2::new(5.0, 6.0)));

        let overridden = real.merged_with(
            ActionStates::default(),
            ActionStates::default(),
            Some(Vec2::new(1.0, 1.0)),
        );
        assert_eq!(overridden.cursor_position_px(), Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn host_load_is_idempotent_and_reset_reloads() {
        let mut host = SceneHost::new(Box::new(RecordingScene::default()));
        host.load();
        host.load();
        host.update(1.0 / 60.0, &InputSnapshot::empty().with_action_pressed(InputAction::Confirm));
        assert_eq!(host.phase(), GamePhase::Playing);
        assert_eq!(host.tick(), 1);

        host.hard_reset();
        assert_eq!(host.phase(), GamePhase::Title);
        assert_eq!(host.snapshot().tick, 1);

        host.shutdown();
        host.shutdown();
    }

    #[test]
    fn host_render_draws_into_canvas() {
        let host = SceneHost::new(Box::new(RecordingScene::default()));
        let mut frame = vec![0u8; 2 * 2 * 4];
        let mut canvas = Canvas::new(&mut frame, 2, 2);
        host.render(&mut canvas);
        assert_eq!(canvas.pixel(1, 1), Some([1, 2, 3, 255]));
    }
}
