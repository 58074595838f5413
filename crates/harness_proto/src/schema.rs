use serde::{Deserialize, Serialize};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Title,
    Playing,
    Combat,
    Shop,
    GameOver,
    Victory,
}

impl GamePhase {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Playing => "playing",
            Self::Combat => "combat",
            Self::Shop => "shop",
            Self::GameOver => "gameover",
            Self::Victory => "victory",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "title" => Some(Self::Title),
            "playing" => Some(Self::Playing),
            "combat" => Some(Self::Combat),
            "shop" => Some(Self::Shop),
            "gameover" => Some(Self::GameOver),
            "victory" => Some(Self::Victory),
            _ => None,
        }
    }

    /// True while a run is live and the world simulates.
    pub fn is_in_run(self) -> bool {
        matches!(self, Self::Playing | Self::Combat)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub max_health: i32,
    pub ammo: u32,
    pub clip_size: u32,
    pub reserve_ammo: u32,
    pub reloading: bool,
    pub god_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: u64,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub health: i32,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSnapshot {
    pub kind: String,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorSnapshot {
    pub side: String,
    pub open: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub x: u32,
    pub y: u32,
    pub cleared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItemSnapshot {
    pub item: String,
    pub cost: u32,
    pub affordable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSnapshot {
    pub selected: usize,
    pub items: Vec<ShopItemSnapshot>,
}

/// Serializable view of a running game, returned by `get_state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessSnapshot {
    pub schema_version: u32,
    pub phase: GamePhase,
    pub tick: u64,
    pub floor: u32,
    pub floor_count: u32,
    pub timer_seconds: f32,
    pub score: u32,
    pub gold: u32,
    pub kills: u32,
    pub player: Option<PlayerSnapshot>,
    pub enemies: Vec<EnemySnapshot>,
    pub projectiles: usize,
    pub pickups: Vec<PickupSnapshot>,
    pub doors: Vec<DoorSnapshot>,
    pub camera: CameraSnapshot,
    pub room: Option<RoomSnapshot>,
    pub shop: Option<ShopSnapshot>,
}

impl HarnessSnapshot {
    pub fn empty(phase: GamePhase) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            phase,
            tick: 0,
            floor: 0,
            floor_count: 0,
            timer_seconds: 0.0,
            score: 0,
            gold: 0,
            kills: 0,
            player: None,
            enemies: Vec::new(),
            projectiles: 0,
            pickups: Vec::new(),
            doors: Vec::new(),
            camera: CameraSnapshot::default(),
            room: None,
            shop: None,
        }
    }
}
