use arcade_engine::Vec2;

use super::{PLAYER_BULLET_DAMAGE, PLAYER_CLIP_SIZE, PLAYER_MAX_HEALTH, PLAYER_START_RESERVE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnemyKind {
    /// Chases the player once it is in sight.
    Melee,
    /// Keeps its distance and shoots.
    Ranged,
    /// Walks back and forth between two waypoints.
    Patrol,
}

impl EnemyKind {
    pub(crate) const ALL: [EnemyKind; 3] = [Self::Melee, Self::Ranged, Self::Patrol];

    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Melee => "melee",
            Self::Ranged => "ranged",
            Self::Patrol => "patrol",
        }
    }

    pub(crate) fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_token().eq_ignore_ascii_case(token))
    }

    pub(crate) fn max_health(self) -> i32 {
        match self {
            Self::Melee => 30,
            Self::Ranged => 20,
            Self::Patrol => 40,
        }
    }

    pub(crate) fn speed(self) -> f32 {
        match self {
            Self::Melee => 55.0,
            Self::Ranged => 40.0,
            Self::Patrol => 35.0,
        }
    }

    pub(crate) fn contact_damage(self) -> i32 {
        match self {
            Self::Melee => 10,
            Self::Ranged => 5,
            Self::Patrol => 12,
        }
    }

    pub(crate) fn half_size(self) -> f32 {
        match self {
            Self::Melee => 6.0,
            Self::Ranged => 5.0,
            Self::Patrol => 7.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) health: i32,
    pub(crate) max_health: i32,
    pub(crate) ammo: u32,
    pub(crate) clip_size: u32,
    pub(crate) reserve_ammo: u32,
    /// Seconds left on the current reload; zero when not reloading.
    pub(crate) reload_remaining: f32,
    pub(crate) fire_cooldown: f32,
    pub(crate) damage: i32,
    pub(crate) invulnerable_remaining: f32,
    pub(crate) aim: Vec2,
    pub(crate) god_mode: bool,
    pub(crate) damage_upgrades: u32,
    pub(crate) clip_upgrades: u32,
    pub(crate) health_upgrades: u32,
}

impl Player {
    pub(crate) fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            ammo: PLAYER_CLIP_SIZE,
            clip_size: PLAYER_CLIP_SIZE,
            reserve_ammo: PLAYER_START_RESERVE,
            reload_remaining: 0.0,
            fire_cooldown: 0.0,
            damage: PLAYER_BULLET_DAMAGE,
            invulnerable_remaining: 0.0,
            aim: Vec2::new(1.0, 0.0),
            god_mode: false,
            damage_upgrades: 0,
            clip_upgrades: 0,
            health_upgrades: 0,
        }
    }

    pub(crate) fn is_reloading(&self) -> bool {
        self.reload_remaining > 0.0
    }

    pub(crate) fn is_dead(&self) -> bool {
        self.health <= 0
    }

    pub(crate) fn heal(&mut self, amount: i32) {
        self.health = self.health.saturating_add(amount).clamp(0, self.max_health);
    }

    /// Rounds a completed reload moves from reserve into the clip.
    pub(crate) fn reload_transfer(&self) -> u32 {
        self.clip_size.saturating_sub(self.ammo).min(self.reserve_ammo)
    }

    pub(crate) fn can_start_reload(&self) -> bool {
        !self.is_reloading() && self.reload_transfer() > 0
    }

    pub(crate) fn finish_reload(&mut self) {
        let moved = self.reload_transfer();
        self.ammo += moved;
        self.reserve_ammo -= moved;
        self.reload_remaining = 0.0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Enemy {
    pub(crate) id: u64,
    pub(crate) kind: EnemyKind,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) health: i32,
    pub(crate) attack_cooldown: f32,
    pub(crate) visible: bool,
    pub(crate) waypoints: [Vec2; 2],
    pub(crate) waypoint_index: usize,
}

impl Enemy {
    pub(crate) fn new(id: u64, kind: EnemyKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            health: kind.max_health(),
            attack_cooldown: 1.0,
            visible: false,
            waypoints: [
                position - Vec2::new(PATROL_REACH, 0.0),
                position + Vec2::new(PATROL_REACH, 0.0),
            ],
            waypoint_index: 1,
        }
    }
}

const PATROL_REACH: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProjectileOwner {
    Player,
    Enemy,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Projectile {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) damage: i32,
    pub(crate) lifetime: f32,
    pub(crate) owner: ProjectileOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PickupKind {
    Health,
    Ammo,
    Gold,
}

impl PickupKind {
    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Ammo => "ammo",
            Self::Gold => "gold",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pickup {
    pub(crate) kind: PickupKind,
    pub(crate) position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DoorSide {
    North,
    South,
    West,
    East,
}

impl DoorSide {
    pub(crate) const ALL: [DoorSide; 4] = [Self::North, Self::South, Self::West, Self::East];

    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::West => "west",
            Self::East => "east",
        }
    }

    pub(crate) fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::West => (-1, 0),
            Self::East => (1, 0),
        }
    }

    pub(crate) fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShopItem {
    Heal,
    Ammo,
    Damage,
    Clip,
    MaxHealth,
    Continue,
}

impl ShopItem {
    pub(crate) const ALL: [ShopItem; 6] = [
        Self::Heal,
        Self::Ammo,
        Self::Damage,
        Self::Clip,
        Self::MaxHealth,
        Self::Continue,
    ];

    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Heal => "heal",
            Self::Ammo => "ammo",
            Self::Damage => "damage",
            Self::Clip => "clip",
            Self::MaxHealth => "max_health",
            Self::Continue => "continue",
        }
    }

    pub(crate) fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|item| item.as_token().eq_ignore_ascii_case(token))
    }

    pub(crate) fn cost(self) -> u32 {
        match self {
            Self::Heal => 10,
            Self::Ammo => 8,
            Self::Damage => 25,
            Self::Clip => 20,
            Self::MaxHealth => 30,
            Self::Continue => 0,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Heal => "HEAL +25",
            Self::Ammo => "AMMO +24",
            Self::Damage => "DAMAGE +5",
            Self::Clip => "CLIP +4",
            Self::MaxHealth => "MAX HP +20",
            Self::Continue => "CONTINUE",
        }
    }
}
