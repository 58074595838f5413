use harness_proto::{
    CameraSnapshot, DoorSnapshot, EnemySnapshot, GamePhase, HarnessSnapshot, PickupSnapshot,
    PlayerSnapshot, RoomSnapshot, ShopItemSnapshot, ShopSnapshot,
};

use super::state::BreachState;
use super::types::ShopItem;
use super::FLOOR_COUNT;

pub(crate) fn build_snapshot(state: &BreachState) -> HarnessSnapshot {
    let mut snapshot = HarnessSnapshot::empty(state.phase);
    snapshot.floor_count = FLOOR_COUNT;
    if state.phase == GamePhase::Title {
        return snapshot;
    }

    snapshot.floor = state.floor_index + 1;
    snapshot.timer_seconds = state.timer_seconds;
    snapshot.score = state.score;
    snapshot.gold = state.gold;
    snapshot.kills = state.kills;

    let player = &state.player;
    snapshot.player = Some(PlayerSnapshot {
        x: player.position.x,
        y: player.position.y,
        health: player.health,
        max_health: player.max_health,
        ammo: player.ammo,
        clip_size: player.clip_size,
        reserve_ammo: player.reserve_ammo,
        reloading: player.is_reloading(),
        god_mode: player.god_mode,
    });
    snapshot.enemies = state
        .enemies
        .iter()
        .map(|enemy| EnemySnapshot {
            id: enemy.id,
            kind: enemy.kind.as_token().to_string(),
            x: enemy.position.x,
            y: enemy.position.y,
            health: enemy.health,
            visible: enemy.visible,
        })
        .collect();
    snapshot.projectiles = state.projectiles.len();
    snapshot.pickups = state
        .pickups
        .iter()
        .map(|pickup| PickupSnapshot {
            kind: pickup.kind.as_token().to_string(),
            x: pickup.position.x,
            y: pickup.position.y,
        })
        .collect();

    let camera = state.camera();
    snapshot.camera = CameraSnapshot {
        x: camera.position.x,
        y: camera.position.y,
    };
    if let Some(room) = state.current_room() {
        let open = !state.doors_locked();
        snapshot.doors = room
            .doors()
            .map(|side| DoorSnapshot {
                side: side.as_token().to_string(),
                open,
            })
            .collect();
        snapshot.room = Some(RoomSnapshot {
            x: room.grid_x,
            y: room.grid_y,
            cleared: room.cleared,
        });
    }

    if state.phase == GamePhase::Shop {
        snapshot.shop = Some(ShopSnapshot {
            selected: state.shop_selected,
            items: ShopItem::ALL
                .into_iter()
                .map(|item| ShopItemSnapshot {
                    item: item.as_token().to_string(),
                    cost: item.cost(),
                    affordable: state.is_affordable(item),
                })
                .collect(),
        });
    }
    snapshot
}
