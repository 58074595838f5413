//! Wire format and state schema shared by the in-game harness and its clients.

mod action;
mod schema;
mod wire;

pub use action::{ActionParseError, HarnessAction, HeldKey};
pub use schema::{
    CameraSnapshot, DoorSnapshot, EnemySnapshot, GamePhase, HarnessSnapshot, PickupSnapshot,
    PlayerSnapshot, RoomSnapshot, ShopItemSnapshot, ShopSnapshot, SNAPSHOT_SCHEMA_VERSION,
};
pub use wire::{
    encode_tagged_line, frame_line, is_ready_payload, is_sync_ok_payload, parse_frame_line,
    parse_phase_payload, parse_state_payload, parse_wire_line, phase_payload, ready_line_text,
    state_payload, LineChannel, ParsedLine, StatePayloadError, CONTROL_PREFIX, DEFAULT_PORT,
    PHASE_PREFIX, STATE_PREFIX, SYNC_OK_PAYLOAD, TELEMETRY_PREFIX,
};
