use thiserror::Error;

use crate::{GamePhase, HarnessSnapshot};

pub const DEFAULT_PORT: u16 = 46001;
pub const CONTROL_PREFIX: &str = "C ";
pub const TELEMETRY_PREFIX: &str = "T ";
pub const STATE_PREFIX: &str = "state ";
pub const PHASE_PREFIX: &str = "phase ";
pub const SYNC_OK_PAYLOAD: &str = "ok: sync";
const FRAME_PREFIX: &str = "harness.frame v1 tick:";
const READY_PREFIX: &str = "harness.ready v1 port:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChannel {
    Control,
    Telemetry,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub channel: LineChannel,
    pub payload: String,
}

#[derive(Debug, Error)]
pub enum StatePayloadError {
    #[error("payload is not a state reply: {0}")]
    NotState(String),
    #[error("state json is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_wire_line(raw: &str) -> ParsedLine {
    let trimmed = raw.trim_end_matches(['\r', '\n']);
    if let Some(payload) = trimmed.strip_prefix(CONTROL_PREFIX) {
        return ParsedLine {
            channel: LineChannel::Control,
            payload: payload.to_string(),
        };
    }
    if let Some(payload) = trimmed.strip_prefix(TELEMETRY_PREFIX) {
        return ParsedLine {
            channel: LineChannel::Telemetry,
            payload: payload.to_string(),
        };
    }
    ParsedLine {
        channel: LineChannel::Unknown,
        payload: trimmed.to_string(),
    }
}

/// Encodes one outbound line with its channel tag and a trailing newline.
pub fn encode_tagged_line(channel: LineChannel, line: &str) -> Vec<u8> {
    let prefix = match channel {
        LineChannel::Control => CONTROL_PREFIX,
        LineChannel::Telemetry => TELEMETRY_PREFIX,
        LineChannel::Unknown => "",
    };
    let mut payload = Vec::with_capacity(prefix.len() + line.len() + 1);
    payload.extend_from_slice(prefix.as_bytes());
    payload.extend_from_slice(line.as_bytes());
    payload.push(b'\n');
    payload
}

pub fn ready_line_text(port: u16) -> String {
    format!("{READY_PREFIX}{port}")
}

pub fn is_ready_payload(payload: &str) -> bool {
    payload.starts_with(READY_PREFIX)
}

pub fn is_sync_ok_payload(payload: &str) -> bool {
    payload == SYNC_OK_PAYLOAD
}

pub fn state_payload(snapshot: &HarnessSnapshot) -> Result<String, serde_json::Error> {
    Ok(format!("{STATE_PREFIX}{}", serde_json::to_string(snapshot)?))
}

pub fn parse_state_payload(payload: &str) -> Result<HarnessSnapshot, StatePayloadError> {
    let json = payload
        .strip_prefix(STATE_PREFIX)
        .ok_or_else(|| StatePayloadError::NotState(payload.to_string()))?;
    Ok(serde_json::from_str(json)?)
}

pub fn phase_payload(phase: GamePhase) -> String {
    format!("{PHASE_PREFIX}{}", phase.as_token())
}

pub fn parse_phase_payload(payload: &str) -> Option<GamePhase> {
    payload
        .strip_prefix(PHASE_PREFIX)
        .and_then(|token| GamePhase::from_token(token.trim()))
}

pub fn frame_line(tick: u64, phase: GamePhase) -> String {
    format!("{FRAME_PREFIX}{tick} phase:{}", phase.as_token())
}

/// Parses `harness.frame v1 tick:<n> phase:<token>` back into its fields.
pub fn parse_frame_line(payload: &str) -> Option<(u64, GamePhase)> {
    let rest = payload.strip_prefix(FRAME_PREFIX)?;
    let (tick, phase) = rest.split_once(" phase:")?;
    Some((tick.parse().ok()?, GamePhase::from_token(phase.trim())?))
}
