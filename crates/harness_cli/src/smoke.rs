//! End-to-end smoke checks against a live game: state, movement, firing, death.

use std::io::Write;
use std::time::Duration;

use harness_proto::{parse_phase_payload, GamePhase, HarnessSnapshot, PlayerSnapshot, PHASE_PREFIX};

use crate::{write_report, Session};

const MOVE_STEP_MS: u64 = 250;
const FIRE_HOLD_MS: u64 = 100;
const MIN_MOVE_DISTANCE: f32 = 0.5;

type SmokeCheck = fn(&mut Session, Duration) -> Result<String, String>;

const CHECKS: [(&str, SmokeCheck); 4] = [
    ("state_available", check_state_available),
    ("movement", check_movement),
    ("fire_or_reload", check_fire),
    ("health_zero_gameover", check_health_zero),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass { name: String, detail: String },
    Fail { name: String, reason: String },
}

impl CheckOutcome {
    fn new(name: &str, result: Result<String, String>) -> Self {
        match result {
            Ok(detail) => Self::Pass {
                name: name.to_string(),
                detail,
            },
            Err(reason) => Self::Fail {
                name: name.to_string(),
                reason,
            },
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Self::Pass { .. })
    }

    pub fn report_line(&self) -> String {
        match self {
            Self::Pass { name, detail } => format!("PASS {name} {detail}"),
            Self::Fail { name, reason } => format!("FAIL {name}: {reason}"),
        }
    }
}

pub(crate) fn run_smoke<W: Write>(
    session: &mut Session,
    timeout: Duration,
    out: &mut W,
) -> Result<(), String> {
    let mut failed = 0usize;
    for (name, check) in CHECKS {
        let outcome = CheckOutcome::new(name, check(session, timeout));
        if !outcome.passed() {
            failed += 1;
        }
        write_report(out, &outcome.report_line())?;
    }
    let total = CHECKS.len();
    write_report(out, &format!("smoke: {}/{total} checks passed", total - failed))?;
    if failed > 0 {
        return Err(format!("smoke failed: {failed} of {total} checks"));
    }
    Ok(())
}

pub fn position_changed(before: &PlayerSnapshot, after: &PlayerSnapshot) -> bool {
    let dx = after.x - before.x;
    let dy = after.y - before.y;
    (dx * dx + dy * dy).sqrt() >= MIN_MOVE_DISTANCE
}

/// A single `fire` hold passes when the clip lost exactly one round or a
/// reload started (empty clip with reserve ammo).
pub fn fire_outcome(before: &PlayerSnapshot, after: &PlayerSnapshot) -> Result<String, String> {
    if after.ammo + 1 == before.ammo {
        return Ok(format!("ammo:{}->{}", before.ammo, after.ammo));
    }
    if after.reloading {
        return Ok(format!("reloading ammo:{}", after.ammo));
    }
    Err(format!(
        "ammo {}->{} and no reload started",
        before.ammo, after.ammo
    ))
}

fn player_of(snapshot: &HarnessSnapshot) -> Result<&PlayerSnapshot, String> {
    snapshot
        .player
        .as_ref()
        .ok_or_else(|| format!("no player in state (phase:{})", snapshot.phase.as_token()))
}

fn check_state_available(session: &mut Session, timeout: Duration) -> Result<String, String> {
    session.request("force_start", timeout, |payload| {
        payload.starts_with("ok: force_start")
    })?;
    let snapshot = session.snapshot(timeout)?;
    player_of(&snapshot)?;
    if !snapshot.phase.is_in_run() {
        return Err(format!(
            "expected an active run, got phase:{}",
            snapshot.phase.as_token()
        ));
    }
    Ok(format!("phase:{}", snapshot.phase.as_token()))
}

fn check_movement(session: &mut Session, timeout: Duration) -> Result<String, String> {
    let mut before = player_of(&session.snapshot(timeout)?)?.clone();
    for action in ["right", "left", "down", "up"] {
        session.execute(action, MOVE_STEP_MS, timeout)?;
        let after = player_of(&session.snapshot(timeout)?)?.clone();
        if position_changed(&before, &after) {
            return Ok(format!(
                "{action} moved {:.1},{:.1}",
                after.x - before.x,
                after.y - before.y
            ));
        }
        before = after;
    }
    Err(format!("position stuck at {:.1},{:.1}", before.x, before.y))
}

fn check_fire(session: &mut Session, timeout: Duration) -> Result<String, String> {
    let mut before = player_of(&session.snapshot(timeout)?)?.clone();
    if before.ammo == 0 && before.reserve_ammo == 0 {
        session.request("grant ammo 12", timeout, |payload| payload.starts_with("ok: grant"))?;
        before = player_of(&session.snapshot(timeout)?)?.clone();
    }
    session.execute("fire", FIRE_HOLD_MS, timeout)?;
    let after = player_of(&session.snapshot(timeout)?)?.clone();
    fire_outcome(&before, &after)
}

fn check_health_zero(session: &mut Session, timeout: Duration) -> Result<String, String> {
    session.request("set_health 0", timeout, |payload| {
        payload.starts_with("ok: set_health")
    })?;
    let reply = session.request("get_phase", timeout, |payload| payload.starts_with(PHASE_PREFIX))?;
    match parse_phase_payload(&reply) {
        Some(GamePhase::GameOver) => Ok("phase:gameover".to_string()),
        Some(other) => Err(format!("expected gameover, got phase:{}", other.as_token())),
        None => Err(format!("unreadable phase reply '{reply}'")),
    }
}
