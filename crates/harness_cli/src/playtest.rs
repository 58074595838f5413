//! Randomized play sessions that report coarse kill/death/score statistics.

use std::io::Write;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use harness_proto::{GamePhase, HarnessSnapshot};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::{write_report, Session};

const MOVE_TOKENS: [&str; 4] = ["up", "down", "left", "right"];
const FIRE_CHANCE: f64 = 0.7;
const RELOAD_CHANCE: f64 = 0.05;
const ACTION_MIN_MS: u64 = 150;
const ACTION_MAX_MS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaytestOptions {
    pub iterations: u32,
    pub seconds: u64,
    pub seed: Option<u64>,
}

impl Default for PlaytestOptions {
    fn default() -> Self {
        Self {
            iterations: 3,
            seconds: 10,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterationOutcome {
    pub iteration: u32,
    pub phase: GamePhase,
    pub floor: u32,
    pub kills: u32,
    pub score: u32,
    pub died: bool,
}

impl IterationOutcome {
    pub fn from_snapshot(iteration: u32, snapshot: &HarnessSnapshot) -> Self {
        let died = snapshot.phase == GamePhase::GameOver
            && snapshot.player.as_ref().map_or(true, |player| player.health <= 0);
        Self {
            iteration,
            phase: snapshot.phase,
            floor: snapshot.floor,
            kills: snapshot.kills,
            score: snapshot.score,
            died,
        }
    }

    pub fn report_line(&self) -> String {
        format!(
            "iteration {} phase:{} floor:{} kills:{} died:{} score:{}",
            self.iteration,
            self.phase.as_token(),
            self.floor,
            self.kills,
            if self.died { "yes" } else { "no" },
            self.score
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaytestSummary {
    pub iterations: u32,
    pub kills: u32,
    pub deaths: u32,
    pub total_score: u64,
    pub best_score: u32,
}

impl PlaytestSummary {
    pub fn record(&mut self, outcome: &IterationOutcome) {
        self.iterations += 1;
        self.kills += outcome.kills;
        if outcome.died {
            self.deaths += 1;
        }
        self.total_score += u64::from(outcome.score);
        self.best_score = self.best_score.max(outcome.score);
    }

    pub fn average_score(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total_score as f64 / f64::from(self.iterations)
    }

    pub fn report_line(&self) -> String {
        format!(
            "playtest iterations:{} kills:{} deaths:{} avg_score:{:.1} best_score:{}",
            self.iterations,
            self.kills,
            self.deaths,
            self.average_score(),
            self.best_score
        )
    }
}

/// One or two movement keys, usually with `fire`, occasionally `reload`.
pub fn random_action<R: Rng>(rng: &mut R) -> String {
    let count = rng.gen_range(1..=2);
    let mut tokens: Vec<&str> = MOVE_TOKENS.choose_multiple(rng, count).copied().collect();
    if rng.gen_bool(FIRE_CHANCE) {
        tokens.push("fire");
    }
    if rng.gen_bool(RELOAD_CHANCE) {
        tokens.push("reload");
    }
    tokens.join("+")
}

pub(crate) fn run_playtest<W: Write>(
    session: &mut Session,
    options: &PlaytestOptions,
    timeout: Duration,
    out: &mut W,
) -> Result<(), String> {
    let seed = options.seed.unwrap_or_else(clock_seed);
    let mut rng = StdRng::seed_from_u64(seed);
    write_report(
        out,
        &format!(
            "playtest seed:{seed} iterations:{} seconds:{}",
            options.iterations, options.seconds
        ),
    )?;

    let mut summary = PlaytestSummary::default();
    for iteration in 1..=options.iterations {
        let outcome = play_iteration(session, iteration, options.seconds, timeout, &mut rng)?;
        write_report(out, &outcome.report_line())?;
        summary.record(&outcome);
    }
    write_report(out, &summary.report_line())
}

fn play_iteration(
    session: &mut Session,
    iteration: u32,
    seconds: u64,
    timeout: Duration,
    rng: &mut StdRng,
) -> Result<IterationOutcome, String> {
    session.request("reset", timeout, |payload| payload.starts_with("ok: reset"))?;
    session.request("force_start", timeout, |payload| {
        payload.starts_with("ok: force_start")
    })?;

    let deadline = Instant::now() + Duration::from_secs(seconds);
    let mut snapshot = session.snapshot(timeout)?;
    while Instant::now() < deadline && !snapshot.phase.is_terminal() {
        if snapshot.phase == GamePhase::Shop {
            let item = shop_choice(&snapshot);
            session.request(&format!("shop_buy {item}"), timeout, |payload| {
                payload.starts_with("ok: shop_buy")
            })?;
        } else {
            let action = random_action(rng);
            let duration_ms = rng.gen_range(ACTION_MIN_MS..=ACTION_MAX_MS);
            session.execute(&action, duration_ms, timeout)?;
        }
        snapshot = session.snapshot(timeout)?;
    }
    Ok(IterationOutcome::from_snapshot(iteration, &snapshot))
}

/// First affordable upgrade, or `continue` once nothing else fits the purse.
fn shop_choice(snapshot: &HarnessSnapshot) -> String {
    snapshot
        .shop
        .as_ref()
        .and_then(|shop| {
            shop.items
                .iter()
                .find(|entry| entry.affordable && entry.item != "continue")
        })
        .map_or_else(|| "continue".to_string(), |entry| entry.item.clone())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use harness_proto::{HarnessAction, HeldKey, ShopItemSnapshot, ShopSnapshot};

    use super::*;

    #[test]
    fn random_actions_always_parse_and_move() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let text = random_action(&mut rng);
            let action = HarnessAction::parse(&text).expect("valid action");
            let moves = [HeldKey::Up, HeldKey::Down, HeldKey::Left, HeldKey::Right]
                .into_iter()
                .filter(|key| action.holds(*key))
                .count();
            assert!((1..=2).contains(&moves), "{text}");
            assert!(action.click.is_none());
        }
    }

    #[test]
    fn same_seed_gives_same_action_sequence() {
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        let a: Vec<String> = (0..20).map(|_| random_action(&mut first)).collect();
        let b: Vec<String> = (0..20).map(|_| random_action(&mut second)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn gameover_with_zero_health_counts_as_death() {
        let mut snapshot = HarnessSnapshot::empty(GamePhase::GameOver);
        snapshot.kills = 4;
        snapshot.score = 650;
        snapshot.floor = 1;
        let outcome = IterationOutcome::from_snapshot(2, &snapshot);
        assert!(outcome.died);
        assert_eq!(
            outcome.report_line(),
            "iteration 2 phase:gameover floor:1 kills:4 died:yes score:650"
        );

        let combat = HarnessSnapshot::empty(GamePhase::Combat);
        let survived = IterationOutcome::from_snapshot(3, &combat);
        assert!(!survived.died);
    }

    #[test]
    fn summary_aggregates_kills_deaths_and_scores() {
        let mut summary = PlaytestSummary::default();
        for (kills, died, score) in [(3, true, 400), (5, false, 900)] {
            summary.record(&IterationOutcome {
                iteration: summary.iterations + 1,
                phase: GamePhase::Playing,
                floor: 1,
                kills,
                score,
                died,
            });
        }
        assert_eq!(summary.kills, 8);
        assert_eq!(summary.deaths, 1);
        assert_eq!(summary.best_score, 900);
        assert_eq!(
            summary.report_line(),
            "playtest iterations:2 kills:8 deaths:1 avg_score:650.0 best_score:900"
        );
        assert_eq!(PlaytestSummary::default().average_score(), 0.0);
    }

    #[test]
    fn shop_choice_prefers_affordable_upgrades() {
        let mut snapshot = HarnessSnapshot::empty(GamePhase::Shop);
        let item = |name: &str, affordable| ShopItemSnapshot {
            item: name.to_string(),
            cost: 10,
            affordable,
        };
        snapshot.shop = Some(ShopSnapshot {
            selected: 0,
            items: vec![item("heal", false), item("ammo", true), item("continue", true)],
        });
        assert_eq!(shop_choice(&snapshot), "ammo");

        if let Some(shop) = snapshot.shop.as_mut() {
            shop.items[1].affordable = false;
        }
        assert_eq!(shop_choice(&snapshot), "continue");
    }
}
