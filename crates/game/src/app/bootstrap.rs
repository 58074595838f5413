use std::time::{SystemTime, UNIX_EPOCH};

use arcade_engine::{HarnessLinePump, LoopConfig, Scene};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::breach::{BreachScene, CANVAS_HEIGHT, CANVAS_WIDTH};
use super::harness_port::{HarnessPort, HarnessPortConfig};

const SEED_ENV_VAR: &str = "ARCADE_SEED";
const WINDOW_TITLE: &str = "Hive Breach";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) pump: Box<dyn HarnessLinePump>,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "hive_breach_startup");

    let seed = resolve_seed(std::env::var(SEED_ENV_VAR).ok().as_deref());
    let harness = HarnessPortConfig::from_env();
    info!(
        seed,
        harness_enabled = harness.enabled,
        harness_port = harness.port,
        "startup_config"
    );

    let config = LoopConfig {
        window_title: WINDOW_TITLE.to_string(),
        canvas_width: CANVAS_WIDTH,
        canvas_height: CANVAS_HEIGHT,
        ..LoopConfig::default()
    };

    AppWiring {
        config,
        scene: Box::new(BreachScene::new(seed)),
        pump: Box::new(HarnessPort::initialize(harness)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// Fixed seed from the environment, else one derived from the clock.
fn resolve_seed(raw: Option<&str>) -> u64 {
    if let Some(value) = raw {
        match value.trim().parse::<u64>() {
            Ok(seed) => return seed,
            Err(_) => warn!(value, "invalid_seed_using_clock"),
        }
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
