//! Process-local counters for commands and the bundle progress store.
//! Reported by the console transport on shutdown and by the `status` subcommand.
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

static COMMANDS_HANDLED: AtomicU64 = AtomicU64::new(0);
static COMMANDS_REJECTED: AtomicU64 = AtomicU64::new(0);
static STATE_HEALS: AtomicU64 = AtomicU64::new(0);
static CORRUPT_STATE_RECOVERIES: AtomicU64 = AtomicU64::new(0);
static PERSISTENCE_FAILURES: AtomicU64 = AtomicU64::new(0);
static LATENCY_SUM_MS: AtomicU64 = AtomicU64::new(0);
static LATENCY_COUNT: AtomicU64 = AtomicU64::new(0);

static COMMAND_COUNTERS: OnceLock<Mutex<HashMap<String, CommandCounter>>> = OnceLock::new();

pub fn inc_commands_handled() {
    COMMANDS_HANDLED.fetch_add(1, Ordering::Relaxed);
}
/// Usage errors and unknown commands.
pub fn inc_commands_rejected() {
    COMMANDS_REJECTED.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_state_heals() {
    STATE_HEALS.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_corrupt_state_recoveries() {
    CORRUPT_STATE_RECOVERIES.fetch_add(1, Ordering::Relaxed);
}
pub fn inc_persistence_failures() {
    PERSISTENCE_FAILURES.fetch_add(1, Ordering::Relaxed);
}
pub fn observe_command_latency(started: Instant) {
    let ms = started.elapsed().as_millis() as u64;
    LATENCY_SUM_MS.fetch_add(ms, Ordering::Relaxed);
    LATENCY_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommandCounter {
    pub invocations: u64,
    pub failures: u64,
}

fn command_counter_lock() -> &'static Mutex<HashMap<String, CommandCounter>> {
    COMMAND_COUNTERS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Count one invocation of `name`; `failed` marks replies that report an error.
pub fn record_command(name: &str, failed: bool) -> CommandCounter {
    let mut guard = match command_counter_lock().lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    let counter = guard.entry(name.to_string()).or_default();
    counter.invocations = counter.invocations.saturating_add(1);
    if failed {
        counter.failures = counter.failures.saturating_add(1);
    }
    *counter
}

pub fn command_counters_snapshot() -> HashMap<String, CommandCounter> {
    match command_counter_lock().lock() {
        Ok(g) => g.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[derive(Debug, Default, Clone)]
pub struct Snapshot {
    pub commands_handled: u64,
    pub commands_rejected: u64,
    pub state_heals: u64,
    pub corrupt_state_recoveries: u64,
    pub persistence_failures: u64,
    pub latency_avg_ms: Option<u64>,
}

pub fn snapshot() -> Snapshot {
    let sum = LATENCY_SUM_MS.load(Ordering::Relaxed);
    let count = LATENCY_COUNT.load(Ordering::Relaxed);
    Snapshot {
        commands_handled: COMMANDS_HANDLED.load(Ordering::Relaxed),
        commands_rejected: COMMANDS_REJECTED.load(Ordering::Relaxed),
        state_heals: STATE_HEALS.load(Ordering::Relaxed),
        corrupt_state_recoveries: CORRUPT_STATE_RECOVERIES.load(Ordering::Relaxed),
        persistence_failures: PERSISTENCE_FAILURES.load(Ordering::Relaxed),
        latency_avg_ms: if count > 0 { Some(sum / count) } else { None },
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "commands={} rejected={} heals={} corrupt_recoveries={} persistence_failures={} avg_latency_ms={}",
            self.commands_handled,
            self.commands_rejected,
            self.state_heals,
            self.corrupt_state_recoveries,
            self.persistence_failures,
            self.latency_avg_ms
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".into())
        )
    }
}
