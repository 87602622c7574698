//! Call-once gate and cached probe result.
//!
//! The SIGILL disposition and signal mask are process-wide, so only one
//! probe may own them at a time. Rather than hiding a lock inside the
//! probe, the gate is part of the caller contract: [`probe_gate`] is the
//! mutex that raw [`crate::power::probe`] callers must hold, and
//! [`vsx_available`] is the recommended entry point that takes the gate
//! once, probes once, and answers from cache forever after.

use std::sync::{Mutex, OnceLock};

use tracing::debug;

use crate::outcome::ProbeOutcome;
use crate::power;

static PROBE_GATE: Mutex<()> = Mutex::new(());
static OUTCOME: OnceLock<ProbeOutcome> = OnceLock::new();

/// The serialization gate for raw probe runs.
///
/// Hold this lock for the full duration of any direct call into
/// [`crate::power::probe`], [`crate::power::probe_outcome`], or the trap
/// envelope.
///
/// [`vsx_available`] and [`cached_outcome`] take this gate internally on
/// their first (probing) call, and the lock is not reentrant: calling
/// either while holding the gate deadlocks. Release the gate first.
pub fn probe_gate() -> &'static Mutex<()> {
    &PROBE_GATE
}

/// The probe outcome, computed once per process.
pub fn cached_outcome() -> ProbeOutcome {
    *OUTCOME.get_or_init(|| {
        let _gate = PROBE_GATE.lock().unwrap_or_else(|e| e.into_inner());
        let outcome = power::probe_outcome();
        debug!(%outcome, "probe outcome cached for process lifetime");
        outcome
    })
}

/// Whether VSX unaligned vector load/store is usable on this core.
///
/// Runs the trap-protected probe on first call and caches the boolean;
/// subsequent calls are a cache read. Safe to call from any thread.
pub fn vsx_available() -> bool {
    cached_outcome().available()
}
