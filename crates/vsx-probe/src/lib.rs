//! Runtime probe for POWER7 VSX unaligned vector load/store support.
//!
//! Operating-system capability bits and compile-time target features both
//! lie on occasion: hypervisors mask hardware features, emulators advertise
//! instructions they implement incorrectly, and distro toolchains bake in
//! assumptions about the oldest machine they support. The only authoritative
//! answer is to execute the instruction and see what happens. This crate
//! does exactly that, inside a crash-proof envelope:
//!
//! 1. install a temporary `SIGILL` handler (remembering the prior one),
//! 2. capture the thread signal mask,
//! 3. run an intentionally misaligned VSX load/store over two small stack
//!    buffers and compare the copied bytes,
//! 4. restore mask and handler on every exit path, fault or no fault.
//!
//! Every failure mode - handler installation failure, illegal-instruction
//! trap, instruction executed but copied the wrong bytes - collapses into
//! "not available". The probe never raises an error to its caller; a
//! capability probe that can crash the process defeats its purpose.
//!
//! # Entry points
//!
//! Dispatch layers should use [`caps::vsx_available`], which runs the probe
//! at most once per process and caches the answer. The raw
//! [`power::probe`] is exposed for callers that need a fresh run, but the
//! SIGILL disposition is process-wide state: raw calls must be serialized
//! through [`caps::probe_gate`], never issued freely from parallel threads.
//!
//! # Build-time policy
//!
//! The `no-runtime-probe` cargo feature forces a fixed "unavailable" answer
//! and compiles out the trap machinery, for static builds that must never
//! touch signal state. On POWER targets built with `-C
//! target-feature=+vsx`, the extension is unconditionally present and the
//! probe short-circuits to `true` without touching signal state either.

#![cfg_attr(
    all(
        any(target_arch = "powerpc", target_arch = "powerpc64"),
        not(target_feature = "vsx"),
        not(feature = "no-runtime-probe")
    ),
    feature(asm_experimental_arch)
)]

pub mod caps;
pub mod error;
pub mod hwcap;
pub mod logging;
pub mod outcome;
pub mod power;
pub mod report;
#[cfg(all(unix, not(feature = "no-runtime-probe")))]
pub mod trap;

pub use caps::{probe_gate, vsx_available};
pub use error::ProbeError;
pub use outcome::ProbeOutcome;
pub use power::probe;
pub use report::CapabilityReport;
