//! The POWER7 VSX candidate operation and the probe policy ladder.
//!
//! POWER7 (ISA 2.06) introduced VSX, and with it vector loads and stores
//! that tolerate unaligned effective addresses (`lxvd2x`/`stxvd2x`).
//! Earlier cores raise SIGILL on these encodings, which is exactly the
//! signal the trap envelope converts into a clean negative answer.
//!
//! The candidate operation writes a known pattern into a 19-byte source
//! buffer, performs a misaligned 16-byte vector load from offset 3
//! immediately followed by a misaligned store to offset 1 of a 17-byte
//! destination, then compares the copied range byte for byte. Both
//! accesses are unaligned for the addressing mode under test yet stay
//! inside the buffers, so the only fault this can raise is the
//! illegal-instruction trap being probed for - never a stray segmentation
//! fault that would be misread as "unsupported".

use tracing::debug;

use crate::outcome::ProbeOutcome;

/// Probe whether this core supports VSX unaligned vector load/store.
///
/// Every failure mode collapses to `false`; this call never panics and
/// never propagates an error. On non-POWER targets, targets built with
/// VSX as a baseline feature, and `no-runtime-probe` builds the answer is
/// fixed and no signal state is touched at all.
///
/// Raw calls must be serialized through [`crate::caps::probe_gate`];
/// prefer the cached [`crate::caps::vsx_available`] for dispatch.
pub fn probe() -> bool {
    probe_outcome().available()
}

/// Like [`probe`], but reports how the run resolved instead of collapsing
/// to a boolean. Same serialization contract.
pub fn probe_outcome() -> ProbeOutcome {
    #[cfg(feature = "no-runtime-probe")]
    {
        debug!("runtime probing disabled at build time");
        ProbeOutcome::Disabled
    }
    #[cfg(all(
        not(feature = "no-runtime-probe"),
        any(target_arch = "powerpc", target_arch = "powerpc64"),
        target_feature = "vsx"
    ))]
    {
        debug!("VSX is a compile-time baseline feature");
        ProbeOutcome::Supported
    }
    #[cfg(all(
        not(feature = "no-runtime-probe"),
        any(target_arch = "powerpc", target_arch = "powerpc64"),
        not(target_feature = "vsx"),
        unix
    ))]
    {
        let outcome = crate::trap::run_sigill_protected(vsx_unaligned_copy);
        debug!(%outcome, "VSX trap probe resolved");
        outcome
    }
    #[cfg(any(
        all(
            not(feature = "no-runtime-probe"),
            not(any(target_arch = "powerpc", target_arch = "powerpc64"))
        ),
        all(
            not(feature = "no-runtime-probe"),
            any(target_arch = "powerpc", target_arch = "powerpc64"),
            not(target_feature = "vsx"),
            not(unix)
        )
    ))]
    {
        debug!("no probeable VSX on this target");
        ProbeOutcome::UnsupportedArch
    }
}

/// The risky instruction sequence: misaligned `lxvd2x` + `stxvd2x`.
///
/// Runs only inside the trap envelope. Loading and storing through the
/// same VSX register is an exact 16-byte copy on both endiannesses.
#[cfg(all(
    not(feature = "no-runtime-probe"),
    any(target_arch = "powerpc", target_arch = "powerpc64"),
    not(target_feature = "vsx"),
    unix
))]
unsafe fn vsx_unaligned_copy() -> bool {
    let src: [u8; 19] = [
        255, 255, 255, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    ];
    let mut dst = [0u8; 17];

    core::arch::asm!(
        "lxvd2x 0, 0, {src}",
        "stxvd2x 0, 0, {dst}",
        src = in(reg) src.as_ptr().add(3),
        dst = in(reg) dst.as_mut_ptr().add(1),
        out("f0") _,
        options(nostack),
    );

    // Execution without a fault is not enough: the copied bytes must match
    // exactly, or the unit is treated as absent.
    src[3..19] == dst[1..17]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::probe_gate;

    #[test]
    fn probe_agrees_with_outcome() {
        let _gate = probe_gate().lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(probe(), probe_outcome().available());
    }

    #[test]
    fn probe_is_idempotent_when_serialized() {
        let _gate = probe_gate().lock().unwrap_or_else(|e| e.into_inner());
        let first = probe_outcome();
        for _ in 0..20 {
            assert_eq!(probe_outcome(), first);
        }
    }

    #[cfg(all(
        unix,
        not(feature = "no-runtime-probe"),
        not(any(target_arch = "powerpc", target_arch = "powerpc64"))
    ))]
    #[test]
    fn foreign_arch_short_circuits_without_touching_signal_state() {
        let _gate = probe_gate().lock().unwrap_or_else(|e| e.into_inner());
        let before = current_sigill_handler();
        assert_eq!(probe_outcome(), ProbeOutcome::UnsupportedArch);
        assert!(!probe());
        assert_eq!(current_sigill_handler(), before);
    }

    #[cfg(all(unix, feature = "no-runtime-probe"))]
    #[test]
    fn disabled_build_reports_unavailable_without_touching_signal_state() {
        let _gate = probe_gate().lock().unwrap_or_else(|e| e.into_inner());
        let before = current_sigill_handler();
        assert_eq!(probe_outcome(), ProbeOutcome::Disabled);
        assert!(!probe());
        assert_eq!(current_sigill_handler(), before);
    }

    #[cfg(unix)]
    fn current_sigill_handler() -> usize {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            assert_eq!(
                libc::sigaction(libc::SIGILL, std::ptr::null(), &mut action),
                0
            );
            action.sa_sigaction
        }
    }
}
