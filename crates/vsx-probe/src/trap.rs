//! SIGILL trap envelope for executing maybe-illegal instructions.
//!
//! This is the crash-proof core of the probe: it arms a temporary SIGILL
//! handler, establishes an escape point with `sigsetjmp`, runs a candidate
//! operation, and guarantees the prior handler and signal mask are back in
//! place before control returns to the caller - whether the operation
//! completed, trapped, or setup failed halfway through.
//!
//! # Serialization contract
//!
//! Signal disposition is process-wide and the escape buffer is a single
//! static, so only one protected run may be in flight at a time. Callers
//! that invoke [`run_sigill_protected`] directly must hold
//! [`crate::caps::probe_gate`] for the duration of the call. The cached
//! entry point in [`crate::caps`] does this internally.
//!
//! # Why `sigsetjmp` and not catch-unwind
//!
//! A SIGILL handler cannot unwind a Rust stack; the only portable way back
//! out of the handler is a saved-context jump. The hazards of that jump are
//! confined here: the escape point and the candidate operation share one
//! stack frame, the second arrival returns immediately without reading any
//! local written after the first arrival, and restoration lives in a `Drop`
//! guard so the jump cannot skip it.

use std::mem;
use std::ptr;
use std::sync::atomic::{compiler_fence, Ordering};

use tracing::{trace, warn};

use crate::error::ProbeError;
use crate::outcome::ProbeOutcome;

/// A candidate operation to run under trap protection.
///
/// The function must be trivial: no heap allocation, no values with drop
/// glue, nothing that matters if its frame is abandoned by the escape jump.
/// It returns whether the instruction under test produced the expected
/// data.
pub type ProbeOp = unsafe fn() -> bool;

/// Oversized stand-in for the platform `sigjmp_buf`.
///
/// glibc's is 200 bytes on x86-64 and larger on POWER; 1600 aligned bytes
/// covers every libc this crate targets.
#[repr(C, align(16))]
struct SigJmpBuf([u64; 200]);

static mut ESCAPE: SigJmpBuf = SigJmpBuf([0; 200]);

extern "C" {
    // `sigsetjmp` is a macro over `__sigsetjmp` on glibc; musl and the BSDs
    // export it under its own name.
    #[cfg_attr(
        all(target_os = "linux", target_env = "gnu"),
        link_name = "__sigsetjmp"
    )]
    fn sigsetjmp(env: *mut SigJmpBuf, savemask: libc::c_int) -> libc::c_int;
    fn siglongjmp(env: *mut SigJmpBuf, val: libc::c_int) -> !;
}

/// The temporary SIGILL handler: abandon the protected region and resume
/// at the escape point with a nonzero arrival code.
extern "C" fn sigill_escape(_sig: libc::c_int) {
    // savemask=1 at the setjmp site makes this jump also restore the mask
    // the kernel altered to block SIGILL while the handler runs.
    unsafe { siglongjmp(ptr::addr_of_mut!(ESCAPE), 1) }
}

/// RAII owner of the process SIGILL disposition and thread signal mask.
///
/// `install` captures both and swaps the handler; `Drop` restores both.
/// Between the two, exactly one protected run may execute.
#[derive(Debug)]
struct SigillGuard {
    prev_action: libc::sigaction,
    prev_mask: libc::sigset_t,
}

impl SigillGuard {
    fn install() -> Result<Self, ProbeError> {
        unsafe {
            let handler: extern "C" fn(libc::c_int) = sigill_escape;
            let mut action: libc::sigaction = mem::zeroed();
            action.sa_sigaction = handler as usize;
            libc::sigemptyset(&mut action.sa_mask);
            action.sa_flags = 0;

            let mut prev_action: libc::sigaction = mem::zeroed();
            if libc::sigaction(libc::SIGILL, &action, &mut prev_action) != 0 {
                return Err(ProbeError::HandlerInstall {
                    errno: errno_or_zero(),
                });
            }

            let mut prev_mask: libc::sigset_t = mem::zeroed();
            // pthread_sigmask reports its error number in the return value
            // and does not touch errno.
            #[allow(unused_mut)]
            let mut mask_rc =
                libc::pthread_sigmask(libc::SIG_SETMASK, ptr::null(), &mut prev_mask);
            #[cfg(test)]
            {
                if fault_injection::FAIL_MASK_CAPTURE.load(Ordering::SeqCst) {
                    mask_rc = libc::EINVAL;
                }
            }
            if mask_rc != 0 {
                // Roll back the handler before reporting; a failed setup
                // must not leave partial state installed.
                libc::sigaction(libc::SIGILL, &prev_action, ptr::null_mut());
                return Err(ProbeError::MaskCapture { errno: mask_rc });
            }

            Ok(Self {
                prev_action,
                prev_mask,
            })
        }
    }
}

impl Drop for SigillGuard {
    fn drop(&mut self) {
        // Mask first, then handler; both must be back before the caller
        // regains control on any path.
        unsafe {
            libc::pthread_sigmask(libc::SIG_SETMASK, &self.prev_mask, ptr::null_mut());
            libc::sigaction(libc::SIGILL, &self.prev_action, ptr::null_mut());
        }
    }
}

fn errno_or_zero() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}


/// Run `op` with SIGILL routed to the escape point.
///
/// Returns [`ProbeOutcome::Supported`] if `op` completed and reported
/// correct data, [`ProbeOutcome::Mismatch`] if it completed with wrong
/// data, [`ProbeOutcome::Faulted`] if it raised SIGILL, and
/// [`ProbeOutcome::SetupFailed`] if the envelope could not be armed (in
/// which case `op` is never attempted).
///
/// The caller must hold [`crate::caps::probe_gate`]; see the module docs.
pub fn run_sigill_protected(op: ProbeOp) -> ProbeOutcome {
    let _guard = match SigillGuard::install() {
        Ok(guard) => guard,
        Err(err) => {
            warn!(error = %err, "could not arm SIGILL trap envelope");
            return ProbeOutcome::SetupFailed;
        }
    };

    // Armed. From here to return, a SIGILL lands in `sigill_escape`.
    let outcome = unsafe {
        if sigsetjmp(ptr::addr_of_mut!(ESCAPE), 1) != 0 {
            // Second arrival: the candidate instruction trapped. Return
            // straight away; no local written after the first arrival is
            // read on this path.
            trace!("candidate instruction faulted");
            ProbeOutcome::Faulted
        } else {
            // Fences pin the risky operation between the escape point and
            // the comparison so the optimizer cannot hoist or elide it.
            compiler_fence(Ordering::SeqCst);
            let ok = std::hint::black_box(op());
            compiler_fence(Ordering::SeqCst);
            if ok {
                ProbeOutcome::Supported
            } else {
                trace!("candidate instruction executed but data mismatched");
                ProbeOutcome::Mismatch
            }
        }
    };
    trace!(%outcome, "protected run resolved");
    outcome
    // _guard drops here: mask and handler restored on every path.
}
