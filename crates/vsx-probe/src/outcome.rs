//! Probe outcome classification.

use serde::{Deserialize, Serialize};

/// How a single probe run resolved.
///
/// The public capability contract is boolean - only [`Supported`] means the
/// extension is usable - but the distinct negative outcomes are kept apart
/// for reporting, so "present but copies garbage" is distinguishable from
/// "trapped" when someone has to debug a machine.
///
/// [`Supported`]: ProbeOutcome::Supported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The candidate instruction executed and copied the expected bytes
    /// (or support is guaranteed by the compile target).
    Supported,
    /// The instruction executed without faulting but produced wrong data.
    /// Treated as unavailable: a subtly broken or mis-emulated unit is
    /// worse than no unit at all.
    Mismatch,
    /// The instruction raised SIGILL; the core does not implement it.
    Faulted,
    /// Installing the handler or capturing the mask failed, so the risky
    /// instruction was never attempted.
    SetupFailed,
    /// Runtime probing was compiled out (`no-runtime-probe` feature).
    Disabled,
    /// The compile target is not a POWER family processor, or offers no
    /// trappable signal delivery, so the extension cannot be present.
    UnsupportedArch,
}

impl ProbeOutcome {
    /// Collapse the outcome to the boolean capability answer.
    pub fn available(self) -> bool {
        matches!(self, ProbeOutcome::Supported)
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProbeOutcome::Supported => "supported",
            ProbeOutcome::Mismatch => "mismatch",
            ProbeOutcome::Faulted => "faulted",
            ProbeOutcome::SetupFailed => "setup_failed",
            ProbeOutcome::Disabled => "disabled",
            ProbeOutcome::UnsupportedArch => "unsupported_arch",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_supported_is_available() {
        assert!(ProbeOutcome::Supported.available());
        for outcome in [
            ProbeOutcome::Mismatch,
            ProbeOutcome::Faulted,
            ProbeOutcome::SetupFailed,
            ProbeOutcome::Disabled,
            ProbeOutcome::UnsupportedArch,
        ] {
            assert!(!outcome.available(), "{outcome} must not be available");
        }
    }

    #[test]
    fn serializes_snake_case() {
        let json = serde_json::to_string(&ProbeOutcome::UnsupportedArch).unwrap();
        assert_eq!(json, "\"unsupported_arch\"");
        let back: ProbeOutcome = serde_json::from_str("\"faulted\"").unwrap();
        assert_eq!(back, ProbeOutcome::Faulted);
    }
}
