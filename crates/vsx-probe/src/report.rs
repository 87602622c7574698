//! Capability snapshot for operators and log bundles.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::caps;
use crate::hwcap::{self, HwcapSnapshot};
use crate::outcome::ProbeOutcome;

/// Everything this crate knows about VSX support on the running machine.
///
/// Combines the authoritative trap-probe outcome with the kernel's
/// advisory HWCAP words so disagreements are visible in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityReport {
    /// Machine architecture the binary was compiled for.
    pub arch: String,

    /// Operating system.
    pub os: String,

    /// Whether VSX was a compile-time baseline feature.
    pub static_vsx: bool,

    /// Whether runtime probing was compiled out (`no-runtime-probe`).
    pub probing_disabled: bool,

    /// Kernel-reported HWCAP words, where the platform exposes them.
    pub hwcap: Option<HwcapSnapshot>,

    /// How the trap-protected probe resolved.
    pub probe: ProbeOutcome,

    /// The boolean answer dispatch layers act on.
    pub vsx_available: bool,

    /// When this report was produced.
    pub detected_at: String,
}

impl CapabilityReport {
    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "arch: {} | probe: {} | vsx: {} | hwcap vsx: {}",
            self.arch,
            self.probe,
            if self.vsx_available { "yes" } else { "no" },
            match &self.hwcap {
                Some(snap) if snap.has_vsx() => "yes",
                Some(_) => "no",
                None => "n/a",
            }
        )
    }
}

/// Build the capability report, probing (once, cached) as needed.
pub fn detect() -> CapabilityReport {
    let probe = caps::cached_outcome();
    let report = CapabilityReport {
        arch: std::env::consts::ARCH.to_string(),
        os: std::env::consts::OS.to_string(),
        static_vsx: cfg!(all(
            any(target_arch = "powerpc", target_arch = "powerpc64"),
            target_feature = "vsx"
        )),
        probing_disabled: cfg!(feature = "no-runtime-probe"),
        hwcap: hwcap::read(),
        probe,
        vsx_available: probe.available(),
        detected_at: chrono::Utc::now().to_rfc3339(),
    };
    info!(summary = %report.summary(), "capability detection complete");
    report
}
