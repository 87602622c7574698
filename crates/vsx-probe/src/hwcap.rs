//! Advisory HWCAP detection from the ELF auxiliary vector.
//!
//! On Linux the kernel reports CPU features through `AT_HWCAP` and
//! `AT_HWCAP2` entries in `/proc/self/auxv`. This is what most dispatch
//! code trusts, and it is usually right - but it reflects what the kernel
//! *believes*, not what the silicon *does*, which is why the trap probe in
//! [`crate::power`] stays the authority for the boolean answer. The
//! snapshot here feeds the capability report as a cross-check: a machine
//! where hwcap and the probe disagree is worth a closer look.
//!
//! The parser is a pure function over bytes so it can be unit-tested and
//! fuzzed without a live procfs.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// ELF auxiliary vector entry types.
pub const AT_NULL: usize = 0;
pub const AT_HWCAP: usize = 16;
pub const AT_HWCAP2: usize = 26;

/// HWCAP bits, from the kernel's `asm/cputable.h`.
pub const PPC_FEATURE_HAS_ALTIVEC: u64 = 0x1000_0000;
pub const PPC_FEATURE_HAS_VSX: u64 = 0x0000_0080;
pub const PPC_FEATURE_ARCH_2_06: u64 = 0x0000_0100;

/// HWCAP2 bits.
pub const PPC_FEATURE2_ARCH_2_07: u64 = 0x8000_0000;
pub const PPC_FEATURE2_ARCH_3_00: u64 = 0x0080_0000;

/// Kernel-reported feature words for the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwcapSnapshot {
    pub hwcap: u64,
    pub hwcap2: u64,
}

impl HwcapSnapshot {
    pub fn has_altivec(&self) -> bool {
        self.hwcap & PPC_FEATURE_HAS_ALTIVEC != 0
    }

    /// The bit the trap probe exists to double-check.
    pub fn has_vsx(&self) -> bool {
        self.hwcap & PPC_FEATURE_HAS_VSX != 0
    }

    /// POWER7 ISA level (2.06).
    pub fn is_arch_2_06(&self) -> bool {
        self.hwcap & PPC_FEATURE_ARCH_2_06 != 0
    }

    /// POWER8 ISA level (2.07).
    pub fn is_arch_2_07(&self) -> bool {
        self.hwcap2 & PPC_FEATURE2_ARCH_2_07 != 0
    }

    /// POWER9 ISA level (3.00).
    pub fn is_arch_3_00(&self) -> bool {
        self.hwcap2 & PPC_FEATURE2_ARCH_3_00 != 0
    }
}

/// Parse an auxv image into the two HWCAP words.
///
/// Entries are native-endian `(type, value)` word pairs terminated by
/// `AT_NULL`. Returns `None` when neither HWCAP entry is present (the
/// words default to zero only if at least one was seen). Trailing partial
/// entries are ignored; this never panics on malformed input.
pub fn parse_auxv(raw: &[u8]) -> Option<HwcapSnapshot> {
    const WORD: usize = std::mem::size_of::<usize>();

    let mut hwcap: Option<u64> = None;
    let mut hwcap2: Option<u64> = None;

    for entry in raw.chunks_exact(2 * WORD) {
        let a_type = usize::from_ne_bytes(entry[..WORD].try_into().ok()?);
        let a_val = usize::from_ne_bytes(entry[WORD..].try_into().ok()?);

        match a_type {
            AT_NULL => break,
            AT_HWCAP => hwcap = Some(a_val as u64),
            AT_HWCAP2 => hwcap2 = Some(a_val as u64),
            _ => {}
        }
    }

    if hwcap.is_none() && hwcap2.is_none() {
        return None;
    }
    Some(HwcapSnapshot {
        hwcap: hwcap.unwrap_or(0),
        hwcap2: hwcap2.unwrap_or(0),
    })
}

/// Read the HWCAP snapshot for this process, if the platform exposes one.
pub fn read() -> Option<HwcapSnapshot> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        let raw = std::fs::read("/proc/self/auxv").ok()?;
        let snapshot = parse_auxv(&raw);
        trace!(?snapshot, "parsed /proc/self/auxv");
        snapshot
    }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auxv_image(entries: &[(usize, usize)]) -> Vec<u8> {
        let mut raw = Vec::new();
        for &(a_type, a_val) in entries {
            raw.extend_from_slice(&a_type.to_ne_bytes());
            raw.extend_from_slice(&a_val.to_ne_bytes());
        }
        raw
    }

    #[test]
    fn parses_both_hwcap_words() {
        let raw = auxv_image(&[
            (6, 4096), // AT_PAGESZ noise
            (AT_HWCAP, 0x1000_0180),
            (AT_HWCAP2, 0x8080_0000),
            (AT_NULL, 0),
        ]);
        let snap = parse_auxv(&raw).unwrap();
        assert_eq!(snap.hwcap, 0x1000_0180);
        assert_eq!(snap.hwcap2, 0x8080_0000);
        assert!(snap.has_altivec());
        assert!(snap.has_vsx());
        assert!(snap.is_arch_2_06());
        assert!(snap.is_arch_2_07());
        assert!(snap.is_arch_3_00());
    }

    #[test]
    fn missing_hwcap2_defaults_to_zero() {
        let raw = auxv_image(&[(AT_HWCAP, PPC_FEATURE_HAS_VSX as usize), (AT_NULL, 0)]);
        let snap = parse_auxv(&raw).unwrap();
        assert!(snap.has_vsx());
        assert_eq!(snap.hwcap2, 0);
        assert!(!snap.is_arch_2_07());
    }

    #[test]
    fn entries_after_at_null_are_ignored() {
        let raw = auxv_image(&[(AT_NULL, 0), (AT_HWCAP, 0xffff)]);
        assert_eq!(parse_auxv(&raw), None);
    }

    #[test]
    fn empty_and_truncated_input_yield_none() {
        assert_eq!(parse_auxv(&[]), None);
        assert_eq!(parse_auxv(&[1, 2, 3]), None);
        // A full entry followed by a partial one: partial is dropped.
        let mut raw = auxv_image(&[(AT_HWCAP, 7)]);
        raw.extend_from_slice(&[0xaa; 5]);
        assert_eq!(parse_auxv(&raw).unwrap().hwcap, 7);
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    #[test]
    fn live_auxv_is_readable() {
        // Every Linux process has an auxv with AT_HWCAP on the
        // architectures we care about; x86-64 included.
        let snap = read();
        assert!(snap.is_some());
    }
}
