//! Fuzz target for the auxv HWCAP parser.
//!
//! The parser normally reads kernel-provided bytes, but it must hold up
//! against arbitrary input: no panics, no out-of-bounds access, only a
//! parsed snapshot or None.

#![no_main]

use libfuzzer_sys::fuzz_target;
use vsx_probe::hwcap::parse_auxv;

fuzz_target!(|data: &[u8]| {
    let _ = parse_auxv(data);
});
