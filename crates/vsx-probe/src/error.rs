//! Error types for probe setup.
//!
//! These never cross the public probe boundary: per the fail-safe policy,
//! setup failures collapse into a negative probe result. They exist so the
//! setup path can use `Result` internally and so diagnostics can say *why*
//! a probe reported "unavailable" on a machine that should support VSX.

use thiserror::Error;

/// Errors while arming the SIGILL trap envelope.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// `sigaction(2)` refused to install the temporary SIGILL handler.
    #[error("failed to install SIGILL handler (errno {errno})")]
    HandlerInstall { errno: i32 },

    /// `pthread_sigmask(3)` could not read the current signal mask.
    /// The temporary handler has already been rolled back when this is
    /// returned; no partial state stays installed.
    #[error("failed to capture signal mask (errno {errno})")]
    MaskCapture { errno: i32 },
}

impl ProbeError {
    /// The raw OS errno behind this failure.
    pub fn errno(&self) -> i32 {
        match self {
            ProbeError::HandlerInstall { errno } => *errno,
            ProbeError::MaskCapture { errno } => *errno,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_errno() {
        let err = ProbeError::HandlerInstall { errno: 22 };
        assert!(err.to_string().contains("22"));
        assert_eq!(err.errno(), 22);
    }
}
