//! The simulator's single error type.
//!
//! Following the teacher's own plumbing-error style (plain `Result<_, String>`
//! in its CLI configuration layer, no `thiserror`/`anyhow` anywhere in the
//! workspace), `SimError` is a small hand-rolled enum with a manual `Display`.

use std::fmt;

/// Fatal conditions that can terminate a simulation run.
///
/// Kernel-state anomalies (apply leaving a non-zero accumulator, a stale
/// `in_use` flag at barrier sweep) are diagnostics, not errors — they are
/// logged through [`crate::logging::SimEvent`] and do not appear here.
#[derive(Debug)]
pub enum SimError {
    /// A violation of the per-round / per-barrier messaging protocol (I1-I2,
    /// the Apply/Scatter wrapper's level checks). Always fatal.
    Protocol { pe: usize, detail: String },
    /// The graph file could not be opened or its contents were malformed.
    Io(std::io::Error),
    /// The graph or configuration could not be realized (too many vertices per
    /// PE, unknown algorithm name, malformed CLI argument).
    GraphShape(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Protocol { pe, detail } => write!(f, "protocol violation at pe {pe}: {detail}"),
            SimError::Io(e) => write!(f, "I/O error: {e}"),
            SimError::GraphShape(detail) => write!(f, "graph shape error: {detail}"),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Io(e)
    }
}
