//! Error classification shared by every module
//!
//! Each module keeps its own `thiserror` enum; `kind()` on those enums maps
//! them onto this small taxonomy so hosts can decide how to react without
//! matching every variant.

/// Broad class of a recoverable error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation is not valid in the current state (ticking an idle
    /// timer, registering a timer twice, re-entrant advance)
    InvalidStateTransition,
    /// A timer, subscription or modifier handle is not tracked
    UnknownHandle,
    /// No stat is stored under the requested tag
    MissingStat,
    /// A stat table already holds a stat for that tag or slot
    DuplicateStat,
    /// Reading preset or config files failed
    Io,
    /// A preset or config file could not be parsed or validated
    Parse,
}
