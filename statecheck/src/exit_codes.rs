//! Stable exit codes for statecheck CLI commands.

/// All trials passed or were discarded as invalid.
pub const OK: i32 = 0;
/// Invalid configuration, catalog, or other runner error.
pub const INVALID: i32 = 1;
/// A trial found a bug (assertion failure or no valid action).
pub const FAILED: i32 = 2;
