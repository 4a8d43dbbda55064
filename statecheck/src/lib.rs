//! State-machine testing core.
//!
//! A machine under test exposes named actions and an optional invariant
//! check. A trial draws actions from an entropy source, retries actions that
//! turn out to be inapplicable, and runs the check before the first step and
//! after every step. The architecture keeps a strict separation:
//!
//! - **[`core`]**: Pure types (actions, catalogs, outcomes, errors). No I/O.
//! - **[`io`]**: Entropy sources and on-disk configuration.
//!
//! Orchestration modules ([`step`], [`repeat`]) drive a [`trial::Trial`]
//! against a catalog; [`demo`] and [`report`] back the CLI.

pub mod core;
pub mod demo;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod repeat;
pub mod report;
pub mod step;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod trial;
