//! Pure state-machine types: actions, catalogs, outcomes and errors.

pub mod action;
pub mod error;
pub mod outcome;
