//! Entropy sources and configuration storage.

pub mod config;
pub mod entropy;
pub mod replay;
pub mod seeded;
