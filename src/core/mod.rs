// src/core/mod.rs — Conversation engine

pub mod driver;
pub mod transcript;
pub mod turn;
pub mod usage;
