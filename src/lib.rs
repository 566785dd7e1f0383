// src/lib.rs — Library root for convoloop

pub mod cli;
pub mod core;
pub mod infra;
pub mod provider;
pub mod util;
