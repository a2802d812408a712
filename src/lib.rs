// lib.rs
// Library modules for the mancala server

pub mod defs;
pub mod error;
pub mod logging;
pub mod config;
pub mod decoder;
pub mod registry;
pub mod sowing;
pub mod broadcast;
pub mod turn;
pub mod record;
pub mod game;
pub mod server;

#[cfg(test)]
mod test_support;
