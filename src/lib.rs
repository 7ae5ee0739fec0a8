// lib.rs
// Library modules for the tambola core

pub mod calls;
pub mod config;
pub mod defs;
pub mod detection;
pub mod logging;
pub mod pouch;
pub mod sheet;
pub mod terminal;
pub mod ticket;
