//! Command implementations for netctl

pub mod health;
pub mod inspect;
pub mod network;
pub mod serve;
