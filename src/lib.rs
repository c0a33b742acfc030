//! repodeck: one-line status for many git working trees, and commands fanned
//! out across them.
//!
//! The two engines live in [`core::status`] (status synthesis) and
//! [`system::executor`] (concurrent command runner). Everything they consume
//! comes from the registry and stores in [`core`].

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod state;
pub mod system;
