// src/core/mod.rs

pub mod cmd_loader;
pub mod color;
pub mod context_store;
pub mod group_store;
pub mod paths;
pub mod repo_registry;
pub mod status;
