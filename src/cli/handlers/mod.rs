// src/cli/handlers/mod.rs

// One module per CLI action.

pub mod add;
pub mod commons;
pub mod context;
pub mod group;
pub mod ll;
pub mod ls;
pub mod rename;
pub mod rm;
pub mod run;
