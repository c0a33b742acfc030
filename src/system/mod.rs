//! # System Interaction Layer
//!
//! Everything that talks to child processes lives here, behind plain Rust types.
//!
//! ## Modules
//!
//! - **`executor`**: fans a command out to many repositories on a single-threaded
//!   tokio runtime and prints each task's output as one framed block.
//! - **`probe`**: read-only git queries (head, dirty, untracked, last commit),
//!   each run with an explicit working directory.

pub mod executor;
pub mod probe;
