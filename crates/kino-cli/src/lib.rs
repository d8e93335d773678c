//! Library components of the `kino` CLI.

pub mod logging;
pub mod pipeline;
pub mod types;
