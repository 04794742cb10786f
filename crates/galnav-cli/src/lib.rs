//! Galnav CLI library.
//!
//! Helpers behind the `galnav` binary: traveller state files, logging setup,
//! and route rendering.

pub mod logging;
pub mod output;
pub mod state;
pub mod terminal;
