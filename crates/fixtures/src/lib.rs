//! Schemas compiled by `build.rs`; the emitted modules are included from `OUT_DIR`.

pub mod commands;
pub mod events;
pub mod names;
