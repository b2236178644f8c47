// Scrollkeeper shared type definitions
// Each submodule defines types used across the crate.

pub mod errors;
pub mod events;
pub mod position;
pub mod settings;
pub mod view;
