// Shared type definitions
// Each submodule defines types used across the store, presentation and RPC layers.

pub mod category;
pub mod errors;
pub mod section;
pub mod settings;
