// Adapters layer: concrete implementations for external systems (processes, http, filesystem).

pub mod archive;
pub mod download;
pub mod process;
