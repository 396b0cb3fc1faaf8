//! Common types and utilities shared by the RTF pipeline.

// Submodule declarations
pub mod encoding;
pub mod style;
pub mod unit;

// Re-exports for convenience
pub use style::Rgba;
