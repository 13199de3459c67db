//! Shared types for esvm.
//!
//! Pure data with no I/O: platform identifiers, engine version strings, and
//! the static descriptors engines publish about themselves.

pub mod engine;
pub mod platform;
pub mod version;

// Re-exports
pub use engine::EngineConfig;
pub use platform::{Platform, PlatformError, PlatformFamily};
pub use version::{BuildId, VersionError, VersionSpec};
