pub mod buildhub;
pub mod config;
pub mod engine;
pub mod engines;
pub mod installer;
pub mod io;
pub mod paths;
pub mod pipeline;
pub mod reporter;
pub mod status;

pub use engine::{Engine, EngineError};
pub use paths::*;
pub use reporter::{NullReporter, Reporter};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("esvm-core/", env!("CARGO_PKG_VERSION"));
