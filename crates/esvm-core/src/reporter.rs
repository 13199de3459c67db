//! Reporter trait for dependency injection
//!
//! This trait allows the install pipeline to report progress and status
//! without being coupled to a specific terminal UI.

use esvm_schema::VersionSpec;

pub trait Reporter: Send + Sync {
    /// Indicates a new section or phase has started (e.g. "Installing").
    fn section(&self, title: &str);

    /// An engine's requested version is being resolved.
    fn resolving(&self, engine: &str, requested: &VersionSpec);

    /// Updates the progress of a download.
    fn downloading(&self, engine: &str, version: &VersionSpec, current: u64, total: Option<u64>);

    /// The archive is being unpacked.
    fn extracting(&self, engine: &str, version: &VersionSpec);

    /// Entry points are being registered.
    fn installing(&self, engine: &str, version: &VersionSpec);

    /// The installed binary is being smoke-tested.
    fn testing(&self, engine: &str, version: &VersionSpec);

    /// Marks an engine operation as successfully completed.
    fn done(&self, engine: &str, version: &VersionSpec, detail: &str);

    /// Marks an engine operation as failed with a specific reason.
    fn failed(&self, engine: &str, version: &VersionSpec, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title)
    }
    fn resolving(&self, engine: &str, requested: &VersionSpec) {
        (**self).resolving(engine, requested)
    }
    fn downloading(&self, engine: &str, version: &VersionSpec, current: u64, total: Option<u64>) {
        (**self).downloading(engine, version, current, total)
    }
    fn extracting(&self, engine: &str, version: &VersionSpec) {
        (**self).extracting(engine, version)
    }
    fn installing(&self, engine: &str, version: &VersionSpec) {
        (**self).installing(engine, version)
    }
    fn testing(&self, engine: &str, version: &VersionSpec) {
        (**self).testing(engine, version)
    }
    fn done(&self, engine: &str, version: &VersionSpec, detail: &str) {
        (**self).done(engine, version, detail)
    }
    fn failed(&self, engine: &str, version: &VersionSpec, reason: &str) {
        (**self).failed(engine, version, reason)
    }
    fn info(&self, msg: &str) {
        (**self).info(msg)
    }
    fn success(&self, msg: &str) {
        (**self).success(msg)
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg)
    }
    fn error(&self, msg: &str) {
        (**self).error(msg)
    }
}

/// A no-op reporter for silent operations (e.g., scripting, testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn resolving(&self, _: &str, _: &VersionSpec) {}
    fn downloading(&self, _: &str, _: &VersionSpec, _: u64, _: Option<u64>) {}
    fn extracting(&self, _: &str, _: &VersionSpec) {}
    fn installing(&self, _: &str, _: &VersionSpec) {}
    fn testing(&self, _: &str, _: &VersionSpec) {}
    fn done(&self, _: &str, _: &VersionSpec, _: &str) {}
    fn failed(&self, _: &str, _: &VersionSpec, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
