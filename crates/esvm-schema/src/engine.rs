//! Static engine descriptors.

use crate::Platform;

/// Process-wide metadata about an installable engine.
///
/// Used by the CLI for listing and filtering; never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Display name (e.g. `SpiderMonkey`).
    pub name: &'static str,
    /// Short identifier used in config files and on the command line.
    pub id: &'static str,
    /// Extra names accepted on the command line.
    pub aliases: &'static [&'static str],
    /// Platforms this engine publishes builds for.
    pub supported: &'static [Platform],
}

impl EngineConfig {
    /// Returns `true` if builds exist for `platform`.
    pub fn supports(&self, platform: Platform) -> bool {
        self.supported.contains(&platform)
    }

    /// Returns `true` if `name` is this engine's id or one of its aliases.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.id == name || self.aliases.contains(&name.as_str())
    }
}
