//! Engine plugins and the lookup table the CLI uses to find them.

pub mod spidermonkey;

use esvm_schema::{EngineConfig, Platform};

use crate::buildhub::Buildhub;
use crate::engine::Engine;

pub use spidermonkey::SpiderMonkey;

/// Remote endpoints engines fetch from.
#[derive(Debug, Clone)]
pub struct Sources {
    pub buildhub: Buildhub,
    /// Mirror for Mozilla's archive; `None` uses the public one.
    pub mozilla_archive: Option<String>,
}

/// Descriptors of every known engine, in display order.
pub fn configs() -> &'static [EngineConfig] {
    &[spidermonkey::CONFIG]
}

/// Find an engine descriptor by id or alias.
pub fn find(name: &str) -> Option<&'static EngineConfig> {
    configs().iter().find(|c| c.matches(name))
}

/// Build a fresh engine instance for one install run.
pub fn lookup(name: &str, platform: Platform, sources: &Sources) -> Option<Box<dyn Engine>> {
    let config = find(name)?;
    match config.id {
        "jsshell" => {
            let mut engine = SpiderMonkey::new(platform, sources.buildhub.clone());
            if let Some(base) = &sources.mozilla_archive {
                engine = engine.with_archive_base(base.clone());
            }
            Some(Box::new(engine))
        }
        _ => None,
    }
}
