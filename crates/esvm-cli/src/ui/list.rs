//! List output formatting
//!
//! Provides column-aligned rendering for `esvm list` and `esvm engines`.

use crossterm::style::Stylize;
use esvm_schema::{EngineConfig, Platform};

use super::theme::Theme;

/// Column headers for `esvm list`
pub fn list_header() -> String {
    let theme = Theme::default();
    format!(
        "  {:<iw$} {:<vw$} {:<10} {}",
        "engine",
        "version",
        "installed",
        "binary",
        iw = theme.layout.id_width,
        vw = theme.layout.version_width,
    )
    .dark_grey()
    .to_string()
}

/// A single row for `esvm list`
pub fn list_row(id: &str, version: &str, date: &str, bin: &str) -> String {
    let theme = Theme::default();
    let id_part = format!("{id:<width$}", width = theme.layout.id_width);
    let version_part = format!("{version:<width$}", width = theme.layout.version_width);
    let date_part = format!("{date:<10}");

    format!(
        "  {} {} {} {}",
        id_part.with(theme.colors.engine_name),
        version_part.with(theme.colors.version),
        date_part.with(theme.colors.secondary),
        bin.with(theme.colors.secondary)
    )
}

/// Column headers for `esvm engines`
pub fn engines_header() -> String {
    let theme = Theme::default();
    format!(
        "  {:<iw$} {:<nw$} {:<10} {}",
        "id",
        "name",
        "available",
        "aliases",
        iw = theme.layout.id_width,
        nw = theme.layout.name_width,
    )
    .dark_grey()
    .to_string()
}

/// A single row for `esvm engines`
pub fn engines_row(config: &EngineConfig, platform: Platform) -> String {
    let theme = Theme::default();
    let id_part = format!("{:<width$}", config.id, width = theme.layout.id_width);
    let name_part = format!("{:<width$}", config.name, width = theme.layout.name_width);
    let available = if config.supports(platform) {
        format!("{:<10}", theme.icons.success).with(theme.colors.success)
    } else {
        format!("{:<10}", theme.icons.error).with(theme.colors.error)
    };

    format!(
        "  {} {} {} {}",
        id_part.with(theme.colors.engine_name),
        name_part.with(theme.colors.version),
        available,
        config.aliases.join(", ").with(theme.colors.secondary)
    )
}
