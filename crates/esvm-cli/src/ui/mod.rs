//! Terminal output for esvm commands.
//!
//! - [`theme`] - Colors, icons, and design constants
//! - [`progress`] - Download progress formatting
//! - [`reporter`] - [`ConsoleReporter`], the terminal implementation of
//!   the core `Reporter` trait
//! - [`list`] - Column-aligned rows for `esvm list` and `esvm engines`

pub mod list;
pub mod progress;
pub mod reporter;
pub mod theme;

pub use reporter::ConsoleReporter;
pub use theme::Theme;
