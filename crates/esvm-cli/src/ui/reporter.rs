//! Terminal implementation of the core `Reporter` trait.
//!
//! Step lines go to stderr so command output on stdout stays pipeable.
//! Download progress is redrawn in place when stderr is a terminal and
//! skipped otherwise.

use std::io::{IsTerminal, Write};
use std::sync::Mutex;

use crossterm::{
    QueueableCommand,
    cursor::MoveToColumn,
    style::{Color, Stylize},
    terminal::{Clear, ClearType},
};
use esvm_core::Reporter;
use esvm_schema::VersionSpec;

use super::progress::{format_progress, percent};
use super::theme::Theme;

#[derive(Debug, Default)]
struct ProgressState {
    /// A progress line is on screen without a trailing newline.
    open: bool,
    last_percent: Option<u64>,
}

/// Prints install steps to stderr.
#[derive(Debug)]
pub struct ConsoleReporter {
    theme: Theme,
    quiet: bool,
    interactive: bool,
    progress: Mutex<ProgressState>,
}

impl ConsoleReporter {
    /// Create a reporter; `quiet` hides everything but results and problems.
    pub fn new(quiet: bool) -> Self {
        Self {
            theme: Theme::default(),
            quiet,
            interactive: std::io::stderr().is_terminal(),
            progress: Mutex::new(ProgressState::default()),
        }
    }

    fn step_line(&self, icon: &str, color: Color, engine: &str, version: &str, msg: &str) -> String {
        let colors = &self.theme.colors;
        format!(
            "  {} {} {} {}",
            icon.with(color),
            format!("{engine:<width$}", width = self.theme.layout.name_width)
                .with(colors.engine_name),
            version.with(colors.version),
            msg.with(colors.secondary)
        )
    }

    fn message_line(icon: &str, color: Color, msg: &str) -> String {
        format!("  {} {msg}", icon.with(color))
    }

    /// Print one line, first clearing any in-place progress line.
    ///
    /// Locks stderr before the progress state, same as `downloading`.
    fn emit(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        if let Ok(mut state) = self.progress.lock() {
            if state.open {
                let _ = stderr.queue(MoveToColumn(0));
                let _ = stderr.queue(Clear(ClearType::CurrentLine));
                state.open = false;
            }
            state.last_percent = None;
        }
        let _ = writeln!(stderr, "{line}");
        let _ = stderr.flush();
    }

    fn step(&self, engine: &str, version: &VersionSpec, msg: &str) {
        if self.quiet {
            return;
        }
        let line = self.step_line(
            self.theme.icons.active,
            self.theme.colors.active,
            engine,
            version.as_str(),
            msg,
        );
        self.emit(&line);
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        self.emit("");
        self.emit(&title.with(self.theme.colors.header).to_string());
    }

    fn resolving(&self, engine: &str, requested: &VersionSpec) {
        self.step(engine, requested, "resolving");
    }

    fn downloading(&self, engine: &str, version: &VersionSpec, current: u64, total: Option<u64>) {
        if self.quiet || !self.interactive {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        let Ok(mut state) = self.progress.lock() else {
            return;
        };
        if let Some(total) = total.filter(|&t| t > 0) {
            let pct = percent(current, total);
            if state.last_percent == Some(pct) {
                return;
            }
            state.last_percent = Some(pct);
        }

        let line = self.step_line(
            self.theme.icons.active,
            self.theme.colors.active,
            engine,
            version.as_str(),
            &format!("downloading {}", format_progress(current, total)),
        );
        let _ = stderr.queue(MoveToColumn(0));
        let _ = stderr.queue(Clear(ClearType::CurrentLine));
        let _ = write!(stderr, "{line}");
        let _ = stderr.flush();
        state.open = true;
    }

    fn extracting(&self, engine: &str, version: &VersionSpec) {
        self.step(engine, version, "extracting");
    }

    fn installing(&self, engine: &str, version: &VersionSpec) {
        self.step(engine, version, "installing");
    }

    fn testing(&self, engine: &str, version: &VersionSpec) {
        self.step(engine, version, "testing");
    }

    fn done(&self, engine: &str, version: &VersionSpec, detail: &str) {
        let line = self.step_line(
            self.theme.icons.success,
            self.theme.colors.success,
            engine,
            version.as_str(),
            detail,
        );
        self.emit(&line);
    }

    fn failed(&self, engine: &str, version: &VersionSpec, reason: &str) {
        let line = self.step_line(
            self.theme.icons.error,
            self.theme.colors.error,
            engine,
            version.as_str(),
            reason,
        );
        self.emit(&line);
    }

    fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.emit(&Self::message_line(self.theme.icons.info, self.theme.colors.secondary, msg));
    }

    fn success(&self, msg: &str) {
        self.emit(&Self::message_line(self.theme.icons.success, self.theme.colors.success, msg));
    }

    fn warning(&self, msg: &str) {
        self.emit(&Self::message_line(self.theme.icons.warning, self.theme.colors.warning, msg));
    }

    fn error(&self, msg: &str) {
        self.emit(&Self::message_line(self.theme.icons.error, self.theme.colors.error, msg));
    }
}
