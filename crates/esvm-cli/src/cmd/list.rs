//! List command

use anyhow::{Context, Result};
use crossterm::style::Stylize;
use esvm_core::status::Status;

use crate::ui::list::{list_header, list_row};

/// List installed engines
pub async fn list() -> Result<()> {
    let layout = super::home_layout()?;
    let status = Status::load(&layout.status_path())
        .await
        .context("Failed to read status file")?;

    if status.engines.is_empty() {
        println!();
        println!("  No engines installed.");
        println!("  Run 'esvm install' to get started.");
        return Ok(());
    }

    println!();
    println!("{}", list_header());
    for (id, engine) in &status.engines {
        let date = engine
            .installed_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d")
            .to_string();
        let bin = engine
            .bin_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!("{}", list_row(id, engine.version.as_str(), &date, &bin));
    }
    println!();
    println!(
        "{}",
        format!("  {} installed", status.engines.len()).dark_grey()
    );

    Ok(())
}
