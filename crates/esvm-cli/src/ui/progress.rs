//! Download progress formatting.

use super::theme::format_size;

/// Progress text for a download: `"3.1 MB / 12.0 MB (25%)"`, or just the
/// byte count when the server sent no length.
pub fn format_progress(current: u64, total: Option<u64>) -> String {
    match total.filter(|&t| t > 0) {
        Some(total) => format!(
            "{} / {} ({}%)",
            format_size(current),
            format_size(total),
            percent(current, total)
        ),
        None => format_size(current),
    }
}

/// Whole percentage of `current` over `total`, capped at 100.
pub fn percent(current: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (current.saturating_mul(100) / total).min(100)
}
