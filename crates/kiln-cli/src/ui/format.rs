//! Formatting utilities for durations and task listings.

use std::time::Duration;

/// Format duration in human-readable format.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use kiln_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One row of `kiln --tasks`.
#[derive(Debug, Clone)]
pub struct TaskListEntry {
    pub name: String,
    pub description: String,
    pub prerequisites: Vec<String>,
}

/// Render the task listing as plain text, one task per line, names aligned.
pub fn format_task_list(entries: &[TaskListEntry]) -> String {
    let width = entries.iter().map(|e| e.name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("  {:width$}  {}", entry.name, entry.description, width = width));
        if !entry.prerequisites.is_empty() {
            out.push_str(&format!(" [after: {}]", entry.prerequisites.join(", ")));
        }
        out.push('\n');
    }
    out
}
