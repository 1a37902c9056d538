//! Progress feedback for the artifactctl CLI
//!
//! # Quiet Mode
//!
//! Progress bars are suppressed when:
//! - `--quiet` flag is passed
//! - `ARTIFACTCTL_QUIET=1` environment variable is set
//! - stderr is not a TTY (piped output)

use std::io::IsTerminal;
use std::sync::OnceLock;

use artifactctl_core::{ProgressEvent, ProgressSink};
use indicatif::{ProgressBar, ProgressStyle};

/// Global quiet mode state
static QUIET_MODE: OnceLock<bool> = OnceLock::new();

/// Initialize quiet mode from flags and environment
pub fn init_quiet_mode(quiet_flag: bool) {
    let is_quiet = quiet_flag
        || std::env::var("ARTIFACTCTL_QUIET").map(|v| v == "1").unwrap_or(false)
        || !std::io::stderr().is_terminal();

    QUIET_MODE.set(is_quiet).ok();
}

/// Check if we're in quiet mode
pub fn is_quiet() -> bool {
    *QUIET_MODE.get().unwrap_or(&false)
}

/// Renders export progress as a bounded bar sized on the first event.
pub struct BarProgress {
    pb: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        if is_quiet() {
            return Self { pb: None };
        }

        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/dim}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("━╸─"));
        }
        Self { pb: Some(pb) }
    }

    /// Clone of the underlying bar so the caller can finish it after the job
    pub fn handle(&self) -> Option<ProgressBar> {
        self.pb.clone()
    }
}

impl ProgressSink for BarProgress {
    fn notify(&self, event: &ProgressEvent) {
        if let Some(pb) = &self.pb {
            pb.set_length(event.total as u64);
            pb.set_position(event.current as u64);
            pb.set_message(truncate_label(&event.conversation_name, 50));
        } else {
            tracing::debug!(
                current = event.current,
                total = event.total,
                conversation = %event.conversation_name,
                "progress"
            );
        }
    }
}

/// Clear a progress bar, leaving the terminal for the summary line
pub fn finish(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

/// Truncate on char boundaries, adding an ellipsis
fn truncate_label(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_len.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_labels() {
        assert_eq!(truncate_label("short", 10), "short");
    }

    #[test]
    fn truncate_is_char_safe() {
        let label = truncate_label("日本語のタイトルです", 5);
        assert_eq!(label.chars().count(), 5);
        assert!(label.ends_with('…'));
    }
}
