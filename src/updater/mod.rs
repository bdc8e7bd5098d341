//! Addon Update Orchestration
//!
//! The core of the crate: deciding whether to check, fanning the check out
//! over all loaded repositories, asking for consent, applying accepted
//! updates with per-addon failure isolation, and tracking whether the
//! process needs a restart afterwards.
//!
//! Component layering, leaves first:
//!
//! - [`rate_limit`] gates how often checks may run
//! - [`checker`] wraps one repository's check and classifies failures
//! - [`aggregator`] fans the checker out concurrently and joins the results
//! - [`applier`] applies pending updates sequentially
//! - [`controller`] sequences the whole flow against the host's dialogs

pub mod aggregator;
pub mod applier;
pub mod checker;
pub mod controller;
pub mod error;
pub mod rate_limit;

pub use applier::ApplyReport;
pub use controller::{
    ControllerOutcome, ControllerState, OrchestratorState, SelfUpdate, StartupTrigger,
    UpdateController, UpdatePrompt,
};
pub use error::{CheckError, CheckResult, SelfUpdateError};
pub use rate_limit::{CheckKind, RateLimiter};

/// Most addon names shown in a consent or report dialog
pub const MAX_DISPLAY_NAMES: usize = 6;

/// Newline-joined addon names for dialogs, truncated to
/// [`MAX_DISPLAY_NAMES`] with an ellipsis line when there are more.
pub fn format_addon_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<&str> = names.into_iter().collect();
    let mut lines: Vec<&str> = names.iter().take(MAX_DISPLAY_NAMES).copied().collect();
    if names.len() > MAX_DISPLAY_NAMES {
        lines.push("...");
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_over_limit() {
        let names: Vec<String> = (1..=7).map(|i| format!("Addon {}", i)).collect();
        let formatted = format_addon_names(names.iter().map(|s| s.as_str()));

        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(&lines[..6], &names[..6].iter().map(|s| s.as_str()).collect::<Vec<_>>()[..]);
        assert_eq!(lines[6], "...");
    }

    #[test]
    fn test_no_truncation_at_limit() {
        let names: Vec<String> = (1..=6).map(|i| format!("Addon {}", i)).collect();
        let formatted = format_addon_names(names.iter().map(|s| s.as_str()));

        assert_eq!(formatted.lines().count(), 6);
        assert!(!formatted.contains("..."));
    }

    #[test]
    fn test_empty_names() {
        assert_eq!(format_addon_names(Vec::<&str>::new()), "");
    }
}
