//! Check Rate Limiting
//!
//! Two independent cooldown timers gate how often the repository-level and
//! addon-level checks may run. The limiter is deliberately fail-open: if
//! the deadline computation ever fails, the check is allowed - silently
//! never checking again is worse than an extra check.

use chrono::{DateTime, Duration, Utc};

/// Default cooldown between checks of the same kind
pub const DEFAULT_COOLDOWN_HOURS: i64 = 2;

/// Which of the two independent check timers to consult
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// Front-end/repository-level self-update check
    Repository,
    /// Per-addon update check
    Addon,
}

/// Cooldown gate over the two check kinds.
///
/// Owned by the orchestrator state and driven from a single controller
/// context; it is not meant to be shared across concurrent callers.
#[derive(Debug)]
pub struct RateLimiter {
    cooldown: Duration,
    last_repository_check: Option<DateTime<Utc>>,
    last_addon_check: Option<DateTime<Utc>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_COOLDOWN_HOURS))
    }
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_repository_check: None,
            last_addon_check: None,
        }
    }

    /// Decide whether a check of the given kind may start now.
    ///
    /// The first call for a kind is always admitted and records the
    /// timestamp. Later calls are admitted once the cooldown has elapsed;
    /// an admitted call refreshes its timestamp, and an admitted
    /// repository check also seeds the addon timer so both checks do not
    /// fire back to back.
    pub fn can_check(&mut self, kind: CheckKind) -> bool {
        let now = Utc::now();
        let last = match kind {
            CheckKind::Repository => self.last_repository_check,
            CheckKind::Addon => self.last_addon_check,
        };

        let admit = match last {
            None => true,
            Some(last) => match last.checked_add_signed(self.cooldown) {
                Some(deadline) => now > deadline,
                None => {
                    // Deadline computation overflowed; fail open.
                    log::error!("rate limiter deadline computation failed, allowing check");
                    true
                }
            },
        };

        if admit {
            match kind {
                CheckKind::Repository => {
                    self.last_repository_check = Some(now);
                    self.last_addon_check = Some(now);
                }
                CheckKind::Addon => self.last_addon_check = Some(now),
            }
        }
        admit
    }
}
