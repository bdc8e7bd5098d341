//! Orchestration Controller
//!
//! Top-level sequencing: should we check at all, check, summarize, ask for
//! consent, apply, report, and possibly require a restart. Dialogs are
//! modeled as explicit async request/response seams rather than callback
//! chains, so every transition that needs external input is a suspension
//! point awaiting a typed answer.
//!
//! Individual repository or addon failures never reach this layer; only a
//! failure in the controller's own sequencing (e.g. the registry load)
//! surfaces, as `anyhow::Error`, to the host's generic error reporting.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::Settings;
use crate::registry::{Addon, RepositoryRegistry};
use crate::worker::TaskWorker;

use super::error::SelfUpdateError;
use super::rate_limit::{CheckKind, RateLimiter};
use super::{aggregator, applier, format_addon_names};

/// Dialog seam to the host environment.
///
/// Each method corresponds to one GUI dialog; the controller awaits the
/// user's answer before transitioning.
#[async_trait]
pub trait UpdatePrompt: Send + Sync {
    /// Consent dialog before applying updates. `names` is already
    /// truncated for display.
    async fn confirm_updates(&self, pending_count: usize, names: &str) -> bool;

    /// Report dialog after an apply pass ("N of M updated").
    async fn report_applied(&self, applied_count: usize, pending_count: usize, names: &str);

    /// Restart dialog; true means restart the process now.
    async fn confirm_restart(&self) -> bool;

    /// Informational screen shown once on first run.
    async fn first_run_notice(&self) {}
}

/// The front-end's own update mechanism, a distinct concern from per-addon
/// checks. `Ok(true)` means an update was installed and a restart is
/// required.
#[async_trait]
pub trait SelfUpdate: Send + Sync {
    async fn check_and_apply(&self) -> Result<bool, SelfUpdateError>;
}

/// Process-lifetime state shared across controller entries.
///
/// Replaces ambient statics: the restart flag survives deferred restarts
/// (a true restart clears it by ending the process), and the rate limiter
/// timestamps persist between entries.
#[derive(Debug)]
pub struct OrchestratorState {
    pub need_restart: bool,
    pub rate_limiter: RateLimiter,
}

impl Default for OrchestratorState {
    fn default() -> Self {
        Self {
            need_restart: false,
            rate_limiter: RateLimiter::default(),
        }
    }
}

impl OrchestratorState {
    pub fn new(rate_limiter: RateLimiter) -> Self {
        Self {
            need_restart: false,
            rate_limiter,
        }
    }
}

/// Which entry path a controller run takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupTrigger {
    /// A previous run applied updates and the restart is still pending
    RestartPending,
    /// The first-run marker file is present
    FirstRun,
    /// Repository-level auto-update is enabled and admitted by the limiter
    RepositoryCheckDue,
    /// Addon-level auto-update is enabled and admitted by the limiter
    AddonCheckDue,
    /// Nothing due; open the content screen immediately
    Idle,
}

/// Controller phases, in flow order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    CheckingRepositories,
    AwaitingConsent,
    Applying,
    Reporting,
    RestartPrompt,
    Done,
}

/// What the host should do after a controller run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerOutcome {
    /// The content screen was opened; proceed normally
    OpenContent,
    /// The user accepted a restart; hand off to the restart primitive
    Restart,
    /// A restart is needed but was deferred; the next entry re-offers it
    RestartDeferred,
}

/// Sequences one entry into the update flow.
///
/// The pending and applied sets are scoped to a single run and reset on
/// entry; the applied set is always a subset of the pending set.
pub struct UpdateController {
    settings: Settings,
    registry: Arc<RepositoryRegistry>,
    state: Arc<Mutex<OrchestratorState>>,
    prompt: Arc<dyn UpdatePrompt>,
    self_update: Option<Arc<dyn SelfUpdate>>,
    worker: Arc<TaskWorker>,
    phase: ControllerState,
    pending: Vec<Arc<Addon>>,
    applied: Vec<Arc<Addon>>,
}

impl UpdateController {
    pub fn new(
        settings: Settings,
        registry: Arc<RepositoryRegistry>,
        state: Arc<Mutex<OrchestratorState>>,
        prompt: Arc<dyn UpdatePrompt>,
        worker: Arc<TaskWorker>,
    ) -> Self {
        Self {
            settings,
            registry,
            state,
            prompt,
            self_update: None,
            worker,
            phase: ControllerState::Idle,
            pending: Vec::new(),
            applied: Vec::new(),
        }
    }

    /// Wire in the front-end self-update mechanism
    pub fn with_self_update(mut self, self_update: Arc<dyn SelfUpdate>) -> Self {
        self.self_update = Some(self_update);
        self
    }

    pub fn phase(&self) -> ControllerState {
        self.phase
    }

    /// Pending-update set collected by the last run
    pub fn pending(&self) -> &[Arc<Addon>] {
        &self.pending
    }

    /// Successfully applied subset of the last run's pending set
    pub fn applied(&self) -> &[Arc<Addon>] {
        &self.applied
    }

    fn enter(&mut self, phase: ControllerState) {
        log::debug!("controller: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    /// Decide which entry path this run takes.
    ///
    /// Consulting the limiter records the check timestamps, so this is
    /// called exactly once per run.
    pub fn decide_trigger(&self) -> StartupTrigger {
        let mut state = self.state.lock();
        if state.need_restart {
            return StartupTrigger::RestartPending;
        }
        if self.first_run_marker_present() {
            return StartupTrigger::FirstRun;
        }
        if self.settings.repository_auto_update
            && state.rate_limiter.can_check(CheckKind::Repository)
        {
            return StartupTrigger::RepositoryCheckDue;
        }
        if self.settings.addon_auto_update && state.rate_limiter.can_check(CheckKind::Addon) {
            return StartupTrigger::AddonCheckDue;
        }
        StartupTrigger::Idle
    }

    /// Run one entry into the update flow.
    pub async fn run(&mut self) -> Result<ControllerOutcome> {
        self.pending.clear();
        self.applied.clear();
        self.enter(ControllerState::Idle);

        match self.decide_trigger() {
            StartupTrigger::RestartPending => self.prompt_restart().await,
            StartupTrigger::FirstRun => {
                self.consume_first_run_marker();
                self.prompt.first_run_notice().await;
                // first run checks addons regardless of flags or limiter
                self.check_and_apply().await
            }
            StartupTrigger::RepositoryCheckDue => self.run_self_update().await,
            StartupTrigger::AddonCheckDue => self.check_and_apply().await,
            StartupTrigger::Idle => self.finish().await,
        }
    }

    async fn run_self_update(&mut self) -> Result<ControllerOutcome> {
        let Some(self_update) = self.self_update.clone() else {
            return self.fall_back_to_addon_check().await;
        };

        log::info!("checking front-end update...");
        match self_update.check_and_apply().await {
            Ok(true) => {
                self.state.lock().need_restart = true;
                self.prompt_restart().await
            }
            Ok(false) => self.fall_back_to_addon_check().await,
            Err(e) => {
                // Self-update failure is fatal to that path only.
                log::error!("{}", e);
                self.fall_back_to_addon_check().await
            }
        }
    }

    /// Addon-check path entered as a fallback; still respects the limiter.
    async fn fall_back_to_addon_check(&mut self) -> Result<ControllerOutcome> {
        let due = self.settings.addon_auto_update
            && self.state.lock().rate_limiter.can_check(CheckKind::Addon);
        if due {
            self.check_and_apply().await
        } else {
            self.finish().await
        }
    }

    async fn check_and_apply(&mut self) -> Result<ControllerOutcome> {
        self.enter(ControllerState::CheckingRepositories);
        if !self.registry.is_loaded() {
            self.registry
                .load()
                .context("Failed to load repositories for update check")?;
        }

        log::info!("checking addon updates...");
        self.pending = aggregator::check_all(&self.registry.repositories()).await;
        if self.pending.is_empty() {
            log::info!("no addon updates pending");
            return self.finish().await;
        }

        self.enter(ControllerState::AwaitingConsent);
        let names = format_addon_names(self.pending.iter().map(|a| a.name()));
        if !self.prompt.confirm_updates(self.pending.len(), &names).await {
            log::info!("addon update declined");
            return self.finish().await;
        }

        self.enter(ControllerState::Applying);
        let report = applier::apply_all(&self.pending).await;
        self.applied = report.applied;

        self.enter(ControllerState::Reporting);
        log::info!(
            "applied {}/{} addon update(s)",
            self.applied.len(),
            self.pending.len()
        );
        self.prompt
            .report_applied(self.applied.len(), self.pending.len(), &report.summary)
            .await;

        self.prompt_restart().await
    }

    async fn prompt_restart(&mut self) -> Result<ControllerOutcome> {
        self.enter(ControllerState::RestartPrompt);
        // Recorded before asking so a deferred restart is re-offered on the
        // next controller entry.
        self.state.lock().need_restart = true;

        if self.prompt.confirm_restart().await {
            Ok(ControllerOutcome::Restart)
        } else {
            Ok(ControllerOutcome::RestartDeferred)
        }
    }

    async fn finish(&mut self) -> Result<ControllerOutcome> {
        self.enter(ControllerState::Done);
        self.open_content_screen().await?;
        Ok(ControllerOutcome::OpenContent)
    }

    /// Host hook: the main content screen is opening.
    ///
    /// Ensures the registries are loaded and starts the background worker
    /// the screen depends on.
    pub async fn open_content_screen(&self) -> Result<()> {
        if !self.registry.is_loaded() {
            self.registry
                .load()
                .context("Failed to load repositories")?;
        }
        self.worker.start().await;
        Ok(())
    }

    /// Host hook: the main content screen closed.
    ///
    /// Stops the worker after draining it and tears the registries down
    /// unless preloading keeps them warm for the next open.
    pub async fn close_content_screen(&self) {
        self.worker.stop().await;
        if !self.settings.preload {
            self.registry.clear();
        }
    }

    fn first_run_marker_present(&self) -> bool {
        self.settings
            .first_run_marker
            .as_ref()
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    fn consume_first_run_marker(&self) {
        if let Some(marker) = &self.settings.first_run_marker {
            if let Err(e) = fs::remove_file(marker) {
                log::error!("cannot remove first-run marker {}: {}", marker.display(), e);
            }
        }
    }
}
