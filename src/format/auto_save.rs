//! Auto-save scheduling with debouncing.
//!
//! Tracks when the annotation collection last changed and decides when a
//! save should run, batching rapid edits behind a configurable debounce
//! delay and a minimum interval between saves.

use std::time::Duration;
use web_time::Instant;

/// Schedules auto-saves for the annotation collection.
///
/// Two mechanisms prevent excessive saves:
/// 1. **Debounce delay**: after a change, wait for this duration before
///    saving so that rapid edits are batched together.
/// 2. **Minimum interval**: enforce a minimum time between saves even if
///    changes keep occurring.
///
/// At most one save is pending at a time. Scheduling while a save is
/// already pending restarts the debounce timer.
#[derive(Debug)]
pub struct AutoSave {
    /// Minimum interval between saves.
    save_interval: Duration,

    /// Debounce delay (wait this long after the last change before saving).
    debounce_delay: Duration,

    /// Time of last completed save attempt.
    last_save: Option<Instant>,

    /// Time of the change that armed the pending save, if any.
    pending_since: Option<Instant>,

    /// Whether auto-save is enabled.
    enabled: bool,
}

impl AutoSave {
    /// Default minimum interval between saves (60 seconds).
    pub const DEFAULT_SAVE_INTERVAL: Duration = Duration::from_secs(60);

    /// Default debounce delay (5 seconds).
    pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_secs(5);

    /// Create a new auto-save scheduler with default settings.
    pub fn new() -> Self {
        Self {
            save_interval: Self::DEFAULT_SAVE_INTERVAL,
            debounce_delay: Self::DEFAULT_DEBOUNCE_DELAY,
            last_save: None,
            pending_since: None,
            enabled: true,
        }
    }

    /// Create a disabled auto-save scheduler.
    pub fn disabled() -> Self {
        let mut saver = Self::new();
        saver.enabled = false;
        saver
    }

    /// Set the minimum interval between saves.
    pub fn with_save_interval(mut self, interval: Duration) -> Self {
        self.save_interval = interval;
        self
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    /// Arm a save after the debounce delay.
    ///
    /// Restarts the debounce timer if a save is already pending, so a burst
    /// of edits results in a single save once the burst settles. Does
    /// nothing when auto-save is disabled.
    pub fn schedule(&mut self) {
        if !self.enabled {
            return;
        }
        self.pending_since = Some(Instant::now());
        log::trace!("Auto-save: save scheduled");
    }

    /// Check whether a save is currently pending.
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Check if a scheduled save should run now.
    ///
    /// Returns true if:
    /// - Auto-save is enabled
    /// - A save is pending
    /// - The debounce delay has passed since the save was scheduled
    /// - The minimum save interval has passed since the last save
    pub fn due(&self) -> bool {
        if !self.enabled {
            return false;
        }

        let Some(pending_since) = self.pending_since else {
            return false;
        };

        // Check debounce delay
        if pending_since.elapsed() < self.debounce_delay {
            return false;
        }

        // Check minimum interval (if we've saved before)
        if let Some(last_save) = self.last_save {
            if last_save.elapsed() < self.save_interval {
                return false;
            }
        }

        true
    }

    /// Mark that a save completed successfully.
    pub fn mark_saved(&mut self) {
        self.last_save = Some(Instant::now());
        self.pending_since = None;
        log::trace!("Auto-save: marked saved");
    }

    /// Mark that a save failed.
    ///
    /// The pending save stays armed so the collection is retried after the
    /// save interval passes again.
    pub fn mark_save_failed(&mut self) {
        // Update last_save to prevent immediate retry
        self.last_save = Some(Instant::now());
        log::trace!("Auto-save: marked save failed");
    }

    /// Cancel the pending save, if any.
    pub fn cancel(&mut self) {
        if self.pending_since.take().is_some() {
            log::debug!("Auto-save: pending save cancelled");
        }
    }

    /// Set whether auto-save is enabled.
    ///
    /// Disabling cancels any pending save.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending_since = None;
        }
        log::debug!("Auto-save: enabled = {}", enabled);
    }

    /// Check if auto-save is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get time since the last save attempt (if any).
    pub fn time_since_last_save(&self) -> Option<Duration> {
        self.last_save.map(|t| t.elapsed())
    }
}

impl Default for AutoSave {
    fn default() -> Self {
        Self::new()
    }
}
