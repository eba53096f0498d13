//! Export scheduler
//!
//! Writes the projection to the export sink. Requests are coalesced: each
//! one restarts a single debounce timer, and the export runs when the timer
//! finally fires. A periodic export runs regardless, so a missed request
//! is never permanent.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use roster_common::ScheduleConfig;
use roster_core::{roster_order, DomainError, ExportRow, ExportSink};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::projection::RosterProjection;
use super::shutdown::ShutdownSignal;

/// Timing knobs for exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSettings {
    pub debounce: Duration,
    pub interval: Duration,
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self::from(&ScheduleConfig::default())
    }
}

impl From<&ScheduleConfig> for ExportSettings {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            debounce: config.export_debounce,
            interval: config.export_interval,
            attempts: config.export_attempts.max(1),
            backoff: config.export_backoff,
        }
    }
}

pub struct ExportScheduler {
    projection: Arc<RosterProjection>,
    sink: Arc<dyn ExportSink>,
    shutdown: ShutdownSignal,
    settings: ExportSettings,
    requested: Notify,
    last_export: Mutex<Option<DateTime<Utc>>>,
}

impl ExportScheduler {
    pub fn new(
        projection: Arc<RosterProjection>,
        sink: Arc<dyn ExportSink>,
        shutdown: ShutdownSignal,
        settings: ExportSettings,
    ) -> Self {
        Self {
            projection,
            sink,
            shutdown,
            settings,
            requested: Notify::new(),
            last_export: Mutex::new(None),
        }
    }

    /// Ask for an export; bursts collapse into one write
    pub fn request_export(&self) {
        self.requested.notify_one();
    }

    /// Time of the last successful export
    pub fn last_export(&self) -> Option<DateTime<Utc>> {
        *self.last_export.lock()
    }

    /// Current projection as sorted export rows
    pub fn snapshot(&self) -> Vec<ExportRow> {
        let mut views = self.projection.all();
        views.sort_by(roster_order);
        views.iter().map(ExportRow::from).collect()
    }

    /// Write one snapshot to the sink, returning the number of rows
    #[instrument(skip(self))]
    pub async fn export_once(&self) -> Result<usize, DomainError> {
        let rows = self.snapshot();
        self.sink.replace_all(&rows).await?;
        *self.last_export.lock() = Some(Utc::now());
        Ok(rows.len())
    }

    /// Export with retries; returns whether a write succeeded
    pub async fn export_with_retry(&self) -> bool {
        let attempts = self.settings.attempts;
        for attempt in 1..=attempts {
            if self.shutdown.is_shutting_down() {
                info!("Skipping export during shutdown");
                return false;
            }

            match self.export_once().await {
                Ok(rows) => {
                    info!(rows, attempt, "Roster exported");
                    return true;
                }
                Err(e) if attempt < attempts => {
                    warn!(error = %e, attempt, "Export failed, retrying");
                    tokio::select! {
                        () = sleep(self.settings.backoff) => {}
                        () = self.shutdown.wait() => {
                            info!("Skipping export retry during shutdown");
                            return false;
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, attempts, "Export failed, deferring to the next trigger");
                }
            }
        }
        false
    }

    /// Spawn the scheduling loop; it ends when shutdown is triggered
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run().await })
    }

    async fn run(&self) {
        info!(
            debounce_secs = self.settings.debounce.as_secs(),
            interval_secs = self.settings.interval.as_secs(),
            "Export scheduler started"
        );

        let mut periodic = interval_at(
            Instant::now() + self.settings.interval,
            self.settings.interval,
        );
        periodic.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let debounce = sleep(self.settings.debounce);
        tokio::pin!(debounce);
        let mut pending = false;

        loop {
            tokio::select! {
                () = self.shutdown.wait() => {
                    if pending {
                        info!("Dropping pending export for shutdown");
                    }
                    break;
                }
                () = self.requested.notified() => {
                    debounce.as_mut().reset(Instant::now() + self.settings.debounce);
                    pending = true;
                    debug!("Export requested, debounce restarted");
                }
                () = &mut debounce, if pending => {
                    pending = false;
                    self.export_with_retry().await;
                }
                _ = periodic.tick() => {
                    debug!("Periodic export");
                    self.export_with_retry().await;
                }
            }
        }

        info!("Export scheduler stopped");
    }
}

impl std::fmt::Debug for ExportScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportScheduler")
            .field("settings", &self.settings)
            .field("last_export", &self.last_export())
            .finish()
    }
}
