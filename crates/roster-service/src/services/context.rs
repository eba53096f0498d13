//! Service context - dependency container for services
//!
//! Holds the community layout, the port implementations, and the engine
//! components built on top of them. Everything is shared behind `Arc`, so
//! cloning a context is cheap.

use std::sync::Arc;

use roster_common::ScheduleConfig;
use roster_core::{ExportSink, MemberPlatform, RecordStore, RosterLayout};

use super::conversation_index::ConversationIndex;
use super::error::{ServiceError, ServiceResult};
use super::exporter::{ExportScheduler, ExportSettings};
use super::projection::RosterProjection;
use super::records::RecordAdapter;
use super::shutdown::ShutdownSignal;
use super::sync::SyncScheduler;

/// Service context containing all dependencies
///
/// Provides access to:
/// - The community layout
/// - The record store adapter and the member platform
/// - The conversation index and roster projection
/// - The export and sync schedulers
/// - The shutdown signal
#[derive(Clone)]
pub struct ServiceContext {
    layout: Arc<RosterLayout>,
    platform: Arc<dyn MemberPlatform>,
    records: RecordAdapter,
    index: Arc<ConversationIndex>,
    projection: Arc<RosterProjection>,
    exporter: Arc<ExportScheduler>,
    sync: Arc<SyncScheduler>,
    shutdown: ShutdownSignal,
}

impl ServiceContext {
    /// Wire the engine components on top of the given ports
    pub fn new(
        layout: Arc<RosterLayout>,
        record_store: Arc<dyn RecordStore>,
        platform: Arc<dyn MemberPlatform>,
        sink: Arc<dyn ExportSink>,
        schedule: &ScheduleConfig,
        shutdown: ShutdownSignal,
    ) -> Self {
        let records = RecordAdapter::new(record_store, shutdown.clone())
            .with_chunk_size(schedule.store_chunk_size);
        let index = Arc::new(ConversationIndex::new());
        let projection = Arc::new(RosterProjection::new(
            records.clone(),
            platform.clone(),
            index.clone(),
            layout.clone(),
        ));
        let exporter = Arc::new(ExportScheduler::new(
            projection.clone(),
            sink,
            shutdown.clone(),
            ExportSettings::from(schedule),
        ));
        let sync = Arc::new(SyncScheduler::new(
            layout.clone(),
            platform.clone(),
            records.clone(),
            index.clone(),
            projection.clone(),
            exporter.clone(),
            shutdown.clone(),
            schedule.sync_interval,
        ));

        Self {
            layout,
            platform,
            records,
            index,
            projection,
            exporter,
            sync,
            shutdown,
        }
    }

    // === Configuration ===

    pub fn layout(&self) -> &RosterLayout {
        self.layout.as_ref()
    }

    // === Ports ===

    /// Get the member platform
    pub fn platform(&self) -> &dyn MemberPlatform {
        self.platform.as_ref()
    }

    /// Get the record store adapter
    pub fn records(&self) -> &RecordAdapter {
        &self.records
    }

    // === Engine ===

    pub fn index(&self) -> &ConversationIndex {
        self.index.as_ref()
    }

    pub fn projection(&self) -> &RosterProjection {
        self.projection.as_ref()
    }

    /// Get the export scheduler (shared handle, for `start`)
    pub fn exporter(&self) -> &Arc<ExportScheduler> {
        &self.exporter
    }

    /// Get the sync scheduler (shared handle, for `start`)
    pub fn sync(&self) -> &Arc<SyncScheduler> {
        &self.sync
    }

    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("community_id", &self.layout.community_id)
            .field("records", &self.records)
            .field("projection", &self.projection)
            .field("index", &self.index.len())
            .field("shutdown", &self.shutdown)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    layout: Option<Arc<RosterLayout>>,
    record_store: Option<Arc<dyn RecordStore>>,
    platform: Option<Arc<dyn MemberPlatform>>,
    sink: Option<Arc<dyn ExportSink>>,
    schedule: ScheduleConfig,
    shutdown: Option<ShutdownSignal>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            layout: None,
            record_store: None,
            platform: None,
            sink: None,
            schedule: ScheduleConfig::default(),
            shutdown: None,
        }
    }

    pub fn layout(mut self, layout: RosterLayout) -> Self {
        self.layout = Some(Arc::new(layout));
        self
    }

    pub fn record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.record_store = Some(store);
        self
    }

    pub fn platform(mut self, platform: Arc<dyn MemberPlatform>) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn sink(mut self, sink: Arc<dyn ExportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn schedule(mut self, schedule: ScheduleConfig) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    /// or the layout is invalid
    pub fn build(self) -> ServiceResult<ServiceContext> {
        let layout = self
            .layout
            .ok_or_else(|| ServiceError::validation("layout is required"))?;
        layout.validate()?;

        Ok(ServiceContext::new(
            layout,
            self.record_store
                .ok_or_else(|| ServiceError::validation("record_store is required"))?,
            self.platform
                .ok_or_else(|| ServiceError::validation("platform is required"))?,
            self.sink
                .ok_or_else(|| ServiceError::validation("sink is required"))?,
            &self.schedule,
            self.shutdown.unwrap_or_default(),
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
