//! Roster engine services
//!
//! The reconciliation engine (record adapter, conversation index, deriver,
//! reconciler, projection), its schedulers, and the event and command
//! entry points built on top of it.

pub mod commands;
pub mod context;
pub mod conversation_index;
pub mod deriver;
pub mod error;
pub mod exporter;
pub mod ingest;
pub mod projection;
pub mod reconciler;
pub mod records;
pub mod shutdown;
pub mod sync;

pub use commands::CommandService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use conversation_index::ConversationIndex;
pub use deriver::{derive, Derived};
pub use error::{ServiceError, ServiceResult};
pub use exporter::{ExportScheduler, ExportSettings};
pub use ingest::{is_managed_role_only_change, IgnoreReason, IngestOutcome, IngestService};
pub use projection::{RecordLookup, RosterProjection, UpsertOutcome};
pub use reconciler::{plan, Reconciler, RoleDelta};
pub use records::{RecordAdapter, RecordBatch, DEFAULT_CHUNK_SIZE};
pub use shutdown::ShutdownSignal;
pub use sync::{SyncScheduler, SyncSummary};
