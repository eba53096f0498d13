//! Port traits

mod ports;

pub use ports::{ExportSink, LookupResult, MemberPlatform, RecordStore, RepoResult};
