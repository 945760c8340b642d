//! Stats module - fuzzer_stats snapshots and their aggregation

mod snapshot;

pub use snapshot::{load_snapshots, read_snapshot, summarize, FuzzerSnapshot, SnapshotSummary};
