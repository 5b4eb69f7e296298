//! File operations of the stop delta engine.
//!
//! Responsibilities:
//! - Detect changed provider feeds and filter their stops to the territory.
//! - Merge, clean and identify stops in the coordinate ledger.
//! - Project identified stops into the name index and derive the relation
//!   and interchange tables.
//!
//! Boundaries:
//! - Domain records and formatting live in `stopdelta-core`.
//! - Downloading feeds and packaging outputs happen elsewhere.
//!
//! Invariants:
//! - Published identifiers are never reassigned; every stage can be re-run
//!   without changing its output.
//! - Unparseable lines are skipped and counted, never fatal.

mod append;
pub mod allocate;
pub mod candidates;
pub mod change;
pub mod dedup;
mod error;
pub mod format;
pub mod ledger;
pub mod mirror;
pub mod names;
pub mod pipeline;
pub mod reference;
pub mod relations;

#[cfg(test)]
mod test_support;

pub use allocate::{AllocationError, AllocationReport, IdentifierAllocator, UsedIdentifiers};
pub use candidates::{CandidateError, CandidateSet, ProviderFeed, read_candidates, write_extract};
pub use change::{ChangeStatus, ContentDigest, changed, persist_if_changed};
pub use dedup::{CleanReport, NearDuplicate, SpatialDeduplicator};
pub use error::FileError;
pub use ledger::{Ledger, LedgerRecord, MergeReport, merge_candidates};
pub use mirror::{write_ledger_mirror, write_reference_mirror};
pub use names::{NameDeltaReport, write_names};
pub use pipeline::{
    DeltaLayout, DeltaReport, DeltaSettings, PipelineError, ProviderError, ProviderFailure,
    ProviderSource, TransferReport, run_delta, run_transfers,
};
pub use reference::ReferenceBaseline;
pub use relations::{
    InterchangeTable, RelationTable, build_interchange_table, build_relations,
    process_relation_file, relation_file_is_complete, relation_table_is_complete,
    write_interchange_table,
};
