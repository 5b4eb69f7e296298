//! Facade crate for the stop delta engine.
//!
//! This crate re-exports the core domain types and the entry points of each
//! delta stage, so callers can depend on a single crate.

#![forbid(unsafe_code)]

pub use stopdelta_core::{
    CoordKey, InterchangeCode, InterchangeRecord, LedgerEntry, NameIndexEntry, ParseOutcome,
    ReciprocalEntry, ReferenceEntry, SkipReason, SkipTally, StationId, StopCandidate, Territory,
    TransferPair, Unbounded, haversine_distance,
};

pub use stopdelta_data::{
    AllocationError, AllocationReport, CandidateError, ChangeStatus, CleanReport, DeltaLayout,
    DeltaReport, DeltaSettings, FileError, IdentifierAllocator, MergeReport, NameDeltaReport,
    PipelineError, ProviderFeed, ProviderSource, ReferenceBaseline, RelationTable,
    SpatialDeduplicator, TransferReport, build_interchange_table, build_relations, changed,
    merge_candidates, run_delta, run_transfers, write_names,
};
