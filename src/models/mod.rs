//! Shared types used across all modules.
//!
//! Stages, providers and the orchestrator import the snapshot, result and
//! role types from here rather than reaching into each other's internals.

pub mod result;
pub mod role;
pub mod snapshot;

pub use result::{CommentScore, ContributorRecord, ScoredComment, ScoringResult};
pub use role::{AtomicRole, CommentType};
pub use snapshot::{ActivitySnapshot, RawComment};
