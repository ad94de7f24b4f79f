//! Core domain types

pub mod embedding;
pub mod paper;
pub mod partition;

pub use embedding::Embedding;
pub use paper::{strip_version, CandidatePaper, ReferenceItem};
pub use partition::PartitionKey;
