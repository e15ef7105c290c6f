// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod commit;
pub mod outcome;
pub mod status;

pub use commit::CommitRecord;
pub use outcome::{InitOutcome, PullOutcome, PushOutcome};
pub use status::{ErrorRecord, StatusReport, StatusSnapshot};
