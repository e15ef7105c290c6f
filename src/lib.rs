// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod repository;
pub mod tools;
pub mod utils;

pub use config::{AuthorConfig, Config, CredentialsConfig, RepositoryConfig};
pub use error::{Result, SyncError};
pub use models::{
    CommitRecord, ErrorRecord, InitOutcome, PullOutcome, PushOutcome, StatusReport,
    StatusSnapshot,
};
pub use repository::RepositoryHandle;
pub use utils::Validator;
