// file: src/repository/mod.rs
// description: Repository operations module exports
// reference: Internal module structure

pub mod handle;
pub mod publish;
pub mod remote;
pub mod status;
pub mod sync;

pub use handle::RepositoryHandle;
