//! Storage driver for a chunk-addressed remote drive.
//!
//! Exposes the remote store through a uniform file-storage surface:
//! list, put, make_dir, rename, move, copy, remove, link. The heart of
//! the crate is the upload path — an arbitrarily large, size-known byte
//! stream is split into fixed-size parts, each part is uploaded under a
//! deterministic session id, and the assembled part list is committed as
//! one logical file only after every part succeeded.
//!
//! # Upload pipeline
//!
//! 1. **Plan** — compute the session id and chunk boundaries ([`plan`])
//! 2. **Transfer** — read chunks in order, upload with bounded
//!    concurrency (internal `upload` module)
//! 3. **Commit** — create the file from the ordered part list, then
//!    best-effort cleanup of the upload session ([`Driver::put`])

pub mod config;
pub mod driver;
mod mime;
pub mod object;
pub mod plan;
mod upload;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export primary types for convenience.
pub use config::DriverConfig;
pub use driver::{Driver, PutSource};
pub use object::Object;
pub use plan::UploadPlan;
pub use upload::ProgressFn;

/// Errors produced by the storage driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("remote error: {0}")]
    Remote(#[from] chunkdrive_client::Error),

    #[error("source stream ended early: chunk {part_no} needed {expected} bytes")]
    TruncatedStream { part_no: u64, expected: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("cancelled")]
    Cancelled,
}
