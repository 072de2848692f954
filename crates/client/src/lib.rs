//! Async HTTP client for the chunkdrive remote API.
//!
//! Stateless request/response plumbing: session bootstrap, metadata
//! operations, raw part uploads, and download-link construction. Every
//! operation is a single round trip; retry policy, if any, belongs to a
//! layer above this crate.

pub mod client;

pub use client::{Client, Error, PartUploadRequest};
