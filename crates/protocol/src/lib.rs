//! Wire types and constants for the chunkdrive remote API.
//!
//! The remote drive speaks JSON with camelCase keys and omits empty
//! optional fields. Every struct here mirrors one request or response
//! body of that API; nothing in this crate performs I/O.

pub mod constants;
pub mod types;

// Re-export primary types for convenience.
pub use types::{
    CopyFileRequest, CreateFileRequest, DeleteFilesRequest, FileInfo, FileKind, FileList,
    FilePart, ListMeta, MoveFilesRequest, Session, UpdateFileRequest, UploadedPart,
};
