//! Upload planning: session id and chunk boundaries.

use md5::{Digest, Md5};

/// Fixed layout of one upload.
///
/// Everything here is computed once per put and never recomputed. The
/// upload id is a stable fingerprint of the logical target
/// `(destination, file name, size, user)`, so a retried or concurrent
/// upload of the same target lands on the same server-side session and
/// the remote service reconciles the duplicates. Two *different* sources
/// sharing destination, name and size collide on the id by construction;
/// disambiguating that is the remote service's concern, not this
/// client's.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPlan {
    pub upload_id: String,
    pub dest_id: String,
    pub file_name: String,
    /// Declared source length in bytes.
    pub size: u64,
    /// Chunk size in bytes; validated against bounds at configuration
    /// time.
    pub chunk_size: u64,
    /// `ceil(size / chunk_size)`; zero for an empty file.
    pub total_chunks: u64,
    pub channel_id: i64,
    pub encrypted: bool,
}

impl UploadPlan {
    /// Plans an upload. Pure computation, no I/O.
    pub fn new(
        dest_id: &str,
        file_name: &str,
        size: u64,
        chunk_size: u64,
        channel_id: i64,
        encrypted: bool,
        user_id: i64,
    ) -> Self {
        Self {
            upload_id: fingerprint(dest_id, file_name, size, user_id),
            dest_id: dest_id.to_string(),
            file_name: file_name.to_string(),
            size,
            chunk_size,
            total_chunks: size.div_ceil(chunk_size),
            channel_id,
            encrypted,
        }
    }

    /// Byte length of 1-indexed chunk `part_no`: the full chunk size for
    /// all but the last chunk, which takes the remainder.
    pub fn chunk_len(&self, part_no: u64) -> u64 {
        debug_assert!(part_no >= 1 && part_no <= self.total_chunks);
        if part_no == self.total_chunks {
            self.size - self.chunk_size * (self.total_chunks - 1)
        } else {
            self.chunk_size
        }
    }

    /// Remote name of chunk `part_no`. Single-chunk uploads keep the
    /// bare file name.
    pub fn part_name(&self, part_no: u64) -> String {
        if self.total_chunks > 1 {
            format!("{}.part.{:03}", self.file_name, part_no)
        } else {
            self.file_name.clone()
        }
    }
}

/// Stable fingerprint of the logical upload target.
fn fingerprint(dest_id: &str, file_name: &str, size: u64, user_id: i64) -> String {
    let mut hasher = Md5::new();
    hasher.update(format!("{dest_id}:{file_name}:{size}:{user_id}").as_bytes());
    hex::encode(hasher.finalize())
}
