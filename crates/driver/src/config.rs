//! Driver configuration.

use serde::{Deserialize, Serialize};

use chunkdrive_protocol::constants::{
    ACCESS_TOKEN_PREFIX, DEFAULT_CHUNK_SIZE_MIB, DEFAULT_UPLOAD_CONCURRENCY, MAX_CHUNK_SIZE_MIB,
    MIB, MIN_CHUNK_SIZE_MIB,
};

use crate::DriverError;

/// Configuration for one driver instance.
///
/// Zero values for `chunk_size` and `upload_concurrency` fall back to
/// the defaults; everything else is taken literally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Remote drive API host URL.
    pub address: String,
    /// Cookie credential, `access_token=<token>`.
    pub cookie: String,
    /// Upload chunk size in MiB.
    pub chunk_size: u64,
    /// Part uploads in flight at once per put.
    pub upload_concurrency: usize,
    /// Channel the remote service stores parts in.
    pub channel_id: i64,
    /// Ask the remote service to encrypt file contents at rest.
    pub encrypt_files: bool,
    /// Separate host for part uploads (empty = use `address`).
    pub upload_host: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            cookie: String::new(),
            chunk_size: DEFAULT_CHUNK_SIZE_MIB,
            upload_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            channel_id: 0,
            encrypt_files: false,
            upload_host: String::new(),
        }
    }
}

impl DriverConfig {
    /// Checks the invariants that hold for the lifetime of a driver
    /// instance. Chunk-size bounds are enforced here, once — never per
    /// upload.
    pub fn validate(&self) -> Result<(), DriverError> {
        if !self.cookie.starts_with(ACCESS_TOKEN_PREFIX) {
            return Err(DriverError::Config(format!(
                "cookie must start with '{ACCESS_TOKEN_PREFIX}'"
            )));
        }

        let chunk = self.chunk_size_mib();
        if chunk < MIN_CHUNK_SIZE_MIB {
            return Err(DriverError::Config(format!(
                "chunk size must be at least {MIN_CHUNK_SIZE_MIB} MiB"
            )));
        }
        if chunk > MAX_CHUNK_SIZE_MIB {
            return Err(DriverError::Config(format!(
                "chunk size must be at most {MAX_CHUNK_SIZE_MIB} MiB"
            )));
        }

        Ok(())
    }

    fn chunk_size_mib(&self) -> u64 {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE_MIB
        } else {
            self.chunk_size
        }
    }

    /// Effective chunk size in bytes.
    pub fn chunk_size_bytes(&self) -> u64 {
        self.chunk_size_mib() * MIB
    }

    /// Effective part-upload concurrency (at least 1).
    pub fn concurrency(&self) -> usize {
        if self.upload_concurrency == 0 {
            DEFAULT_UPLOAD_CONCURRENCY
        } else {
            self.upload_concurrency
        }
    }

    /// The bare token behind the cookie prefix.
    pub fn token(&self) -> &str {
        self.cookie
            .strip_prefix(ACCESS_TOKEN_PREFIX)
            .unwrap_or_default()
    }

    /// The part-upload host, when configured separately.
    pub fn upload_host(&self) -> Option<&str> {
        if self.upload_host.is_empty() {
            None
        } else {
            Some(&self.upload_host)
        }
    }
}
