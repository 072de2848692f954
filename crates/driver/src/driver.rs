//! The storage driver façade.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chunkdrive_client::Client;
use chunkdrive_protocol::types::{CopyFileRequest, CreateFileRequest, FileKind};

use crate::config::DriverConfig;
use crate::object::Object;
use crate::plan::UploadPlan;
use crate::upload::{ProgressFn, upload_parts};
use crate::{DriverError, mime};

/// A size-known, read-once byte source for [`Driver::put`].
///
/// `size` is a declared total: the reader must yield exactly that many
/// bytes, or the upload fails with a truncated-stream error. When
/// `modified` is `None`, the commit is stamped with the current time.
pub struct PutSource<R> {
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub reader: R,
}

/// Client-side driver for one remote drive account.
///
/// Construction bootstraps the session and resolves the root folder;
/// a bootstrap failure is fatal and the caller must build a new
/// instance. All methods borrow `&self` and are safe to call
/// concurrently — the only shared state is the HTTP connection pool.
#[derive(Debug)]
pub struct Driver {
    client: Client,
    config: DriverConfig,
    user_id: i64,
    root_id: String,
}

impl Driver {
    /// Validates `config`, exchanges the credential for a user identity,
    /// and resolves the root folder.
    pub async fn new(config: DriverConfig) -> Result<Self, DriverError> {
        config.validate()?;

        let client = Client::new(&config.address, config.upload_host(), config.token())?;

        let session = client.session().await?;
        if session.user_id == 0 {
            return Err(DriverError::Remote(chunkdrive_client::Error::Auth(
                "invalid session".into(),
            )));
        }

        let root = client.find_root().await?;
        info!(user_id = session.user_id, root_id = %root.id, "driver initialized");

        Ok(Self {
            client,
            config,
            user_id: session.user_id,
            root_id: root.id,
        })
    }

    /// Id of the account's root folder.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// Lists the contents of a folder (single page, sorted by id).
    pub async fn list(&self, parent_id: &str) -> Result<Vec<Object>, DriverError> {
        let items = self.client.list(parent_id).await?;
        Ok(items.into_iter().map(Object::from).collect())
    }

    /// Creates a folder under `parent_id`.
    pub async fn make_dir(&self, parent_id: &str, name: &str) -> Result<Object, DriverError> {
        let info = self.client.create_folder(parent_id, name).await?;
        Ok(info.into())
    }

    /// Renames an object; the returned object is the source under its
    /// new name.
    pub async fn rename(&self, src: &Object, new_name: &str) -> Result<Object, DriverError> {
        self.client.rename(src.id(), new_name).await?;
        Ok(src.with_name(new_name))
    }

    /// Moves an object into the `dest_id` folder.
    pub async fn move_to(&self, src: &Object, dest_id: &str) -> Result<Object, DriverError> {
        self.client
            .move_files(dest_id, &[src.id().to_string()])
            .await?;
        Ok(src.clone())
    }

    /// Server-side copy of an object into the `dest_id` folder.
    pub async fn copy_to(&self, src: &Object, dest_id: &str) -> Result<Object, DriverError> {
        let req = CopyFileRequest {
            new_name: src.name().to_string(),
            destination: dest_id.to_string(),
            modified: src.modified(),
        };
        let info = self.client.copy_file(src.id(), &req).await?;
        Ok(info.into())
    }

    /// Deletes an object.
    pub async fn remove(&self, obj: &Object) -> Result<(), DriverError> {
        self.client.delete_files(&[obj.id().to_string()]).await?;
        Ok(())
    }

    /// Download URL for an object; no request is performed.
    ///
    /// Encrypted content has to stream back through the service, so the
    /// direct-download flag is only set for plaintext files.
    pub fn link(&self, obj: &Object) -> String {
        self.client
            .download_link(obj.id(), obj.name(), !self.config.encrypt_files)
    }

    /// Uploads `source` into the `dest_id` folder as one logical file.
    ///
    /// The source is chunked per the configured chunk size, every chunk
    /// is uploaded under a deterministic session id, and the file is
    /// committed only once all parts are acknowledged — a failure at any
    /// point leaves no visible object. An empty source commits directly
    /// with no parts.
    ///
    /// `progress` receives cumulative percentages in `[0, 100]`;
    /// `cancel` aborts the upload without committing.
    pub async fn put<R>(
        &self,
        dest_id: &str,
        source: PutSource<R>,
        progress: Option<&ProgressFn>,
        cancel: &CancellationToken,
    ) -> Result<Object, DriverError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let plan = Arc::new(UploadPlan::new(
            dest_id,
            &source.name,
            source.size,
            self.config.chunk_size_bytes(),
            self.config.channel_id,
            self.config.encrypt_files,
            self.user_id,
        ));
        debug!(
            upload_id = %plan.upload_id,
            total_chunks = plan.total_chunks,
            size = plan.size,
            "upload planned"
        );

        let mut reader = source.reader;
        let parts = if plan.size > 0 {
            upload_parts(
                &self.client,
                &plan,
                &mut reader,
                self.config.concurrency(),
                progress,
                cancel,
            )
            .await?
        } else {
            Vec::new()
        };
        debug_assert_eq!(parts.len() as u64, plan.total_chunks);

        // A cancellation that lands after the last chunk must still win
        // over the commit.
        if cancel.is_cancelled() {
            return Err(DriverError::Cancelled);
        }

        let req = CreateFileRequest {
            name: plan.file_name.clone(),
            kind: FileKind::File,
            path: String::new(),
            mime_type: mime::from_file_name(&plan.file_name).to_string(),
            size: plan.size as i64,
            channel_id: plan.channel_id,
            encrypted: plan.encrypted,
            parts,
            parent_id: plan.dest_id.clone(),
            modified: Some(source.modified.unwrap_or_else(Utc::now)),
        };
        let info = self.client.create_file(&req).await?;
        info!(id = %info.id, name = %info.name, size = plan.size, "file committed");

        // The file exists now; leftover session state is server-side
        // garbage and must never fail the upload.
        if plan.size > 0
            && let Err(e) = self.client.cleanup_upload(&plan.upload_id).await
        {
            warn!(upload_id = %plan.upload_id, error = %e, "upload cleanup failed");
        }

        Ok(info.into())
    }
}
