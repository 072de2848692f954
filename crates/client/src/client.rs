//! Remote drive API client.
//!
//! Async HTTP client using `reqwest` with cookie-token authentication.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use tracing::debug;

use chunkdrive_protocol::constants::LIST_PAGE_LIMIT;
use chunkdrive_protocol::types::{
    CopyFileRequest, CreateFileRequest, DeleteFilesRequest, FileInfo, FileKind, FileList,
    MoveFilesRequest, Session, UpdateFileRequest, UploadedPart,
};

/// Errors from the remote drive client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("chunk {part_no} upload failed with status {status}: {body}")]
    ChunkUpload {
        part_no: u64,
        status: u16,
        body: String,
    },

    #[error("file commit failed with status {status}: {body}")]
    Commit { status: u16, body: String },
}

/// Identifies one chunk within an upload session for the part endpoint.
#[derive(Debug, Clone)]
pub struct PartUploadRequest<'a> {
    pub part_name: &'a str,
    pub file_name: &'a str,
    pub part_no: u64,
    pub channel_id: i64,
    pub encrypted: bool,
}

/// Remote drive API client.
///
/// Cheap to clone; the underlying connection pool is shared between
/// clones and is safe for concurrent use.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    upload_base: String,
}

impl Client {
    /// Creates a new client for `base_url`, authenticating every request
    /// with the given bare token (the `access_token=` prefix already
    /// stripped).
    ///
    /// Part uploads go to `upload_host` when set, so bulk traffic can be
    /// routed away from the metadata host.
    pub fn new(base_url: &str, upload_host: Option<&str>, token: &str) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("access_token={token}"))
                .map_err(|_| Error::Auth("token contains invalid characters".into()))?,
        );

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let upload_base = match upload_host {
            Some(host) if !host.is_empty() => host.trim_end_matches('/').to_string(),
            _ => base_url.clone(),
        };

        Ok(Self {
            http,
            base_url,
            upload_base,
        })
    }

    /// Base URL of the metadata API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Looks up the session behind the configured token.
    ///
    /// Any non-success status is an authentication failure; validity of
    /// the returned identity is for the caller to judge.
    pub async fn session(&self) -> Result<Session, Error> {
        let url = format!("{}/api/auth/session", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Auth(format!(
                "session lookup returned {status}: {body}"
            )));
        }
        let session: Session = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(session)
    }

    /// Resolves the root folder by name+type lookup.
    pub async fn find_root(&self) -> Result<FileInfo, Error> {
        let url = format!("{}/api/files", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("parentId", "nil"),
                ("operation", "find"),
                ("name", "root"),
                ("type", "folder"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "find root",
                status,
                body,
            });
        }
        let list: FileList = serde_json::from_slice(&resp.bytes().await?)?;
        list.items
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("root folder".into()))
    }

    /// Lists the contents of a folder.
    ///
    /// A single page of [`LIST_PAGE_LIMIT`] entries sorted by id; callers
    /// needing more must extend pagination.
    pub async fn list(&self, parent_id: &str) -> Result<Vec<FileInfo>, Error> {
        let url = format!("{}/api/files", self.base_url);
        let limit = LIST_PAGE_LIMIT.to_string();
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("parentId", parent_id),
                ("limit", limit.as_str()),
                ("sort", "id"),
                ("operation", "list"),
                ("page", "1"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "list files",
                status,
                body,
            });
        }
        let list: FileList = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(list.items)
    }

    /// Creates a folder under `parent_id`.
    pub async fn create_folder(&self, parent_id: &str, name: &str) -> Result<FileInfo, Error> {
        let req = CreateFileRequest {
            name: name.to_string(),
            kind: FileKind::Folder,
            path: String::new(),
            mime_type: String::new(),
            size: 0,
            channel_id: 0,
            encrypted: false,
            parts: Vec::new(),
            parent_id: parent_id.to_string(),
            modified: None,
        };
        let url = format!("{}/api/files", self.base_url);
        let resp = self.http.post(&url).json(&req).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "create folder",
                status,
                body,
            });
        }
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }

    /// Commits a fully uploaded part list as one logical file.
    pub async fn create_file(&self, req: &CreateFileRequest) -> Result<FileInfo, Error> {
        let url = format!("{}/api/files", self.base_url);
        let resp = self.http.post(&url).json(req).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Commit { status, body });
        }
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }

    /// Renames an object.
    pub async fn rename(&self, id: &str, new_name: &str) -> Result<(), Error> {
        let req = UpdateFileRequest {
            name: new_name.to_string(),
            modified: None,
        };
        let url = format!("{}/api/files/{id}", self.base_url);
        let resp = self.http.patch(&url).json(&req).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "rename file",
                status,
                body,
            });
        }
        Ok(())
    }

    /// Moves objects into the `destination` folder.
    pub async fn move_files(&self, destination: &str, ids: &[String]) -> Result<(), Error> {
        let req = MoveFilesRequest {
            destination: destination.to_string(),
            destination_name: String::new(),
            ids: ids.to_vec(),
        };
        let url = format!("{}/api/files/move", self.base_url);
        let resp = self.http.post(&url).json(&req).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "move files",
                status,
                body,
            });
        }
        Ok(())
    }

    /// Server-side copy of one object.
    pub async fn copy_file(&self, id: &str, req: &CopyFileRequest) -> Result<FileInfo, Error> {
        let url = format!("{}/api/files/{id}/copy", self.base_url);
        let resp = self.http.post(&url).json(req).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "copy file",
                status,
                body,
            });
        }
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }

    /// Deletes objects by id.
    pub async fn delete_files(&self, ids: &[String]) -> Result<(), Error> {
        let req = DeleteFilesRequest {
            source: String::new(),
            ids: ids.to_vec(),
        };
        let url = format!("{}/api/files/delete", self.base_url);
        let resp = self.http.post(&url).json(&req).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "delete files",
                status,
                body,
            });
        }
        Ok(())
    }

    /// Uploads one chunk's bytes to the part endpoint.
    pub async fn upload_part(
        &self,
        upload_id: &str,
        part: &PartUploadRequest<'_>,
        data: Vec<u8>,
    ) -> Result<UploadedPart, Error> {
        let url = format!("{}/api/uploads/{upload_id}", self.upload_base);
        debug!(
            upload_id,
            part_no = part.part_no,
            len = data.len(),
            "uploading part"
        );
        let query = [
            ("partName", part.part_name.to_string()),
            ("fileName", part.file_name.to_string()),
            ("partNo", part.part_no.to_string()),
            ("channelId", part.channel_id.to_string()),
            ("encrypted", part.encrypted.to_string()),
        ];
        let resp = self
            .http
            .post(&url)
            .query(&query)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::ChunkUpload {
                part_no: part.part_no,
                status,
                body,
            });
        }
        Ok(serde_json::from_slice(&resp.bytes().await?)?)
    }

    /// Discards the server-side state of an upload session.
    pub async fn cleanup_upload(&self, upload_id: &str) -> Result<(), Error> {
        let url = format!("{}/api/uploads/{upload_id}", self.upload_base);
        let resp = self.http.delete(&url).send().await?;
        if !resp.status().is_success() {
            let (status, body) = status_body(resp).await;
            return Err(Error::Api {
                operation: "cleanup upload",
                status,
                body,
            });
        }
        Ok(())
    }

    /// Builds the download URL for an object. No request is performed.
    pub fn download_link(&self, id: &str, name: &str, download: bool) -> String {
        let encoded = utf8_percent_encode(name, NON_ALPHANUMERIC).to_string();
        let mut url = format!("{}/api/files/{id}/{encoded}", self.base_url);
        if download {
            url.push_str("?download=1");
        }
        url
    }
}

/// Drains a failed response into its status code and body text.
async fn status_body(resp: reqwest::Response) -> (u16, String) {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    (status, body)
}
