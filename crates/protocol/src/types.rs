//! Request and response bodies of the remote drive API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated session info returned by `GET /api/auth/session`.
///
/// A `user_id` of zero means the credential did not resolve to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub hash: String,
}

/// Whether a remote object is a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Folder,
    File,
}

/// Metadata of one remote object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub parent_id: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub total_pages: i64,
    #[serde(default)]
    pub current_page: i64,
}

/// Response envelope for `GET /api/files` (both `list` and `find`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileList {
    #[serde(default)]
    pub items: Vec<FileInfo>,
    #[serde(default)]
    pub meta: ListMeta,
}

/// Acknowledgment returned by the part-upload endpoint for one chunk.
///
/// `part_id` and `salt` are the only fields the final commit needs; the
/// rest echo the upload request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPart {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub part_id: i64,
    #[serde(default)]
    pub part_no: i64,
    #[serde(default)]
    pub total_parts: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub channel_id: i64,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(default)]
    pub salt: String,
}

/// One entry of the part list carried by a file-create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePart {
    pub id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub salt: String,
}

/// Body of `POST /api/files`.
///
/// Creates a folder (`kind = Folder`, most fields absent) or commits a
/// fully uploaded file (`kind = File`, carries the ordered part list).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub size: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub channel_id: i64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<FilePart>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_id: String,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modified: Option<DateTime<Utc>>,
}

/// Body of `POST /api/files/move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveFilesRequest {
    #[serde(rename = "destinationParent")]
    pub destination: String,
    #[serde(
        rename = "destinationName",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub destination_name: String,
    pub ids: Vec<String>,
}

/// Body of `PATCH /api/files/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modified: Option<DateTime<Utc>>,
}

/// Body of `POST /api/files/{id}/copy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFileRequest {
    pub new_name: String,
    pub destination: String,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub modified: Option<DateTime<Utc>>,
}

/// Body of `POST /api/files/delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFilesRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    pub ids: Vec<String>,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}
