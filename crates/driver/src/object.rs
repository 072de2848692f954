//! Caller-facing object model.

use chrono::{DateTime, Utc};

use chunkdrive_protocol::types::{FileInfo, FileKind};

/// A remote object as seen by driver callers.
///
/// Folder and file are closed variants sharing accessors, not a common
/// mutable record with a flag.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Folder {
        id: String,
        name: String,
        modified: Option<DateTime<Utc>>,
    },
    File {
        id: String,
        name: String,
        size: u64,
        modified: Option<DateTime<Utc>>,
    },
}

impl Object {
    pub fn id(&self) -> &str {
        match self {
            Object::Folder { id, .. } | Object::File { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Object::Folder { name, .. } | Object::File { name, .. } => name,
        }
    }

    /// Size in bytes; folders report zero.
    pub fn size(&self) -> u64 {
        match self {
            Object::Folder { .. } => 0,
            Object::File { size, .. } => *size,
        }
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        match self {
            Object::Folder { modified, .. } | Object::File { modified, .. } => *modified,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Object::Folder { .. })
    }

    /// The same object under a new name.
    pub fn with_name(&self, new_name: &str) -> Object {
        let mut obj = self.clone();
        match &mut obj {
            Object::Folder { name, .. } | Object::File { name, .. } => {
                *name = new_name.to_string();
            }
        }
        obj
    }
}

impl From<FileInfo> for Object {
    fn from(info: FileInfo) -> Self {
        match info.kind {
            FileKind::Folder => Object::Folder {
                id: info.id,
                name: info.name,
                modified: info.modified,
            },
            FileKind::File => Object::File {
                id: info.id,
                name: info.name,
                size: info.size.max(0) as u64,
                modified: info.modified,
            },
        }
    }
}
