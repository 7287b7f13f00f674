use crate::error::ServerError;
use beacon_core::model::{FileId, StoredFile, UserId};
use beacon_core::time::unix_millis;
use bytes::Bytes;
use dashmap::DashMap;

const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// In-memory blob storage for files shared through chat.
pub struct FileStore {
    files: DashMap<FileId, StoredFile>,
}

impl FileStore {
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
        }
    }

    pub fn put(
        &self,
        name: String,
        content_type: String,
        data: Bytes,
        uploaded_by: UserId,
    ) -> Result<FileId, ServerError> {
        if data.is_empty() {
            return Err(ServerError::validation("file must not be empty"));
        }
        if data.len() > MAX_FILE_BYTES {
            return Err(ServerError::validation(format!(
                "file exceeds {MAX_FILE_BYTES} bytes"
            )));
        }

        let file = StoredFile {
            id: FileId::new(),
            name,
            content_type,
            data,
            uploaded_by,
            created_at: unix_millis(),
        };

        let id = file.id.clone();
        self.files.insert(id.clone(), file);
        Ok(id)
    }

    pub fn get(&self, file_id: &FileId) -> Option<StoredFile> {
        self.files.get(file_id).map(|f| f.clone())
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}
