use omnisora_core::{
    Digests, FileHandle, ShortId, StorageReceipt, StorageTarget, UploadAuthorization,
    UploadError, UploadResult,
};
use uuid::Uuid;

/// Everything one in-flight upload carries between steps.
///
/// Owned by the orchestrator's upload future and dropped with it, so nothing here
/// outlives the attempt, whether it succeeds, fails or is cancelled.
#[derive(Debug)]
pub struct UploadAttempt {
    pub id: Uuid,
    pub file: FileHandle,
    pub description: String,
    pub digests: Option<Digests>,
    /// Taken by value when the transfer starts; never handed out twice.
    pub authorization: Option<UploadAuthorization>,
    pub target: Option<StorageTarget>,
    pub receipt: Option<StorageReceipt>,
}

impl UploadAttempt {
    pub fn new(file: FileHandle, description: String) -> UploadResult<Self> {
        if file.name().trim().is_empty() {
            return Err(UploadError::InvalidInput(
                "File name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            file,
            description,
            digests: None,
            authorization: None,
            target: None,
            receipt: None,
        })
    }

    pub fn short_id(&self) -> Option<ShortId> {
        self.digests.as_ref().map(Digests::short_id)
    }

    /// Store a fresh authorization, remembering where it writes to.
    pub fn authorize(&mut self, authorization: UploadAuthorization) {
        self.target = Some(authorization.target());
        self.authorization = Some(authorization);
    }

    pub fn take_authorization(&mut self) -> UploadResult<UploadAuthorization> {
        self.authorization.take().ok_or_else(|| {
            UploadError::InvalidInput("No upload authorization for this attempt".to_string())
        })
    }
}
