use serde::{Deserialize, Serialize};

use super::ids::{DocumentId, TenancyId, UserId};

/// Metadata for an uploaded file; the blob itself lives behind an external
/// storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub tenancy: TenancyId,
    pub uploader: UserId,
    pub name: String,
    pub storage_key: String,
}
