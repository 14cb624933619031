use serde::{Deserialize, Serialize};

use crate::auth::{ActionKind, ResourceType};
use crate::clock::Clock;
use crate::domain::{Document, DocumentId, TenancyId, UserId};
use crate::error::EngineError;
use crate::notify::NotificationSink;
use crate::storage::EngineStore;

use super::{next_id, Engine};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub tenancy: TenancyId,
    pub name: String,
    pub storage_key: String,
}

impl<S, N, C> Engine<S, N, C>
where
    S: EngineStore + 'static,
    N: NotificationSink + 'static,
    C: Clock + 'static,
{
    pub fn upload_document(
        &self,
        principal_id: &UserId,
        input: NewDocument,
    ) -> Result<Document, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(&input.tenancy)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::Create, ResourceType::Document, &facts)?;

        if input.name.trim().is_empty() {
            return Err(EngineError::InvariantViolation(
                "a document requires a name".to_string(),
            ));
        }

        let document = Document {
            id: DocumentId(next_id("doc")),
            tenancy: input.tenancy,
            uploader: principal.user_id,
            name: input.name.trim().to_string(),
            storage_key: input.storage_key,
        };
        self.store()
            .insert_document(document)
            .map_err(|error| error.into_engine("document"))
    }

    pub fn get_document(
        &self,
        principal_id: &UserId,
        id: &DocumentId,
    ) -> Result<Document, EngineError> {
        let principal = self.principal(principal_id)?;
        let document = self
            .store()
            .document(id)
            .map_err(|error| error.into_engine("document"))?
            .ok_or_else(|| EngineError::NotFound("document does not exist".to_string()))?;

        let facts = self.evaluator().for_document(&principal, &document)?;
        self.require(&principal, ActionKind::Read, ResourceType::Document, &facts)?;
        Ok(document)
    }

    pub fn list_documents(
        &self,
        principal_id: &UserId,
        tenancy_id: &TenancyId,
    ) -> Result<Vec<Document>, EngineError> {
        let principal = self.principal(principal_id)?;
        let tenancy = self
            .store()
            .tenancy(tenancy_id)
            .map_err(|error| error.into_engine("tenancy"))?
            .ok_or_else(|| EngineError::NotFound("tenancy does not exist".to_string()))?;

        let facts = self.evaluator().for_tenancy(&principal, &tenancy)?;
        self.require(&principal, ActionKind::Read, ResourceType::Document, &facts)?;

        self.store()
            .documents_for_tenancy(tenancy_id)
            .map_err(|error| error.into_engine("documents"))
    }

    pub fn delete_document(
        &self,
        principal_id: &UserId,
        id: &DocumentId,
    ) -> Result<(), EngineError> {
        let principal = self.principal(principal_id)?;
        let document = self
            .store()
            .document(id)
            .map_err(|error| error.into_engine("document"))?
            .ok_or_else(|| EngineError::NotFound("document does not exist".to_string()))?;

        let facts = self.evaluator().for_document(&principal, &document)?;
        self.require(&principal, ActionKind::Delete, ResourceType::Document, &facts)?;

        self.store()
            .delete_document(id)
            .map_err(|error| error.into_engine("document"))
    }
}
