use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::StagingGround;
use crate::types::{ComponentType, DakDocument, MetadataPatch, SourceDescriptor};

/// Shared projection of the whole DAK plus the staging-ground handle.
///
/// Every component mutation writes its new source array here and then
/// persists the full document, so the staged `dak.json` always reflects the
/// latest in-memory state. One full rewrite per mutation, no batching.
pub(crate) struct DocumentSync {
    document: RwLock<DakDocument>,
    staging: Arc<dyn StagingGround>,
}

impl DocumentSync {
    pub(crate) fn new(document: DakDocument, staging: Arc<dyn StagingGround>) -> Self {
        Self {
            document: RwLock::new(document),
            staging,
        }
    }

    pub(crate) async fn update_component(
        &self,
        component_type: ComponentType,
        sources: Vec<SourceDescriptor>,
    ) -> Result<()> {
        {
            let mut document = self.document.write().await;
            document.set_sources(component_type, sources);
        }
        self.save().await
    }

    pub(crate) async fn update_metadata(&self, patch: MetadataPatch) -> Result<()> {
        {
            let mut document = self.document.write().await;
            document.metadata.merge(patch);
        }
        self.save().await
    }

    pub(crate) async fn save(&self) -> Result<()> {
        let document = self.document.read().await.clone();
        tracing::debug!(dak = %document.metadata.id, "persisting dak.json");
        self.staging.save_document(&document).await
    }

    pub(crate) async fn snapshot(&self) -> DakDocument {
        self.document.read().await.clone()
    }
}

impl std::fmt::Debug for DocumentSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSync").finish_non_exhaustive()
    }
}
