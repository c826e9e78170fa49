use chrono::Datelike;
use std::sync::Arc;

use crate::dak::Dak;
use crate::error::Result;
use crate::resolver::SourceResolver;
use crate::storage::StagingGround;
use crate::types::{
    DakDocument, DakMetadata, DakStatus, MetadataPatch, Publisher, RepositoryContext,
};

/// Whether a DAK came from an existing staged document or was freshly
/// initialized with defaults because none existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DakOrigin {
    Loaded,
    Initialized,
}

/// The only place that constructs [`Dak`] aggregates. Carries the resolver
/// and staging-ground collaborators explicitly; one factory per session.
pub struct DakFactory {
    resolver: Arc<SourceResolver>,
    staging: Arc<dyn StagingGround>,
}

impl DakFactory {
    pub fn new(resolver: Arc<SourceResolver>, staging: Arc<dyn StagingGround>) -> Self {
        Self { resolver, staging }
    }

    /// Load the staged `dak.json` for the repository and build the aggregate
    /// from it. An absent document is not an error: the DAK is initialized
    /// with defaults and the returned origin says so.
    pub async fn create_from_repository(
        &self,
        repository: RepositoryContext,
    ) -> Result<(Dak, DakOrigin)> {
        match self.staging.load_document().await? {
            Some(document) => {
                tracing::info!(repository = %repository, dak = %document.metadata.id, "loaded dak.json");
                let dak = self.build(document, repository).await;
                Ok((dak, DakOrigin::Loaded))
            }
            None => {
                tracing::info!(repository = %repository, "no dak.json found, initializing defaults");
                let document = default_document(&repository, MetadataPatch::default());
                let dak = self.build(document, repository).await;
                Ok((dak, DakOrigin::Initialized))
            }
        }
    }

    /// Build directly from an already-fetched document. No I/O.
    pub async fn create_from_dak_json(
        &self,
        document: DakDocument,
        repository: RepositoryContext,
    ) -> Dak {
        self.build(document, repository).await
    }

    /// Build a minimal valid DAK from repository identity plus overrides.
    pub async fn create_empty(
        &self,
        repository: RepositoryContext,
        overrides: MetadataPatch,
    ) -> Dak {
        let document = default_document(&repository, overrides);
        self.build(document, repository).await
    }

    async fn build(&self, document: DakDocument, repository: RepositoryContext) -> Dak {
        Dak::new(
            document,
            repository,
            self.resolver.clone(),
            self.staging.clone(),
        )
        .await
    }
}

fn default_document(repository: &RepositoryContext, overrides: MetadataPatch) -> DakDocument {
    let mut metadata = DakMetadata {
        id: format!("{}.{}", repository.owner, repository.repo),
        name: Some(repository.repo.clone()),
        title: Some(repository.repo.clone()),
        version: Some("0.1.0".to_string()),
        status: DakStatus::Draft,
        license: Some("CC-BY-4.0".to_string()),
        copyright_year: Some(chrono::Utc::now().year().to_string()),
        publisher: Some(Publisher {
            name: Some(repository.owner.clone()),
            url: None,
        }),
        ..Default::default()
    };
    metadata.merge(overrides);
    DakDocument::new(metadata)
}
