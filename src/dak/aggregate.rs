use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::component::ComponentObject;
use crate::dak::sync::DocumentSync;
use crate::error::{DakError, Result};
use crate::resolver::SourceResolver;
use crate::storage::StagingGround;
use crate::types::{ComponentType, DakDocument, DakMetadata, MetadataPatch, RepositoryContext};

/// A Digital Adaptation Kit: DAK-level metadata plus exactly nine component
/// collections, one per [`ComponentType`]. All nine exist from construction,
/// even when empty.
///
/// Mutations go through the component objects (or [`Dak::update_metadata`]);
/// each one rewrites the staged `dak.json` projection before returning, so
/// callers can rely on durability once the call resolves.
pub struct Dak {
    repository: RepositoryContext,
    sync: Arc<DocumentSync>,
    components: HashMap<ComponentType, Arc<ComponentObject>>,
}

impl Dak {
    pub(crate) async fn new(
        document: DakDocument,
        repository: RepositoryContext,
        resolver: Arc<SourceResolver>,
        staging: Arc<dyn StagingGround>,
    ) -> Self {
        let sync = Arc::new(DocumentSync::new(document.clone(), staging.clone()));

        let mut components = HashMap::with_capacity(ComponentType::all().len());
        for component_type in ComponentType::all() {
            let object = Arc::new(ComponentObject::new(
                *component_type,
                repository.clone(),
                resolver.clone(),
                staging.clone(),
                sync.clone(),
            ));
            object
                .initialize_sources(document.sources(*component_type).to_vec())
                .await;
            components.insert(*component_type, object);
        }

        Self {
            repository,
            sync,
            components,
        }
    }

    pub fn repository(&self) -> &RepositoryContext {
        &self.repository
    }

    /// Component lookup by type. The nine slots are populated at
    /// construction, so a miss indicates a caller bug rather than a state
    /// this type can reach.
    pub fn component(&self, component_type: ComponentType) -> Result<Arc<ComponentObject>> {
        self.components
            .get(&component_type)
            .cloned()
            .ok_or_else(|| DakError::ComponentNotFound {
                component: component_type.to_string(),
            })
    }

    fn slot(&self, component_type: ComponentType) -> &Arc<ComponentObject> {
        self.components
            .get(&component_type)
            .expect("all nine component slots exist from construction")
    }

    pub fn health_interventions(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::HealthInterventions)
    }

    pub fn personas(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::Personas)
    }

    pub fn user_scenarios(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::UserScenarios)
    }

    pub fn business_processes(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::BusinessProcesses)
    }

    pub fn data_elements(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::DataElements)
    }

    pub fn decision_logic(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::DecisionLogic)
    }

    pub fn indicators(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::Indicators)
    }

    pub fn requirements(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::Requirements)
    }

    pub fn test_scenarios(&self) -> &Arc<ComponentObject> {
        self.slot(ComponentType::TestScenarios)
    }

    pub async fn metadata(&self) -> DakMetadata {
        self.sync.snapshot().await.metadata
    }

    /// Merge a partial metadata update and persist before returning.
    pub async fn update_metadata(&self, patch: MetadataPatch) -> Result<()> {
        self.sync.update_metadata(patch).await
    }

    /// The full document projection: metadata plus all nine source arrays,
    /// empty ones included.
    pub async fn to_document(&self) -> DakDocument {
        self.sync.snapshot().await
    }

    pub async fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self.to_document().await)?)
    }

    /// Serialize and hand the document to the staging ground. Persistence
    /// failures propagate unchanged.
    pub async fn save(&self) -> Result<()> {
        self.sync.save().await
    }
}

impl std::fmt::Debug for Dak {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dak")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
