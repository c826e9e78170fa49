use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::dak::sync::DocumentSync;
use crate::error::{DakError, Result};
use crate::resolver::{ResolvedData, SourceResolver};
use crate::storage::StagingGround;
use crate::types::{
    ComponentType, RepositoryContext, SourceDescriptor, SourceKind, SourcePatch, SourceReference,
};

/// How [`ComponentObject::save`] persists an instance: inline into the
/// source list when `file_name` is absent, otherwise as a named artifact
/// (path relative to `input/`) referenced by a relative-URL source. Exactly
/// one of the two paths runs per call.
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    pub file_name: Option<String>,
    pub update_existing: bool,
    pub metadata: Option<Map<String, Value>>,
}

/// One structural problem found by [`ComponentObject::validate_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    pub index: usize,
    pub message: String,
}

/// Owns the ordered source-descriptor sequence for one component type and
/// mediates every read and write to it. Mutations flow through the shared
/// [`DocumentSync`], so each one rewrites the staged `dak.json` before the
/// call returns.
///
/// Constructed only by the aggregate; never shared across aggregates.
pub struct ComponentObject {
    component_type: ComponentType,
    repository: RepositoryContext,
    sources: RwLock<Vec<SourceDescriptor>>,
    resolved: RwLock<HashMap<String, ResolvedData>>,
    resolver: Arc<SourceResolver>,
    staging: Arc<dyn StagingGround>,
    sync: Arc<DocumentSync>,
}

impl ComponentObject {
    pub(crate) fn new(
        component_type: ComponentType,
        repository: RepositoryContext,
        resolver: Arc<SourceResolver>,
        staging: Arc<dyn StagingGround>,
        sync: Arc<DocumentSync>,
    ) -> Self {
        Self {
            component_type,
            repository,
            sources: RwLock::new(Vec::new()),
            resolved: RwLock::new(HashMap::new()),
            resolver,
            staging,
            sync,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// Defensive copy of the current sequence, in insertion order.
    pub async fn get_sources(&self) -> Vec<SourceDescriptor> {
        self.sources.read().await.clone()
    }

    /// Validate-then-append. A descriptor failing structural validation
    /// leaves the sequence untouched.
    pub async fn add_source(&self, descriptor: SourceDescriptor) -> Result<()> {
        self.resolver.validate(&descriptor)?;

        let snapshot = {
            let mut sources = self.sources.write().await;
            sources.push(descriptor);
            sources.clone()
        };
        self.sync.update_component(self.component_type, snapshot).await
    }

    /// Merge a partial update into the descriptor at `index`. The patched
    /// descriptor is assumed caller-verified and is not re-validated.
    pub async fn update_source(&self, index: usize, patch: SourcePatch) -> Result<()> {
        let snapshot = {
            let mut sources = self.sources.write().await;
            let len = sources.len();
            let descriptor = sources
                .get_mut(index)
                .ok_or(DakError::IndexOutOfRange { index, len })?;
            descriptor.apply(patch);
            sources.clone()
        };
        self.sync.update_component(self.component_type, snapshot).await
    }

    pub async fn remove_source(&self, index: usize) -> Result<()> {
        let snapshot = {
            let mut sources = self.sources.write().await;
            let len = sources.len();
            if index >= len {
                return Err(DakError::IndexOutOfRange { index, len });
            }
            sources.remove(index);
            sources.clone()
        };
        self.sync.update_component(self.component_type, snapshot).await
    }

    /// Resolve every source in order. A single broken reference is logged
    /// and skipped rather than failing the whole retrieval; whatever
    /// resolved successfully is returned and cached by its payload `id`.
    pub async fn retrieve_all(&self) -> Vec<ResolvedData> {
        let sources = self.get_sources().await;
        let resolutions = futures::future::join_all(
            sources
                .iter()
                .map(|descriptor| self.resolver.resolve(descriptor, Some(&self.repository))),
        )
        .await;

        let mut items = Vec::with_capacity(resolutions.len());
        for (index, resolution) in resolutions.into_iter().enumerate() {
            match resolution {
                Ok(resolved) => {
                    if let Some(id) = resolved.data.identifier() {
                        self.resolved
                            .write()
                            .await
                            .insert(id.to_string(), resolved.data.clone());
                    }
                    items.push(resolved.data);
                }
                Err(error) => {
                    tracing::warn!(
                        component = %self.component_type,
                        index,
                        %error,
                        "skipping unresolvable source"
                    );
                }
            }
        }
        items
    }

    /// Local identifier cache first; on a miss, one full retrieval and a
    /// re-check.
    pub async fn retrieve_by_id(&self, id: &str) -> Option<ResolvedData> {
        if let Some(data) = self.resolved.read().await.get(id) {
            return Some(data.clone());
        }
        self.retrieve_all().await;
        self.resolved.read().await.get(id).cloned()
    }

    /// Persist one instance of this component's data.
    pub async fn save(&self, data: Value, options: SaveOptions) -> Result<()> {
        let snapshot = match &options.file_name {
            Some(file_name) => self.save_as_artifact(&data, file_name, &options).await?,
            None => self.save_inline(&data, &options).await,
        };
        self.sync.update_component(self.component_type, snapshot).await?;

        if let Some(id) = data.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) {
            self.resolved
                .write()
                .await
                .insert(id.to_string(), ResolvedData::Json(data));
        }
        Ok(())
    }

    async fn save_inline(&self, data: &Value, options: &SaveOptions) -> Vec<SourceDescriptor> {
        let mut descriptor = SourceDescriptor::inline(data.clone());
        if let Some(metadata) = &options.metadata {
            descriptor = descriptor.with_metadata(metadata.clone());
        }

        let mut sources = self.sources.write().await;
        let existing = if options.update_existing {
            let id = data.get("id");
            sources
                .iter()
                .position(|source| match &source.reference {
                    SourceReference::Inline(value) => {
                        id.is_some() && value.get("id") == id
                    }
                    _ => false,
                })
                .or_else(|| sources.iter().position(|s| s.kind() == SourceKind::Inline))
        } else {
            None
        };

        match existing {
            Some(index) => sources[index] = descriptor,
            None => sources.push(descriptor),
        }
        sources.clone()
    }

    async fn save_as_artifact(
        &self,
        data: &Value,
        file_name: &str,
        options: &SaveOptions,
    ) -> Result<Vec<SourceDescriptor>> {
        let content = serde_json::to_string_pretty(data)?;
        self.staging
            .save_artifact(file_name, &content, options.metadata.as_ref())
            .await?;
        tracing::debug!(
            component = %self.component_type,
            path = file_name,
            "saved component artifact"
        );

        let mut sources = self.sources.write().await;
        let existing = sources.iter().position(|source| {
            matches!(&source.reference, SourceReference::RelativeUrl(path) if path == file_name)
        });

        match existing {
            Some(index) => {
                if let Some(metadata) = &options.metadata {
                    sources[index].apply(SourcePatch {
                        reference: None,
                        metadata: Some(metadata.clone()),
                    });
                }
            }
            None => {
                let mut descriptor = SourceDescriptor::relative_url(file_name);
                if let Some(metadata) = &options.metadata {
                    descriptor = descriptor.with_metadata(metadata.clone());
                }
                sources.push(descriptor);
            }
        }
        Ok(sources.clone())
    }

    /// Structural check for one instance of this component's data.
    pub fn validate(&self, data: &Value) -> Result<()> {
        self.component_type.validate_payload(data)
    }

    /// Resolve everything and validate each structured payload. Text
    /// payloads (e.g. FSH files) are opaque to structural validation.
    pub async fn validate_all(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (index, data) in self.retrieve_all().await.iter().enumerate() {
            if let Some(value) = data.as_json() {
                if let Err(error) = self.component_type.validate_payload(value) {
                    issues.push(ValidationIssue {
                        index,
                        message: error.to_string(),
                    });
                }
            }
        }
        issues
    }

    /// Trusted bulk load from a persisted document. Bypasses validation and
    /// does not persist; construction only.
    pub(crate) async fn initialize_sources(&self, sources: Vec<SourceDescriptor>) {
        *self.sources.write().await = sources;
    }
}

impl std::fmt::Debug for ComponentObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentObject")
            .field("component_type", &self.component_type)
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}
