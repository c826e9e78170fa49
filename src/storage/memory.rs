use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::storage::{FileLoader, StagingGround};
use crate::types::DakDocument;

/// In-memory staging ground. Used by tests and by hosts that stage writes
/// themselves before committing them to a repository.
#[derive(Debug, Default)]
pub struct MemoryStagingGround {
    document: Arc<RwLock<Option<DakDocument>>>,
    artifacts: Arc<RwLock<HashMap<String, String>>>,
    document_writes: AtomicU64,
}

impl MemoryStagingGround {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: DakDocument) -> Self {
        Self {
            document: Arc::new(RwLock::new(Some(document))),
            ..Default::default()
        }
    }

    /// Number of `save_document` calls observed so far.
    pub fn document_writes(&self) -> u64 {
        self.document_writes.load(Ordering::Relaxed)
    }

    pub async fn artifact_count(&self) -> usize {
        self.artifacts.read().await.len()
    }
}

#[async_trait]
impl StagingGround for MemoryStagingGround {
    async fn load_document(&self) -> Result<Option<DakDocument>> {
        Ok(self.document.read().await.clone())
    }

    async fn save_document(&self, document: &DakDocument) -> Result<()> {
        *self.document.write().await = Some(document.clone());
        self.document_writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn save_artifact(
        &self,
        path: &str,
        content: &str,
        _metadata: Option<&Map<String, Value>>,
    ) -> Result<()> {
        self.artifacts
            .write()
            .await
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn load_artifact(&self, path: &str) -> Result<Option<String>> {
        Ok(self.artifacts.read().await.get(path).cloned())
    }
}

/// In-memory repository file store keyed by `owner/repo/branch/path`.
#[derive(Debug, Default)]
pub struct MemoryFileLoader {
    files: RwLock<HashMap<String, String>>,
}

impl MemoryFileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(owner: &str, repo: &str, branch: &str, path: &str) -> String {
        format!("{owner}/{repo}/{branch}/{path}")
    }

    pub async fn put_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
        content: impl Into<String>,
    ) {
        self.files
            .write()
            .await
            .insert(Self::key(owner, repo, branch, path), content.into());
    }
}

#[async_trait]
impl FileLoader for MemoryFileLoader {
    async fn load_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .files
            .read()
            .await
            .get(&Self::key(owner, repo, branch, path))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DakMetadata;

    #[tokio::test]
    async fn test_document_roundtrip_and_write_count() {
        let staging = MemoryStagingGround::new();
        assert!(staging.load_document().await.unwrap().is_none());

        let document = DakDocument::new(DakMetadata {
            id: "smart.who.int.anc".to_string(),
            ..Default::default()
        });
        staging.save_document(&document).await.unwrap();

        assert_eq!(staging.document_writes(), 1);
        assert_eq!(staging.load_document().await.unwrap(), Some(document));
    }

    #[tokio::test]
    async fn test_artifact_roundtrip() {
        let staging = MemoryStagingGround::new();
        staging
            .save_artifact("fsh/actors/Nurse.fsh", "Instance: Nurse", None)
            .await
            .unwrap();
        assert_eq!(
            staging.load_artifact("fsh/actors/Nurse.fsh").await.unwrap(),
            Some("Instance: Nurse".to_string())
        );
        assert!(staging.load_artifact("missing.fsh").await.unwrap().is_none());
        assert_eq!(staging.artifact_count().await, 1);
    }

    #[tokio::test]
    async fn test_file_loader_scoped_by_repository() {
        let files = MemoryFileLoader::new();
        files
            .put_file("who", "anc-dak", "main", "input/fsh/a.fsh", "A")
            .await;

        let hit = files
            .load_file("who", "anc-dak", "main", "input/fsh/a.fsh")
            .await
            .unwrap();
        assert_eq!(hit.as_deref(), Some("A"));

        let other_branch = files
            .load_file("who", "anc-dak", "dev", "input/fsh/a.fsh")
            .await
            .unwrap();
        assert!(other_branch.is_none());
    }
}
