use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::DakDocument;

/// The staging ground: an external collaborator that durably stores the
/// `dak.json` document and component artifact files. The core never writes
/// to a repository directly; every write goes through this boundary.
///
/// Artifact paths are always interpreted relative to the guideline's
/// `input/` content root.
#[async_trait]
pub trait StagingGround: Send + Sync {
    async fn load_document(&self) -> Result<Option<DakDocument>>;
    async fn save_document(&self, document: &DakDocument) -> Result<()>;
    async fn save_artifact(
        &self,
        path: &str,
        content: &str,
        metadata: Option<&Map<String, Value>>,
    ) -> Result<()>;
    async fn load_artifact(&self, path: &str) -> Result<Option<String>>;
}

/// Loads one file from a hosted repository, used only for relative-URL
/// source resolution. Never touches local disk.
#[async_trait]
pub trait FileLoader: Send + Sync {
    async fn load_file(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>>;
}
