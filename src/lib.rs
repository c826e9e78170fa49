//! # smart-dak
//!
//! Async-first domain core for authoring WHO SMART Guidelines Digital
//! Adaptation Kits (DAKs): structured guideline packages made of nine fixed
//! component collections (personas, business processes, decision logic,
//! data elements, indicators and friends).
//!
//! ## Features
//!
//! - **Typed aggregate**: a [`Dak`] owns exactly nine [`ComponentObject`]s,
//!   one per component type, plus DAK-level metadata
//! - **Source resolution**: canonical IRIs, absolute URLs, repository-relative
//!   paths and inline data resolve through a TTL'd cache
//! - **Staged persistence**: every mutation rewrites the `dak.json`
//!   projection through an external staging-ground collaborator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smart_dak::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<()> {
//! let staging = Arc::new(MemoryStagingGround::new());
//! let resolver = Arc::new(SourceResolver::with_file_loader(Arc::new(
//!     MemoryFileLoader::new(),
//! )));
//!
//! let factory = DakFactory::new(resolver, staging);
//! let (dak, _origin) = factory
//!     .create_from_repository(RepositoryContext::new("who", "anc-dak"))
//!     .await?;
//!
//! dak.personas()
//!     .add_source(SourceDescriptor::relative_url("fsh/actors/Nurse.fsh"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod component;
pub mod dak;
pub mod error;
pub mod resolver;
pub mod storage;
pub mod types;

pub use component::{ComponentObject, SaveOptions, ValidationIssue};
pub use dak::{Dak, DakFactory, DakOrigin};
pub use error::Result; // Our Result type takes precedence
pub use error::DakError;
pub use resolver::{
    CacheStats, HttpClient, HttpResponse, ReqwestClient, ResolutionMethod, ResolvedData,
    ResolvedSource, ResolverConfig, SourceResolver,
};
pub use storage::{FileLoader, MemoryFileLoader, MemoryStagingGround, StagingGround};
pub use types::{
    ComponentType, DakDocument, DakMetadata, DakStatus, MetadataPatch, Publisher,
    RepositoryContext, SourceDescriptor, SourceKind, SourcePatch, SourceReference,
};
