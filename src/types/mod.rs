pub mod component;
pub mod document;
pub mod metadata;
pub mod repository;
pub mod source;

pub use component::ComponentType;
pub use document::DakDocument;
pub use metadata::{DakMetadata, DakStatus, MetadataPatch, Publisher};
pub use repository::RepositoryContext;
pub use source::{SourceDescriptor, SourceKind, SourcePatch, SourceReference};
