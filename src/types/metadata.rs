use serde::{Deserialize, Serialize};

/// Publication lifecycle of a guideline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DakStatus {
    #[serde(rename = "draft")]
    #[default]
    Draft,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "retired")]
    Retired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Publisher {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// DAK-level metadata fields of the persisted document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DakMetadata {
    /// Stable guideline identifier, e.g. `smart.who.int.immunizations`.
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Plain text or a URI pointing at a markdown document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub status: DakStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
}

/// Partial metadata update. Present fields replace the corresponding
/// metadata field; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub status: Option<DakStatus>,
    pub publication_url: Option<String>,
    pub license: Option<String>,
    pub copyright_year: Option<String>,
    pub publisher: Option<Publisher>,
}

impl DakMetadata {
    pub fn merge(&mut self, patch: MetadataPatch) {
        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(version) = patch.version {
            self.version = Some(version);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(publication_url) = patch.publication_url {
            self.publication_url = Some(publication_url);
        }
        if let Some(license) = patch.license {
            self.license = Some(license);
        }
        if let Some(copyright_year) = patch.copyright_year {
            self.copyright_year = Some(copyright_year);
        }
        if let Some(publisher) = patch.publisher {
            self.publisher = Some(publisher);
        }
    }
}
