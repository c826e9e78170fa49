use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// Reference half of a source descriptor. Exactly one variant is populated
/// by construction, which is the invariant the persisted `dak.json` shape
/// (`canonical` / `url` / `instance` as optional sibling fields) can only
/// promise by convention.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceReference {
    /// Absolute IRI of a published resource (e.g. a WHO terminology IRI).
    Canonical(Url),
    /// Fully-qualified HTTP(S) URL fetched directly.
    AbsoluteUrl(Url),
    /// Path under the guideline's `input/` content root in its repository.
    RelativeUrl(String),
    /// Data embedded directly in the document; no fetch involved.
    Inline(Value),
}

/// Discriminant of a [`SourceReference`], used in cache keys and error
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Canonical,
    AbsoluteUrl,
    RelativeUrl,
    Inline,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Canonical => "canonical",
            SourceKind::AbsoluteUrl => "url",
            SourceKind::RelativeUrl => "relative-url",
            SourceKind::Inline => "instance",
        };
        write!(f, "{name}")
    }
}

impl SourceReference {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceReference::Canonical(_) => SourceKind::Canonical,
            SourceReference::AbsoluteUrl(_) => SourceKind::AbsoluteUrl,
            SourceReference::RelativeUrl(_) => SourceKind::RelativeUrl,
            SourceReference::Inline(_) => SourceKind::Inline,
        }
    }

    /// Canonical string form of the reference, used in cache keys and error
    /// messages. Inline data serializes to its compact JSON text.
    pub fn reference_string(&self) -> String {
        match self {
            SourceReference::Canonical(url) => url.to_string(),
            SourceReference::AbsoluteUrl(url) => url.to_string(),
            SourceReference::RelativeUrl(path) => path.clone(),
            SourceReference::Inline(value) => value.to_string(),
        }
    }
}

/// One tagged reference to a piece of component content, plus free-form
/// provenance metadata (who added it, when, by what mechanism).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDescriptor {
    pub reference: SourceReference,
    pub metadata: Option<Map<String, Value>>,
}

impl SourceDescriptor {
    pub fn canonical(url: Url) -> Self {
        Self {
            reference: SourceReference::Canonical(url),
            metadata: None,
        }
    }

    pub fn absolute_url(url: Url) -> Self {
        Self {
            reference: SourceReference::AbsoluteUrl(url),
            metadata: None,
        }
    }

    pub fn relative_url(path: impl Into<String>) -> Self {
        Self {
            reference: SourceReference::RelativeUrl(path.into()),
            metadata: None,
        }
    }

    pub fn inline(data: Value) -> Self {
        Self {
            reference: SourceReference::Inline(data),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn kind(&self) -> SourceKind {
        self.reference.kind()
    }

    pub fn reference_string(&self) -> String {
        self.reference.reference_string()
    }
}

/// Partial update applied to an existing descriptor. A present `reference`
/// replaces the reference wholesale; present `metadata` entries are merged
/// key-by-key into the existing metadata map.
#[derive(Debug, Clone, Default)]
pub struct SourcePatch {
    pub reference: Option<SourceReference>,
    pub metadata: Option<Map<String, Value>>,
}

impl SourceDescriptor {
    pub fn apply(&mut self, patch: SourcePatch) {
        if let Some(reference) = patch.reference {
            self.reference = reference;
        }
        if let Some(entries) = patch.metadata {
            let target = self.metadata.get_or_insert_with(Map::new);
            for (key, value) in entries {
                target.insert(key, value);
            }
        }
    }
}

/// External JSON shape: optional sibling fields, at most one of which should
/// be set. Kept private; the typed enum is the only public representation.
#[derive(Serialize, Deserialize)]
struct RawSourceDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Map<String, Value>>,
}

fn is_absolute_http(reference: &str) -> Option<Url> {
    match Url::parse(reference) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Some(url),
        _ => None,
    }
}

impl Serialize for SourceDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut raw = RawSourceDescriptor {
            canonical: None,
            url: None,
            instance: None,
            metadata: self.metadata.clone(),
        };
        match &self.reference {
            SourceReference::Canonical(url) => raw.canonical = Some(url.to_string()),
            SourceReference::AbsoluteUrl(url) => raw.url = Some(url.to_string()),
            SourceReference::RelativeUrl(path) => raw.url = Some(path.clone()),
            SourceReference::Inline(value) => raw.instance = Some(value.clone()),
        }
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SourceDescriptor {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let raw = RawSourceDescriptor::deserialize(deserializer)?;

        // Persisted documents are a trusted bulk-load path: a descriptor with
        // more than one reference field set is disambiguated by the fixed
        // precedence inline > url > canonical rather than rejected, so
        // existing documents keep loading. `SourceResolver::validate` is the
        // strict gate for new descriptors.
        let reference = if let Some(instance) = raw.instance {
            SourceReference::Inline(instance)
        } else if let Some(reference) = raw.url {
            match is_absolute_http(&reference) {
                Some(url) => SourceReference::AbsoluteUrl(url),
                None => SourceReference::RelativeUrl(reference),
            }
        } else if let Some(canonical) = raw.canonical {
            let url = Url::parse(&canonical).map_err(|e| {
                D::Error::custom(format!("canonical `{canonical}` is not an absolute IRI: {e}"))
            })?;
            SourceReference::Canonical(url)
        } else {
            return Err(D::Error::custom(
                "source descriptor has none of `canonical`, `url`, `instance`",
            ));
        };

        Ok(SourceDescriptor {
            reference,
            metadata: raw.metadata,
        })
    }
}
