use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

use crate::error::{DakError, Result};
use crate::resolver::{HttpClient, ReqwestClient};
use crate::storage::FileLoader;
use crate::types::{RepositoryContext, SourceDescriptor, SourceKind, SourceReference};

/// Resolver tuning. TTL bounds how long a resolved value is served from
/// cache; the request timeout bounds every network fetch so a hung remote
/// cannot hang the awaiting caller.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub ttl: Duration,
    pub request_timeout: Duration,
    pub cache_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
            cache_capacity: 1000,
        }
    }
}

impl ResolverConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

/// Which resolution strategy actually produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionMethod {
    Canonical,
    AbsoluteUrl,
    RelativeFile,
    Inline,
}

/// The concrete value a source resolves to: parsed JSON when the payload is
/// structured, raw text otherwise (e.g. FSH files).
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedData {
    Json(Value),
    Text(String),
}

impl ResolvedData {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResolvedData::Json(value) => Some(value),
            ResolvedData::Text(_) => None,
        }
    }

    /// The payload's own `id` field, when it is structured and carries one.
    pub fn identifier(&self) -> Option<&str> {
        self.as_json()?.get("id")?.as_str().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub data: ResolvedData,
    pub method: ResolutionMethod,
    /// True when this result was served from cache without any I/O.
    pub from_cache: bool,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: ResolvedData,
    method: ResolutionMethod,
    inserted_at: Instant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Resolves one source descriptor plus a repository context into concrete
/// data, consulting a TTL'd LRU cache keyed by variant, repository and
/// reference string. Distinct descriptor instances with the same key share
/// one entry.
pub struct SourceResolver {
    http: Arc<dyn HttpClient>,
    files: Arc<dyn FileLoader>,
    cache: RwLock<LruCache<String, CacheEntry>>,
    stats: RwLock<CacheStats>,
    config: ResolverConfig,
}

impl SourceResolver {
    pub fn new(
        http: Arc<dyn HttpClient>,
        files: Arc<dyn FileLoader>,
        config: ResolverConfig,
    ) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.cache_capacity)
            .ok_or_else(|| DakError::configuration("resolver cache capacity cannot be zero"))?;

        Ok(Self {
            http,
            files,
            cache: RwLock::new(LruCache::new(capacity)),
            stats: RwLock::new(CacheStats::default()),
            config,
        })
    }

    /// Resolver with the production HTTP client and default tuning.
    pub fn with_file_loader(files: Arc<dyn FileLoader>) -> Self {
        // Default capacity is non-zero, so construction cannot fail here.
        Self::new(Arc::new(ReqwestClient::new()), files, ResolverConfig::default())
            .unwrap_or_else(|_| unreachable!("default cache capacity is non-zero"))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a descriptor into concrete data.
    ///
    /// Cache hits within the TTL return immediately with `from_cache` set and
    /// perform no I/O. Stale entries are evicted on access. Failures carry
    /// the variant and reference string; nothing is retried here.
    pub async fn resolve(
        &self,
        descriptor: &SourceDescriptor,
        repository: Option<&RepositoryContext>,
    ) -> Result<ResolvedSource> {
        self.validate(descriptor)?;

        let key = self.cache_key(descriptor, repository);

        let cached = {
            let mut cache = self.cache.write().await;
            if let Some(entry) = cache.get(&key) {
                if entry.inserted_at.elapsed() < self.config.ttl {
                    Some(entry.clone())
                } else {
                    // Stale entries are evicted on access.
                    cache.pop(&key);
                    None
                }
            } else {
                None
            }
        };

        if let Some(entry) = cached {
            self.stats.write().await.hits += 1;
            tracing::debug!(key = %key, "source cache hit");
            return Ok(ResolvedSource {
                data: entry.data,
                method: entry.method,
                from_cache: true,
            });
        }
        self.stats.write().await.misses += 1;

        // Two concurrent misses for the same key both fetch; they converge on
        // the same cached value. No in-flight coalescing at this layer.
        let (data, method) = self.dispatch(descriptor, repository).await?;

        {
            let mut cache = self.cache.write().await;
            cache.put(
                key,
                CacheEntry {
                    data: data.clone(),
                    method,
                    inserted_at: Instant::now(),
                },
            );
        }

        Ok(ResolvedSource {
            data,
            method,
            from_cache: false,
        })
    }

    async fn dispatch(
        &self,
        descriptor: &SourceDescriptor,
        repository: Option<&RepositoryContext>,
    ) -> Result<(ResolvedData, ResolutionMethod)> {
        match &descriptor.reference {
            SourceReference::Canonical(url) => {
                let data = self.fetch(url, SourceKind::Canonical).await?;
                Ok((data, ResolutionMethod::Canonical))
            }
            SourceReference::AbsoluteUrl(url) => {
                let data = self.fetch(url, SourceKind::AbsoluteUrl).await?;
                Ok((data, ResolutionMethod::AbsoluteUrl))
            }
            SourceReference::RelativeUrl(path) => {
                let data = self.load_relative(path, repository).await?;
                Ok((data, ResolutionMethod::RelativeFile))
            }
            SourceReference::Inline(value) => {
                Ok((ResolvedData::Json(value.clone()), ResolutionMethod::Inline))
            }
        }
    }

    async fn fetch(&self, url: &Url, kind: SourceKind) -> Result<ResolvedData> {
        let reference = url.as_str();
        tracing::debug!(%kind, reference, "fetching source over HTTP");

        let response = tokio::time::timeout(self.config.request_timeout, self.http.get(url))
            .await
            .map_err(|_| {
                DakError::resolution(
                    kind,
                    reference,
                    format!(
                        "request timed out after {}s",
                        self.config.request_timeout.as_secs()
                    ),
                )
            })?
            .map_err(|e| DakError::resolution(kind, reference, e.to_string()))?;

        if !response.is_success() {
            return Err(DakError::resolution(
                kind,
                reference,
                format!("HTTP status {}", response.status),
            ));
        }

        if response.is_json() {
            let value: Value = serde_json::from_str(&response.body)
                .map_err(|e| DakError::resolution(kind, reference, format!("invalid JSON: {e}")))?;
            Ok(ResolvedData::Json(value))
        } else {
            Ok(ResolvedData::Text(response.body))
        }
    }

    async fn load_relative(
        &self,
        path: &str,
        repository: Option<&RepositoryContext>,
    ) -> Result<ResolvedData> {
        let kind = SourceKind::RelativeUrl;
        let repository = repository.ok_or_else(|| {
            DakError::resolution(kind, path, "relative source requires a repository context")
        })?;

        let full_path = format!("input/{path}");
        tracing::debug!(repository = %repository, path = %full_path, "loading repository file");

        let content = self
            .files
            .load_file(
                &repository.owner,
                &repository.repo,
                &repository.branch,
                &full_path,
            )
            .await
            .map_err(|e| DakError::resolution(kind, path, e.to_string()))?
            .ok_or_else(|| {
                DakError::resolution(kind, path, format!("file not found in {repository}"))
            })?;

        if full_path.ends_with(".json") {
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| DakError::resolution(kind, path, format!("invalid JSON: {e}")))?;
            Ok(ResolvedData::Json(value))
        } else {
            Ok(ResolvedData::Text(content))
        }
    }

    /// Structural validation only; never performs I/O.
    pub fn validate(&self, descriptor: &SourceDescriptor) -> Result<()> {
        match &descriptor.reference {
            SourceReference::Canonical(url) | SourceReference::AbsoluteUrl(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(DakError::invalid_source(format!(
                        "reference `{url}` must use an http(s) scheme"
                    )));
                }
                Ok(())
            }
            SourceReference::RelativeUrl(path) => validate_relative_path(path),
            SourceReference::Inline(value) => {
                if value.is_null() {
                    return Err(DakError::invalid_source("inline data cannot be null"));
                }
                Ok(())
            }
        }
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    pub async fn clear_cache_for(
        &self,
        descriptor: &SourceDescriptor,
        repository: Option<&RepositoryContext>,
    ) {
        let key = self.cache_key(descriptor, repository);
        self.cache.write().await.pop(&key);
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let mut stats = *self.stats.read().await;
        stats.entries = self.cache.read().await.len();
        stats
    }

    fn cache_key(
        &self,
        descriptor: &SourceDescriptor,
        repository: Option<&RepositoryContext>,
    ) -> String {
        let scope = repository
            .map(RepositoryContext::to_string)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{}:{}:{}",
            descriptor.kind(),
            scope,
            descriptor.reference_string()
        )
    }
}

fn validate_relative_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(DakError::invalid_source("relative path cannot be empty"));
    }
    if path.starts_with('/') {
        return Err(DakError::invalid_source(format!(
            "relative path `{path}` must not start with `/`"
        )));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(DakError::invalid_source(format!(
            "relative path `{path}` must not contain `..` segments"
        )));
    }
    Ok(())
}

impl std::fmt::Debug for SourceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
