use async_trait::async_trait;
use smart_dak::*;
use std::sync::{Arc, Once};
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

static TRACING: Once = Once::new();

/// Install the test subscriber once per binary; `RUST_LOG` filters output.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// HTTP stub that always succeeds with a fixed JSON body and counts calls.
pub struct CountingHttpClient {
    calls: AtomicUsize,
    body: String,
}

impl CountingHttpClient {
    pub fn json_ok(body: impl Into<String>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            body: body.into(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for CountingHttpClient {
    async fn get(&self, _url: &Url) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HttpResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: self.body.clone(),
        })
    }
}

#[allow(dead_code)]
pub fn test_repository() -> RepositoryContext {
    RepositoryContext::new("who", "anc-dak")
}

#[allow(dead_code)]
pub fn test_factory() -> (DakFactory, Arc<MemoryStagingGround>) {
    init_tracing();
    let staging = Arc::new(MemoryStagingGround::new());
    let resolver = Arc::new(
        SourceResolver::new(
            Arc::new(CountingHttpClient::json_ok("{}")),
            Arc::new(MemoryFileLoader::new()),
            ResolverConfig::default(),
        )
        .unwrap(),
    );
    (DakFactory::new(resolver, staging.clone()), staging)
}
