mod http;
mod source_resolver;

pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use source_resolver::{
    CacheStats, ResolutionMethod, ResolvedData, ResolvedSource, ResolverConfig, SourceResolver,
};
