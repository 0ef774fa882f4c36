//! Response cache domain - route metadata and request model

mod context;
mod options;
mod outcome;
mod registry;

pub use context::{CACHE_STATUS_HEADER, HttpExchange, RequestContext, RouteId, Transport};
pub use options::{CacheOptions, KeyFn, KeySource, TtlFn, TtlSource};
pub use outcome::{CacheStatus, HandlerReply, Intercepted};
pub use registry::CacheMetadataRegistry;
