//! Response cache middleware
//!
//! Adapts [`ResponseCacheInterceptor`] to axum. Must be installed with
//! `Router::route_layer` so the matched route pattern is available.

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::{MatchedPath, OriginalUri, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, error};

use crate::api::types::ApiError;
use crate::domain::response_cache::{
    CACHE_STATUS_HEADER, HandlerReply, HttpExchange, Intercepted, RouteId, Transport,
};
use crate::domain::DomainError;
use crate::infrastructure::services::ResponseCacheInterceptor;

/// Response extension marking a body that must never be buffered or cached
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamingBody;

/// Headers that are never replayed from a cached response
fn is_unreplayable(name: &HeaderName) -> bool {
    *name == header::SET_COOKIE
        || *name == header::CONTENT_LENGTH
        || *name == header::DATE
        || *name == header::TRANSFER_ENCODING
        || *name == CACHE_STATUS_HEADER
}

/// State for [`response_cache_middleware`]
#[derive(Debug, Clone)]
pub struct ResponseCacheLayer {
    pub interceptor: Arc<ResponseCacheInterceptor>,
    /// Bodies larger than this pass through uncached
    pub max_body_bytes: usize,
}

impl ResponseCacheLayer {
    pub fn new(interceptor: Arc<ResponseCacheInterceptor>, max_body_bytes: usize) -> Self {
        Self {
            interceptor,
            max_body_bytes,
        }
    }
}

/// Buffered HTTP response as stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    #[serde(serialize_with = "encode_body", deserialize_with = "decode_body")]
    pub body: Bytes,
}

impl CachedResponse {
    fn from_parts(status: StatusCode, headers: &HeaderMap, body: Bytes) -> Self {
        let headers = headers
            .iter()
            .filter(|(name, _)| !is_unreplayable(name))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            status: status.as_u16(),
            headers,
            body,
        }
    }
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);

        let headers = response.headers_mut();

        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.append(name, value);
            }
        }

        response
    }
}

fn encode_body<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(body))
}

fn decode_body<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
    let encoded = String::deserialize(deserializer)?;

    STANDARD
        .decode(encoded)
        .map(Bytes::from)
        .map_err(serde::de::Error::custom)
}

/// Why the wrapped handler produced no cacheable value
#[derive(Debug)]
pub enum HandlerFailure {
    /// Non-2xx response, returned to the client as-is
    Response(Response),
    /// Cache metadata could not be resolved
    Metadata(DomainError),
}

impl From<DomainError> for HandlerFailure {
    fn from(err: DomainError) -> Self {
        Self::Metadata(err)
    }
}

impl IntoResponse for HandlerFailure {
    fn into_response(self) -> Response {
        match self {
            Self::Response(response) => response,
            Self::Metadata(err) => {
                error!(error = %err, "Failed to resolve response cache metadata");
                ApiError::internal(err.to_string())
                    .with_code("cache_metadata_error")
                    .into_response()
            }
        }
    }
}

type Reply = HandlerReply<CachedResponse, Response>;

/// Serves cacheable responses through the interceptor and tags them with `X-Cache`
pub async fn response_cache_middleware(
    State(layer): State<ResponseCacheLayer>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let route = RouteId::new(request.method().clone(), matched_path(&request));
    let exchange = HttpExchange::new(request.method().clone(), original_url(&request))
        .with_headers(request.headers().clone());

    let interceptor = &layer.interceptor;
    let mut ctx = interceptor
        .registry()
        .context_for(route, Transport::Http(exchange));
    let max_body_bytes = layer.max_body_bytes;

    let result = interceptor
        .intercept(&mut ctx, || async move {
            let response = next.run(request).await;
            classify(response, max_body_bytes).await
        })
        .await;

    let mut response = match result {
        Ok(Intercepted { reply, status }) => {
            debug!(route = %ctx.route, cache = %status, "Response cache outcome");

            match reply {
                HandlerReply::Value(cached) => cached.into_response(),
                HandlerReply::Stream(response) => response,
            }
        }
        Err(failure) => failure.into_response(),
    };

    if let Some(exchange) = ctx.transport.http() {
        for (name, value) in &exchange.response_headers {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }

    response
}

/// Sorts a handler response into cacheable value, stream, or failure
async fn classify(response: Response, max_body_bytes: usize) -> Result<Reply, HandlerFailure> {
    if !response.status().is_success() {
        return Err(HandlerFailure::Response(response));
    }

    if is_streaming(&response, max_body_bytes) {
        return Ok(HandlerReply::Stream(response));
    }

    let (parts, body) = response.into_parts();

    match axum::body::to_bytes(body, max_body_bytes).await {
        Ok(bytes) => Ok(HandlerReply::Value(CachedResponse::from_parts(
            parts.status,
            &parts.headers,
            bytes,
        ))),
        Err(e) => {
            error!(error = %e, "Failed to buffer response body");
            Err(HandlerFailure::Response(
                ApiError::internal("Failed to read response body").into_response(),
            ))
        }
    }
}

fn is_streaming(response: &Response, max_body_bytes: usize) -> bool {
    if response.extensions().get::<StreamingBody>().is_some() {
        return true;
    }

    let event_stream = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("text/event-stream"));

    if event_stream {
        return true;
    }

    match response.body().size_hint().exact() {
        Some(len) => len > max_body_bytes as u64,
        None => true,
    }
}

fn matched_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

fn original_url(request: &Request<Body>) -> String {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| request.uri());

    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}
