//! Request context seen by the response cache

use std::fmt;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Response header carrying the cache outcome (`HIT` or `MISS`)
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Identity of a route handler: HTTP method plus route pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteId {
    pub method: Method,
    pub path: String,
}

impl RouteId {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// HTTP request/response pair as far as caching is concerned
#[derive(Debug, Clone)]
pub struct HttpExchange {
    pub method: Method,
    /// Path and query string exactly as received
    pub url: String,
    pub headers: HeaderMap,
    /// Headers to be copied onto the outgoing response
    pub response_headers: HeaderMap,
}

impl HttpExchange {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            response_headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Query string without the leading `?`
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, query)| query)
    }
}

/// Transport the request arrived on
#[derive(Debug, Clone)]
pub enum Transport {
    Http(HttpExchange),
    /// Any non-HTTP entry point (RPC, message consumer, websocket frame)
    Other { kind: String },
}

impl Transport {
    pub fn other(kind: impl Into<String>) -> Self {
        Self::Other { kind: kind.into() }
    }

    pub fn http(&self) -> Option<&HttpExchange> {
        match self {
            Self::Http(exchange) => Some(exchange),
            Self::Other { .. } => None,
        }
    }

    pub fn http_mut(&mut self) -> Option<&mut HttpExchange> {
        match self {
            Self::Http(exchange) => Some(exchange),
            Self::Other { .. } => None,
        }
    }
}

/// Everything the cache needs to know about one in-flight request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub route: RouteId,
    /// Controller (handler group) the route belongs to
    pub controller: Option<String>,
    pub transport: Transport,
}

impl RequestContext {
    pub fn new(route: RouteId, transport: Transport) -> Self {
        Self {
            route,
            controller: None,
            transport,
        }
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// First value of a query parameter, undecoded
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.transport
            .http()?
            .query()?
            .split('&')
            .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Sets a response header; a no-op for non-HTTP transports
    pub fn set_response_header(&mut self, name: HeaderName, value: HeaderValue) {
        if let Some(exchange) = self.transport.http_mut() {
            exchange.response_headers.insert(name, value);
        }
    }

    pub fn response_header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.transport.http()?.response_headers.get(name)
    }
}
