//! Results produced around a cached handler

use axum::http::HeaderValue;

/// What the cache did for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the store without running the handler
    Hit,
    /// Handler ran; its value was offered to the store
    Miss,
    /// Caching did not apply (no key, or the store could not be read)
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Bypass => "bypass",
        }
    }

    /// Value for the `X-Cache` response header, if any
    pub fn header_value(&self) -> Option<HeaderValue> {
        match self {
            Self::Hit => Some(HeaderValue::from_static("HIT")),
            Self::Miss => Some(HeaderValue::from_static("MISS")),
            Self::Bypass => None,
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output of a handler: a materialized value, or a stream that must not be cached
#[derive(Debug)]
pub enum HandlerReply<T, S> {
    Value(T),
    Stream(S),
}

impl<T, S> HandlerReply<T, S> {
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Stream(_) => None,
        }
    }
}

/// Handler reply together with the cache outcome
#[derive(Debug)]
pub struct Intercepted<T, S> {
    pub reply: HandlerReply<T, S>,
    pub status: CacheStatus,
}

impl<T, S> Intercepted<T, S> {
    pub fn new(reply: HandlerReply<T, S>, status: CacheStatus) -> Self {
        Self { reply, status }
    }

    pub fn bypassed(reply: HandlerReply<T, S>) -> Self {
        Self::new(reply, CacheStatus::Bypass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_values() {
        assert_eq!(CacheStatus::Hit.header_value().unwrap(), "HIT");
        assert_eq!(CacheStatus::Miss.header_value().unwrap(), "MISS");
        assert!(CacheStatus::Bypass.header_value().is_none());
    }

    #[test]
    fn test_reply_accessors() {
        let value: HandlerReply<u32, ()> = HandlerReply::Value(7);
        assert_eq!(value.value(), Some(&7));
        assert!(!value.is_stream());

        let stream: HandlerReply<u32, ()> = HandlerReply::Stream(());
        assert!(stream.is_stream());
        assert!(stream.value().is_none());
    }
}
