//! Chat endpoint resolution.
//!
//! Two deployment shapes are supported: an endpoint derived from the origin
//! the chat is served from (scheme follows the origin's transport security,
//! same host and port, fixed chat path), or an explicitly configured absolute
//! WebSocket URL.

use std::fmt;

use url::Url;

use crate::error::EndpointError;

/// Path the chat server listens on when the endpoint is derived from an origin.
pub const DEFAULT_CHAT_PATH: &str = "/chat";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointSource {
    /// Derived from an `http(s)://` origin.
    SameOrigin,
    /// Configured verbatim as a `ws(s)://` URL.
    Explicit,
}

/// A validated `ws://` or `wss://` URL plus where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
    source: EndpointSource,
}

impl Endpoint {
    /// Derive the socket URL from the origin the chat page is served from.
    ///
    /// `https` origins map to `wss`, anything else to `ws`. Host and port are
    /// kept as given; the origin's own path is discarded in favor of `chat_path`.
    pub fn same_origin(origin: &str, chat_path: &str) -> Result<Self, EndpointError> {
        let parsed = parse(origin)?;
        let scheme = match parsed.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => return Err(EndpointError::UnsupportedScheme(other.into(), "http or https")),
        };
        let host = parsed
            .host_str()
            .ok_or_else(|| EndpointError::MissingHost(origin.to_string()))?;
        let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
        let path = if chat_path.starts_with('/') {
            chat_path.to_string()
        } else {
            format!("/{chat_path}")
        };

        let url = parse(&format!("{scheme}://{host}{port}{path}"))?;
        Ok(Self {
            url,
            source: EndpointSource::SameOrigin,
        })
    }

    /// Use a fixed, absolute WebSocket URL.
    pub fn explicit(raw: &str) -> Result<Self, EndpointError> {
        let url = parse(raw)?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(EndpointError::UnsupportedScheme(
                url.scheme().to_string(),
                "ws or wss",
            ));
        }
        if url.host_str().is_none() {
            return Err(EndpointError::MissingHost(raw.to_string()));
        }
        Ok(Self {
            url,
            source: EndpointSource::Explicit,
        })
    }

    /// Pick the endpoint from configuration. An explicit endpoint wins over an origin.
    pub fn resolve(
        explicit: Option<&str>,
        origin: Option<&str>,
        chat_path: &str,
    ) -> Result<Self, EndpointError> {
        match (explicit, origin) {
            (Some(raw), _) => Self::explicit(raw),
            (None, Some(origin)) => Self::same_origin(origin, chat_path),
            (None, None) => Err(EndpointError::NotConfigured),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn source(&self) -> EndpointSource {
        self.source
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "wss"
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

fn parse(raw: &str) -> Result<Url, EndpointError> {
    Url::parse(raw).map_err(|e| EndpointError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_origin_becomes_wss() {
        let ep = Endpoint::same_origin("https://chat.example.com", DEFAULT_CHAT_PATH).unwrap();
        assert_eq!(ep.as_str(), "wss://chat.example.com/chat");
        assert!(ep.is_secure());
        assert_eq!(ep.source(), EndpointSource::SameOrigin);
    }

    #[test]
    fn http_origin_becomes_ws_and_keeps_port() {
        let ep = Endpoint::same_origin("http://127.0.0.1:10000/login", DEFAULT_CHAT_PATH).unwrap();
        assert_eq!(ep.as_str(), "ws://127.0.0.1:10000/chat");
        assert!(!ep.is_secure());
    }

    #[test]
    fn nonstandard_https_port_is_kept() {
        let ep = Endpoint::same_origin("https://h:8443/x", DEFAULT_CHAT_PATH).unwrap();
        assert_eq!(ep.as_str(), "wss://h:8443/chat");
    }

    #[test]
    fn chat_path_without_leading_slash() {
        let ep = Endpoint::same_origin("http://h", "rooms/main").unwrap();
        assert_eq!(ep.as_str(), "ws://h/rooms/main");
    }

    #[test]
    fn origin_with_socket_scheme_is_rejected() {
        let err = Endpoint::same_origin("ws://h", DEFAULT_CHAT_PATH).unwrap_err();
        assert_eq!(
            err,
            EndpointError::UnsupportedScheme("ws".into(), "http or https")
        );
    }

    #[test]
    fn explicit_ws_url_is_kept_verbatim() {
        let ep = Endpoint::explicit("ws://localhost:8765").unwrap();
        assert_eq!(ep.url().host_str(), Some("localhost"));
        assert_eq!(ep.url().port(), Some(8765));
        assert_eq!(ep.source(), EndpointSource::Explicit);
    }

    #[test]
    fn explicit_non_socket_scheme_is_rejected() {
        let err = Endpoint::explicit("ftp://h/chat").unwrap_err();
        assert!(matches!(err, EndpointError::UnsupportedScheme(ref s, _) if s == "ftp"));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = Endpoint::explicit("not a url").unwrap_err();
        assert!(matches!(err, EndpointError::InvalidUrl { .. }));
    }

    #[test]
    fn resolve_prefers_explicit() {
        let ep = Endpoint::resolve(
            Some("wss://relay.example.com/ws"),
            Some("http://page.example.com"),
            DEFAULT_CHAT_PATH,
        )
        .unwrap();
        assert_eq!(ep.as_str(), "wss://relay.example.com/ws");
    }

    #[test]
    fn resolve_falls_back_to_origin() {
        let ep = Endpoint::resolve(None, Some("http://page.example.com"), DEFAULT_CHAT_PATH).unwrap();
        assert_eq!(ep.as_str(), "ws://page.example.com/chat");
    }

    #[test]
    fn resolve_without_anything_fails() {
        assert_eq!(
            Endpoint::resolve(None, None, DEFAULT_CHAT_PATH).unwrap_err(),
            EndpointError::NotConfigured
        );
    }
}
