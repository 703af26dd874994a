//! `M-SEARCH` request encoding and search-response decoding.

use thiserror::Error;

use super::{DEFAULT_MX, SSDP_MULTICAST_ADDR};

/// Errors produced while decoding an SSDP datagram.
///
/// None of these are fatal to discovery: the listener logs them at debug
/// level and waits for the next datagram.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SsdpError {
    /// The datagram is not valid UTF-8 text.
    #[error("datagram is not valid UTF-8")]
    NotUtf8,
    /// The datagram contained no start line.
    #[error("empty datagram")]
    Empty,
    /// The start line is a request (`M-SEARCH`, `NOTIFY`), not a response.
    #[error("not an SSDP response: {0:?}")]
    NotAResponse(String),
    /// The status line could not be parsed.
    #[error("malformed status line: {0:?}")]
    MalformedStatusLine(String),
    /// The response carries a status other than 200.
    #[error("unexpected status code {0}")]
    UnexpectedStatus(u16),
    /// The response has no `LOCATION` header.
    #[error("response has no LOCATION header")]
    MissingLocation,
}

/// An `M-SEARCH` discovery query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Value of the `ST` header, e.g. `roku:ecp`.
    pub search_target: String,
    /// Value of the `MX` header (seconds a device may wait before replying).
    pub mx: u8,
}

impl SearchRequest {
    pub fn new(search_target: impl Into<String>) -> Self {
        Self {
            search_target: search_target.into(),
            mx: DEFAULT_MX,
        }
    }

    /// Encodes the request as the datagram payload.
    ///
    /// ```rust
    /// use roku_core::SearchRequest;
    ///
    /// let bytes = SearchRequest::new("roku:ecp").to_bytes();
    /// let text = String::from_utf8(bytes).unwrap();
    /// assert!(text.starts_with("M-SEARCH * HTTP/1.1\r\n"));
    /// assert!(text.contains("ST: roku:ecp\r\n"));
    /// assert!(text.ends_with("\r\n\r\n"));
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "M-SEARCH * HTTP/1.1\r\n\
             HOST: {SSDP_MULTICAST_ADDR}\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: {}\r\n\
             ST: {}\r\n\
             \r\n",
            self.mx, self.search_target
        )
        .into_bytes()
    }
}

/// A decoded `HTTP/1.1 200` search response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsdpResponse {
    /// Header `(NAME, value)` pairs in arrival order; names are upper-cased.
    headers: Vec<(String, String)>,
}

impl SsdpResponse {
    /// Decodes a datagram into a search response.
    ///
    /// Header names are matched case-insensitively.  Header lines without a
    /// colon are skipped rather than rejecting the whole datagram.
    ///
    /// # Errors
    ///
    /// Returns an [`SsdpError`] if the datagram is not a well-formed
    /// `200` response.  A response without `LOCATION` is accepted here;
    /// use [`SsdpResponse::location`] or [`SsdpResponse::require_location`]
    /// to extract it.
    pub fn parse(datagram: &[u8]) -> Result<Self, SsdpError> {
        let text = std::str::from_utf8(datagram).map_err(|_| SsdpError::NotUtf8)?;
        let mut lines = text.split('\n').map(|l| l.trim_end_matches('\r'));

        let start = lines
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or(SsdpError::Empty)?;

        if !start.starts_with("HTTP/") {
            return Err(SsdpError::NotAResponse(start.to_string()));
        }
        let status = start
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or_else(|| SsdpError::MalformedStatusLine(start.to_string()))?;
        if status != 200 {
            return Err(SsdpError::UnexpectedStatus(status));
        }

        let headers = lines
            .take_while(|l| !l.is_empty())
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_ascii_uppercase(), value.trim().to_string()))
            })
            .collect();

        Ok(Self { headers })
    }

    /// Returns the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The device base URL from the `LOCATION` header, if present and non-empty.
    pub fn location(&self) -> Option<&str> {
        self.header("LOCATION").filter(|v| !v.is_empty())
    }

    /// Like [`location`](Self::location) but as a `Result`.
    pub fn require_location(&self) -> Result<&str, SsdpError> {
        self.location().ok_or(SsdpError::MissingLocation)
    }

    /// The `ST` header, if present.
    pub fn search_target(&self) -> Option<&str> {
        self.header("ST")
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const ROKU_REPLY: &str = "HTTP/1.1 200 OK\r\n\
        Cache-Control: max-age=3600\r\n\
        ST: roku:ecp\r\n\
        Location: http://192.168.1.134:8060/\r\n\
        USN: uuid:roku:ecp:P0A070000007\r\n\
        \r\n";

    #[test]
    fn test_search_request_contains_required_headers() {
        // Arrange
        let req = SearchRequest::new("roku:ecp");

        // Act
        let text = String::from_utf8(req.to_bytes()).expect("request must be UTF-8");

        // Assert
        assert!(text.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(text.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(text.contains("MX: 3\r\n"));
        assert!(text.contains("ST: roku:ecp\r\n"));
    }

    #[test]
    fn test_parse_roku_reply_extracts_location() {
        // Arrange / Act
        let resp = SsdpResponse::parse(ROKU_REPLY.as_bytes()).expect("valid reply");

        // Assert
        assert_eq!(resp.location(), Some("http://192.168.1.134:8060/"));
        assert_eq!(resp.search_target(), Some("roku:ecp"));
    }

    #[test]
    fn test_parse_header_names_are_case_insensitive() {
        let raw = b"HTTP/1.1 200 OK\r\nLOCATION: http://a/\r\n\r\n";
        let resp = SsdpResponse::parse(raw).unwrap();
        assert_eq!(resp.header("location"), Some("http://a/"));
        assert_eq!(resp.header("Location"), Some("http://a/"));
    }

    #[test]
    fn test_parse_accepts_bare_newlines() {
        let raw = b"HTTP/1.1 200 OK\nLocation: http://10.0.0.3:8060/\n\n";
        let resp = SsdpResponse::parse(raw).unwrap();
        assert_eq!(resp.location(), Some("http://10.0.0.3:8060/"));
    }

    #[test]
    fn test_parse_value_may_contain_colons() {
        // Only the first colon separates name from value.
        let raw = b"HTTP/1.1 200 OK\r\nLOCATION: http://10.0.0.3:8060/\r\n\r\n";
        let resp = SsdpResponse::parse(raw).unwrap();
        assert_eq!(resp.location(), Some("http://10.0.0.3:8060/"));
    }

    #[test]
    fn test_parse_rejects_msearch_request() {
        let raw = SearchRequest::new("roku:ecp").to_bytes();
        let err = SsdpResponse::parse(&raw).unwrap_err();
        assert!(matches!(err, SsdpError::NotAResponse(_)));
    }

    #[test]
    fn test_parse_rejects_notify() {
        let raw = b"NOTIFY * HTTP/1.1\r\nNT: roku:ecp\r\n\r\n";
        assert!(matches!(
            SsdpResponse::parse(raw),
            Err(SsdpError::NotAResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_200_status() {
        let raw = b"HTTP/1.1 404 Not Found\r\n\r\n";
        assert_eq!(
            SsdpResponse::parse(raw),
            Err(SsdpError::UnexpectedStatus(404))
        );
    }

    #[test]
    fn test_parse_rejects_garbage_status_line() {
        let raw = b"HTTP/1.1 OK\r\n\r\n";
        assert!(matches!(
            SsdpResponse::parse(raw),
            Err(SsdpError::MalformedStatusLine(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_and_binary_datagrams() {
        assert_eq!(SsdpResponse::parse(b""), Err(SsdpError::Empty));
        assert_eq!(SsdpResponse::parse(&[0xff, 0xfe]), Err(SsdpError::NotUtf8));
    }

    #[test]
    fn test_require_location_reports_missing_header() {
        let raw = b"HTTP/1.1 200 OK\r\nST: roku:ecp\r\n\r\n";
        let resp = SsdpResponse::parse(raw).unwrap();
        assert_eq!(resp.require_location(), Err(SsdpError::MissingLocation));
    }

    #[test]
    fn test_empty_location_counts_as_missing() {
        let raw = b"HTTP/1.1 200 OK\r\nLOCATION:\r\n\r\n";
        let resp = SsdpResponse::parse(raw).unwrap();
        assert_eq!(resp.location(), None);
    }

    #[test]
    fn test_malformed_header_line_is_skipped() {
        let raw = b"HTTP/1.1 200 OK\r\ngarbage line\r\nLOCATION: http://x/\r\n\r\n";
        let resp = SsdpResponse::parse(raw).unwrap();
        assert_eq!(resp.location(), Some("http://x/"));
    }
}
