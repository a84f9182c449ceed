#![forbid(unsafe_code)]

//! Where the tree comes from: the live referrals API, a JSON file, or the
//! bundled fixture.
//!
//! The live fetch is a blocking `reqwest` call meant to run on a worker
//! thread (`Cmd::task`). Bodies are decoded the same way whatever the
//! source: a node object, a `{ "data": node }` envelope, or `null` for a
//! member without a tree.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `Unauthorized` | HTTP 401, token missing or expired | status line asks to sign in again |
//! | `Status` | any other non-2xx response | status line shows the code |
//! | `Transport` | DNS, connect, TLS, timeout | status line shows the cause |
//! | `Decode` | body is not a node, envelope, or `null` | status line shows the parse error |
//! | `Io` | JSON file unreadable | status line shows the cause |

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use gtree_model::{TreeNode, fixture_tree};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::{Deserialize, Deserializer};

/// Path of the genealogy endpoint below the API base URL.
pub const TREE_PATH: &str = "/api/referrals/genealogy-tree";

/// Errors loading a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The server rejected the credentials (HTTP 401).
    Unauthorized,
    /// Any other unsuccessful HTTP status.
    Status(u16),
    /// The request never produced a response.
    Transport(String),
    /// The body is not a tree.
    Decode(String),
    /// Reading a local file failed.
    Io(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Session expired: sign in again and retry"),
            Self::Status(code) => write!(f, "Server answered HTTP {code}"),
            Self::Transport(msg) => write!(f, "Request failed: {msg}"),
            Self::Decode(msg) => write!(f, "Unexpected response: {msg}"),
            Self::Io(msg) => write!(f, "Cannot read tree file: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    // A bare node needs `id`, so it is tried first; otherwise every object
    // would pass as an envelope with a missing `data`.
    Node(TreeNode),
    // `data` may be null but must be present, so `{}` or an error object
    // is not mistaken for an empty tree.
    Envelope {
        #[serde(deserialize_with = "present_or_null")]
        data: Option<TreeNode>,
    },
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<TreeNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<TreeNode>::deserialize(deserializer)
}

/// Decode a response or file body.
///
/// ```
/// use gtree_viewer::api::decode_body;
///
/// let root = decode_body(br#"{"data": {"id": 7, "username": "ana"}}"#).unwrap();
/// assert_eq!(root.map(|n| n.id), Some(7));
/// assert_eq!(decode_body(b"null").unwrap(), None);
/// ```
pub fn decode_body(body: &[u8]) -> Result<Option<TreeNode>, FetchError> {
    let payload: Option<Payload> =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(match payload {
        None => None,
        Some(Payload::Node(node)) => Some(node),
        Some(Payload::Envelope { data }) => data,
    })
}

/// Split an address into an optional `http`/`https` scheme and the rest.
fn parse_addr(addr: &str) -> (Option<&str>, &str) {
    if let Some(host) = addr.strip_prefix("https://") {
        (Some("https"), host)
    } else if let Some(host) = addr.strip_prefix("http://") {
        (Some("http"), host)
    } else {
        (None, addr)
    }
}

/// Blocking client for the genealogy endpoint.
#[derive(Debug, Clone)]
pub struct GenealogyClient {
    http: reqwest::blocking::Client,
    url: String,
    token: Option<String>,
}

impl GenealogyClient {
    /// Build a client for `api_url`.
    ///
    /// A bare `host:port` is treated as plain HTTP; an explicit scheme is
    /// kept. Trailing slashes are dropped before the endpoint path is
    /// appended.
    pub fn new(api_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let (scheme, host) = parse_addr(api_url.trim());
        let base = format!(
            "{}://{}",
            scheme.unwrap_or("http"),
            host.trim_end_matches('/')
        );
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            url: format!("{base}{TREE_PATH}"),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    /// Full endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the caller's tree.
    pub fn fetch(&self) -> Result<Option<TreeNode>, FetchError> {
        let mut request = self.http.get(&self.url).header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        tracing::debug!(url = %self.url, auth = self.token.is_some(), "fetching genealogy");
        let response = request
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        decode_body(&body)
    }
}

/// The configured origin of the tree.
#[derive(Debug, Clone)]
pub enum DataSource {
    Remote(GenealogyClient),
    File(PathBuf),
    Fixture,
}

impl DataSource {
    /// Load the tree. Blocks for remote sources.
    pub fn load(&self) -> Result<Option<TreeNode>, FetchError> {
        match self {
            Self::Remote(client) => client.fetch(),
            Self::File(path) => {
                let body = fs::read(path).map_err(|e| FetchError::Io(format!("{}: {e}", path.display())))?;
                decode_body(&body)
            }
            Self::Fixture => Ok(Some(fixture_tree())),
        }
    }

    /// Short description for the status line and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Remote(client) => client.url().to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Fixture => "sample data".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_node_and_envelope_decode_alike() {
        let bare = decode_body(br#"{"id": 1, "username": "root", "leftCount": 3}"#).unwrap();
        let wrapped = decode_body(br#"{"data": {"id": 1, "username": "root", "left_count": 3}}"#).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.map(|n| n.left_count), Some(3));
    }

    #[test]
    fn null_bodies_mean_no_tree() {
        assert_eq!(decode_body(b"null"), Ok(None));
        assert_eq!(decode_body(br#"{"data": null}"#), Ok(None));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(decode_body(b"<html>"), Err(FetchError::Decode(_))));
        assert!(matches!(decode_body(br#"[1, 2]"#), Err(FetchError::Decode(_))));
    }

    #[test]
    fn object_without_node_or_data_is_a_decode_error() {
        assert!(matches!(
            decode_body(br#"{"message":"Server Error"}"#),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(decode_body(b"{}"), Err(FetchError::Decode(_))));
        assert_eq!(decode_body(br#"{"data":null}"#), Ok(None));
    }

    #[test]
    fn client_url_normalization() {
        let timeout = Duration::from_secs(1);
        let plain = GenealogyClient::new("127.0.0.1:8080", None, timeout).unwrap();
        assert_eq!(plain.url(), "http://127.0.0.1:8080/api/referrals/genealogy-tree");
        let tls = GenealogyClient::new("https://mlm.example/", Some(String::new()), timeout).unwrap();
        assert_eq!(tls.url(), "https://mlm.example/api/referrals/genealogy-tree");
        assert!(tls.token.is_none());
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = DataSource::File(PathBuf::from("/nonexistent/gtree/tree.json"));
        let err = source.load().unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
        assert!(err.to_string().starts_with("Cannot read tree file"));
    }

    #[test]
    fn fixture_source_loads() {
        let root = DataSource::Fixture.load().unwrap().unwrap();
        assert_eq!(root.id, fixture_tree().id);
        assert_eq!(DataSource::Fixture.describe(), "sample data");
    }
}
