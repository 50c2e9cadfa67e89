//!
//! src/fetch.rs
//!
//! Defines methods for reading the raw song payload from either a
//! network endpoint or a local json file, and checking its shape
//!

use std::fmt;
use std::path::{Path, PathBuf};

use reqwest::{Client, header, redirect};
use serde_json::Value;
use tracing::{error, info};
use url::Url;

use crate::config::HttpConfig;
use crate::errors::CleanerError;
use crate::types::RawRecord;

/// Location of the raw data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(Url),
    File(PathBuf)
}

impl Source {
    /// http(s) and file urls are parsed as urls, anything else is a path
    pub fn parse(raw: &str) -> Result<Source, url::ParseError> {
        let lower = raw.trim().to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok( Source::Http(Url::parse(raw.trim())?) );
        }

        if lower.starts_with("file://") {
            let url = Url::parse(raw.trim())?;
            let path = url.to_file_path()
                .unwrap_or_else(|_| PathBuf::from(url.path()));
            return Ok( Source::File(path) );
        }

        Ok( Source::File(PathBuf::from(raw)) )
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Http(url) => write!(f, "{url}"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Client building functionality
fn client_helper(http: &HttpConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .pool_max_idle_per_host(http.pool_max_idle_per_host)
        .pool_idle_timeout(Some(http.pool_idle_timeout))
        .redirect(redirect::Policy::limited(http.max_redirects as usize))
}

pub fn base_client(http: &HttpConfig) -> Result<Client, CleanerError> {
    let mut h = header::HeaderMap::new();
    h.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
    client_helper(http)
        .default_headers(h)
        .user_agent(http.user_agent.as_str())
        .build()
        .map_err(|e| CleanerError::Config(format!("build client: {e}")))
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}

///
/// Splits a decoded payload into records. Only an array of objects
/// is accepted.
///
pub fn into_records(payload: Value) -> Result<Vec<RawRecord>, CleanerError> {
    let items = match payload {
        Value::Array(items) => items,
        other => return Err(CleanerError::InvalidPayload(
            format!("expected a JSON array of records, found {}", value_kind(&other))
        )),
    };

    items.into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => Ok(RawRecord::from(fields)),
            other => Err(CleanerError::InvalidPayload(
                format!("record {index} is not a JSON object (found {})", value_kind(&other))
            )),
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct SourceLoader {
    pub http: Client
}

impl SourceLoader {
    pub fn new(http_config: &HttpConfig) -> Result<Self, CleanerError> {
        let http = base_client(http_config)?;
        Ok( Self { http } )
    }

    /// Fetches and splits the payload at `source`
    pub async fn load(&self, source: &Source) -> Result<Vec<RawRecord>, CleanerError> {
        let result = match source {
            Source::Http(url) => self.fetch_http(url).await,
            Source::File(path) => read_file(path).await,
        }
        .and_then(into_records);

        match &result {
            Ok(records) => info!(source = %source, records = records.len(), "source.loaded"),
            Err(e) => error!(source = %source, error = %e, "source.failed"),
        }
        result
    }

    /// Same as `load` for a source given as a raw string
    pub async fn load_uri(&self, raw: &str) -> Result<Vec<RawRecord>, CleanerError> {
        let source = Source::parse(raw)
            .map_err(|e| CleanerError::SourceFetch(format!("invalid url {raw}: {e}")))?;
        self.load(&source).await
    }

    /// GET {url}
    async fn fetch_http(&self, url: &Url) -> Result<Value, CleanerError> {
        let response = self.http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| CleanerError::SourceFetch(format!("GET {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CleanerError::SourceFetch(format!(
                "GET {url}: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            )));
        }

        let payload = response.json::<Value>().await?;
        Ok( payload )
    }
}

async fn read_file(path: &Path) -> Result<Value, CleanerError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CleanerError::SourceFetch(
            format!("read {}: {e}", path.display())
        ))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| CleanerError::SourceFetch(
            format!("parse {}: {e}", path.display())
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::SocketAddr;

    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;

    fn loader() -> SourceLoader {
        SourceLoader::new(&HttpConfig::default()).unwrap()
    }

    fn temp_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[test]
    fn parse_source_kinds() {
        assert!(matches!(
            Source::parse("https://example.com/songs.json").unwrap(),
            Source::Http(_)
        ));
        assert!(matches!(
            Source::parse("HTTP://example.com/songs.json").unwrap(),
            Source::Http(_)
        ));
        assert_eq!(
            Source::parse("data/short_songs.json").unwrap(),
            Source::File(PathBuf::from("data/short_songs.json"))
        );
        assert_eq!(
            Source::parse("file:///tmp/songs.json").unwrap(),
            Source::File(PathBuf::from("/tmp/songs.json"))
        );
        assert!(Source::parse("http://").is_err());
    }

    #[test]
    fn payload_must_be_array() {
        let err = into_records(json!({"track_id": "a"})).unwrap_err();
        assert!(matches!(err, CleanerError::InvalidPayload(_)));
        assert!(err.to_string().contains("found object"));
    }

    #[test]
    fn payload_elements_must_be_objects() {
        let err = into_records(json!([{"track_id": "a"}, 7])).unwrap_err();
        assert!(err.to_string().contains("record 1 is not a JSON object (found number)"));
    }

    #[test]
    fn empty_array_is_fine() {
        assert!(into_records(json!([])).unwrap().is_empty());
    }

    #[tokio::test]
    async fn loads_local_file() {
        let file = temp_json(r#"[{"track_id": "a", "tempo": "120"}, {"track_id": "b"}]"#);
        let records = loader()
            .load(&Source::File(file.path().to_path_buf()))
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("tempo"), Some(&json!("120")));
    }

    #[tokio::test]
    async fn load_uri_accepts_plain_paths() {
        let file = temp_json(r#"[{"track_id": "a"}]"#);
        let path = file.path().to_str().unwrap().to_string();
        assert_eq!(loader().load_uri(&path).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = loader().load(&Source::File(missing)).await.unwrap_err();
        assert!(matches!(err, CleanerError::SourceFetch(_)));
        assert!(err.to_string().contains("nope.json"));
    }

    #[tokio::test]
    async fn malformed_file_is_a_fetch_error() {
        let file = temp_json("[{\"track_id\": ");
        let err = loader()
            .load(&Source::File(file.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, CleanerError::SourceFetch(_)));
    }

    #[tokio::test]
    async fn object_file_is_an_invalid_payload() {
        let file = temp_json(r#"{"songs": []}"#);
        let err = loader()
            .load(&Source::File(file.path().to_path_buf()))
            .await
            .unwrap_err();
        assert!(matches!(err, CleanerError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn loads_over_http() {
        let router = Router::new().route("/songs", get(|| async {
            Json(json!([
                {"track_id": "a", "track_album_release_date": "2020-01-05"},
                {"track_id": "b", "track_album_release_date": "2019"}
            ]))
        }));
        let addr = serve(router).await;

        let records = loader()
            .load_uri(&format!("http://{addr}/songs"))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("track_id"), Some(&json!("b")));
    }

    #[tokio::test]
    async fn http_error_status_carries_reason() {
        let router = Router::new()
            .route("/gone", get(|| async { StatusCode::NOT_FOUND }));
        let addr = serve(router).await;

        let err = loader()
            .load_uri(&format!("http://{addr}/gone"))
            .await
            .unwrap_err();
        assert!(matches!(err, CleanerError::SourceFetch(_)));
        assert!(err.to_string().contains("404 Not Found"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_fetch_error() {
        // bind then drop so nothing is listening on the port
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = loader()
            .load_uri(&format!("http://{addr}/songs"))
            .await
            .unwrap_err();
        assert!(matches!(err, CleanerError::SourceFetch(_)));
    }
}
