use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, PRAGMA, USER_AGENT};

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide client. The timeout of the first call wins.
pub fn http_client(timeout: Option<Duration>) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("failed to build http client")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Default,
    Bypass,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that never produced a response. HTTP error statuses are
/// reported through `FetchResponse::status` instead.
#[derive(Debug)]
pub enum FetchError {
    Transport(String),
    Io(io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(message) => write!(f, "transport error: {message}"),
            FetchError::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(_) => None,
            FetchError::Io(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

pub trait Fetch: Send + Sync {
    fn fetch(&self, path: &str, cache: CacheMode) -> Result<FetchResponse, FetchError>;

    /// Human-readable location of `path`, for logs.
    fn describe(&self, path: &str) -> String;
}

pub struct HttpFetcher {
    client: &'static Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, path: &str, cache: CacheMode) -> Result<FetchResponse, FetchError> {
        let mut req = self
            .client
            .get(self.url(path))
            .header(USER_AGENT, concat!("sizing_terminal/", env!("CARGO_PKG_VERSION")));
        if cache == CacheMode::Bypass {
            req = req
                .header(CACHE_CONTROL, "no-cache, no-store")
                .header(PRAGMA, "no-cache");
        }

        let resp = req.send()?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            // Error bodies are never read.
            return Ok(FetchResponse {
                status,
                body: Vec::new(),
            });
        }
        let body = resp.bytes()?.to_vec();
        Ok(FetchResponse { status, body })
    }

    fn describe(&self, path: &str) -> String {
        self.url(path)
    }
}

/// Serves the static paths from a local directory; a missing file is a 404.
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn file_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Fetch for DirFetcher {
    fn fetch(&self, path: &str, _cache: CacheMode) -> Result<FetchResponse, FetchError> {
        match fs::read(self.file_path(path)) {
            Ok(body) => Ok(FetchResponse { status: 200, body }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                body: Vec::new(),
            }),
            Err(err) => Err(FetchError::Io(err)),
        }
    }

    fn describe(&self, path: &str) -> String {
        self.file_path(path).display().to_string()
    }
}
