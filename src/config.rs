use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::http_client::{DirFetcher, Fetch, HttpFetcher};

const DEFAULT_SOURCE: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PARALLELISM: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(String),
    Dir(PathBuf),
}

impl Source {
    pub fn parse(raw: &str) -> Source {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Http(trimmed.to_string())
        } else {
            Source::Dir(PathBuf::from(trimmed))
        }
    }

    pub fn label(&self) -> String {
        match self {
            Source::Http(url) => url.clone(),
            Source::Dir(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: Source,
    pub timeout: Option<Duration>,
    pub parallelism: usize,
    pub export_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// Reads `SIZING_*` variables. Call `load_dotenv` first to pick up `.env` files.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Blank values and unparsable numbers fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let source = var("SIZING_SOURCE")
            .map(|val| Source::parse(&val))
            .unwrap_or_else(|| Source::Http(DEFAULT_SOURCE.to_string()));
        let timeout_secs = var("SIZING_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let parallelism = var("SIZING_FETCH_PARALLELISM")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_PARALLELISM)
            .clamp(1, 14);
        let export_dir = var("SIZING_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let log_dir = var("SIZING_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Self {
            source,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            parallelism,
            export_dir,
            log_dir,
        }
    }

    pub fn build_fetcher(&self) -> Result<Arc<dyn Fetch>> {
        let fetcher: Arc<dyn Fetch> = match &self.source {
            Source::Http(url) => Arc::new(
                HttpFetcher::new(url, self.timeout)
                    .with_context(|| format!("failed to set up fetcher for {url}"))?,
            ),
            Source::Dir(path) => Arc::new(DirFetcher::new(path.clone())),
        };
        Ok(fetcher)
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_parse_picks_scheme() {
        assert_eq!(
            Source::parse(" https://sizing.example.com/ "),
            Source::Http("https://sizing.example.com/".to_string())
        );
        assert_eq!(
            Source::parse("./public"),
            Source::Dir(PathBuf::from("./public"))
        );
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let cfg = AppConfig::from_lookup(lookup(&[("SIZING_SOURCE", "   ")]));
        assert_eq!(cfg.source, Source::Http(DEFAULT_SOURCE.to_string()));
        assert_eq!(cfg.timeout, Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        assert_eq!(cfg.parallelism, DEFAULT_PARALLELISM);
        assert_eq!(cfg.export_dir, PathBuf::from("."));
        assert_eq!(cfg.log_dir, env::temp_dir());
    }

    #[test]
    fn zero_timeout_disables_it() {
        let cfg = AppConfig::from_lookup(lookup(&[("SIZING_TIMEOUT_SECS", "0")]));
        assert_eq!(cfg.timeout, None);

        let cfg = AppConfig::from_lookup(lookup(&[("SIZING_TIMEOUT_SECS", " 3 ")]));
        assert_eq!(cfg.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn parallelism_is_clamped() {
        let low = AppConfig::from_lookup(lookup(&[("SIZING_FETCH_PARALLELISM", "0")]));
        assert_eq!(low.parallelism, 1);
        let high = AppConfig::from_lookup(lookup(&[("SIZING_FETCH_PARALLELISM", "99")]));
        assert_eq!(high.parallelism, 14);
    }

    #[test]
    fn invalid_numbers_fall_back_to_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("SIZING_TIMEOUT_SECS", "soon"),
            ("SIZING_FETCH_PARALLELISM", "-2"),
        ]));
        assert_eq!(cfg.timeout, Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)));
        assert_eq!(cfg.parallelism, DEFAULT_PARALLELISM);
    }

    #[test]
    fn directory_source_and_paths_are_read() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("SIZING_SOURCE", "./public"),
            ("SIZING_EXPORT_DIR", "/tmp/exports"),
            ("SIZING_LOG_DIR", "/tmp/logs"),
        ]));
        assert_eq!(cfg.source, Source::Dir(PathBuf::from("./public")));
        assert_eq!(cfg.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(cfg.log_dir, PathBuf::from("/tmp/logs"));
    }
}
