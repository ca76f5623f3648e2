use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use reqwest::header::{CONTENT_LENGTH, ETAG};
use reqwest::Client;

use crate::sources::error::FetchError;
use crate::sources::types::{CacheStatus, FetchOutcome, SourceDescriptor};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// What the remote says about a resource without sending its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMeta {
    pub etag: Option<String>,
    pub size: Option<u64>,
}

/// Keeps local copies of remote TLE feeds fresh.
pub struct SourceCache {
    client: Client,
    cache_dir: PathBuf,
}

impl SourceCache {
    pub fn new(cache_dir: PathBuf, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { client, cache_dir })
    }

    pub fn cached_path(&self, source: &SourceDescriptor) -> PathBuf {
        self.cache_dir.join(&source.file)
    }

    /// Returns a path to ready-to-read content for `source`, downloading it
    /// when the remote copy changed. The descriptor's tag and size are only
    /// updated after a successful download.
    pub async fn fetch(&self, source: &mut SourceDescriptor) -> Result<FetchOutcome, FetchError> {
        let path = self.cached_path(source);
        let cached = file_exists_and_not_empty(&path);

        let remote = match self.head(&source.url).await {
            Ok(remote) => remote,
            Err(e) if cached && e.is_recoverable() => {
                log::warn!("HEAD {} failed ({}), using saved copy", source.url, e);
                return Ok(self.stale(source, path));
            }
            Err(e) if e.is_recoverable() => {
                log::warn!("HEAD {} failed ({}), trying a plain download", source.url, e);
                RemoteMeta {
                    etag: None,
                    size: None,
                }
            }
            Err(e) => return Err(e),
        };

        if cached && remote.etag == source.etag && remote.size == source.size {
            log::info!(
                "Using saved TLE data {} ({} old)",
                source.file,
                describe_age(&path)
            );
            return Ok(FetchOutcome {
                path,
                status: CacheStatus::Current,
            });
        }

        log::info!("Retrieving TLE data from {}", source.url);
        match self.download(&source.url, &path).await {
            Ok(fetched) => {
                source.etag = remote.etag.or(fetched.etag);
                source.size = remote.size.or(fetched.size);
                log::info!("{} updated", source.file);
                Ok(FetchOutcome {
                    path,
                    status: CacheStatus::Fresh,
                })
            }
            Err(e) if cached && e.is_recoverable() => {
                log::warn!("Download of {} failed ({}), using saved copy", source.url, e);
                Ok(self.stale(source, path))
            }
            Err(e) if e.is_recoverable() => {
                Err(FetchError::Unavailable(format!("{} ({})", source.name, e)))
            }
            Err(e) => Err(e),
        }
    }

    /// Conditional metadata request: entity tag and byte size only.
    pub async fn head(&self, url: &str) -> Result<RemoteMeta, FetchError> {
        let response = self.client.head(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        Ok(meta_from_headers(response.headers()))
    }

    async fn download(&self, url: &str, path: &Path) -> Result<RemoteMeta, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let mut meta = meta_from_headers(response.headers());
        let body = response.bytes().await?;
        meta.size = meta.size.or(Some(body.len() as u64));

        // Write to a temporary file first to avoid partial downloads
        let mut temp_path = path.as_os_str().to_owned();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);
        let write_err = |source| FetchError::Write {
            path: path.display().to_string(),
            source,
        };
        fs::write(&temp_path, &body).map_err(write_err)?;
        fs::rename(&temp_path, path).map_err(write_err)?;
        Ok(meta)
    }

    fn stale(&self, source: &SourceDescriptor, path: PathBuf) -> FetchOutcome {
        log::info!(
            "Using saved TLE data {} ({} old)",
            source.file,
            describe_age(&path)
        );
        FetchOutcome {
            path,
            status: CacheStatus::Stale,
        }
    }
}

fn meta_from_headers(headers: &reqwest::header::HeaderMap) -> RemoteMeta {
    let etag = headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let size = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    RemoteMeta { etag, size }
}

/// Ensure that the cache directory exists and accepts writes.
pub fn ensure_cache_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let marker = dir.join(".write-test");
    fs::write(&marker, b"")?;
    fs::remove_file(marker)
}

pub(crate) fn file_exists_and_not_empty(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.len() > 0,
        Err(_) => false,
    }
}

fn describe_age(path: &Path) -> String {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .map(|age| humantime::format_duration(Duration::from_secs(age.as_secs())).to_string())
        .unwrap_or_else(|| "unknown age".to_string())
}
