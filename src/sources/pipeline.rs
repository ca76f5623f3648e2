use std::fs;
use std::path::Path;

use serde::Serialize;
use utoipa::ToSchema;

use crate::catalog::{Catalog, Ingested, ParseReport, SourceTag, TleParser};
use crate::sources::archive;
use crate::sources::cache::SourceCache;
use crate::sources::types::{CacheStatus, HexColor, SourceDescriptor};

/// What one source contributed to the catalog.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SourceReport {
    pub name: String,
    pub color: HexColor,
    pub path: Option<String>,
    pub status: Option<CacheStatus>,
    pub records: usize,
    pub replaced: usize,
    pub rejected: usize,
    pub error: Option<String>,
}

impl SourceReport {
    fn new(source: &SourceDescriptor) -> Self {
        Self {
            name: source.name.clone(),
            color: source.color.clone(),
            path: None,
            status: None,
            records: 0,
            replaced: 0,
            rejected: 0,
            error: None,
        }
    }
}

/// Fetches every source in manifest order and merges the records into one
/// catalog. A failing source is reported and skipped.
pub async fn build_catalog(
    cache: &SourceCache,
    sources: &mut [SourceDescriptor],
) -> (Catalog, Vec<SourceReport>) {
    let mut catalog = Catalog::new();
    let mut reports = Vec::with_capacity(sources.len());

    for source in sources.iter_mut() {
        log::info!("Processing {}", source.name);
        let mut report = SourceReport::new(source);

        let outcome = match cache.fetch(source).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::error!("Failed to get TLE data for {}: {}", source.name, e);
                report.error = Some(e.to_string());
                reports.push(report);
                continue;
            }
        };
        report.status = Some(outcome.status);

        let content_path = match archive::expand(&outcome.path) {
            Ok(path) => path,
            Err(e) => {
                log::error!("Failed to expand {}: {}", outcome.path.display(), e);
                report.error = Some(e.to_string());
                reports.push(report);
                continue;
            }
        };
        report.path = Some(content_path.display().to_string());

        match load_file(&content_path, source.tag()) {
            Ok(parsed) => {
                log::info!(
                    "{} TLEs loaded from {}",
                    parsed.records.len(),
                    content_path.display()
                );
                report.rejected = parsed.rejected.len();
                for record in parsed.records {
                    report.records += 1;
                    if let Ingested::Replaced(_) = catalog.ingest(record) {
                        report.replaced += 1;
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to read {}: {}", content_path.display(), e);
                report.error = Some(e.to_string());
            }
        }
        reports.push(report);
    }

    log::info!("Catalog holds {} unique bodies", catalog.len());
    (catalog, reports)
}

/// Reads a TLE file, tolerating non UTF-8 bytes.
pub fn load_file(path: &Path, tag: SourceTag) -> std::io::Result<ParseReport> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(TleParser::new(tag).parse(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{tle_text, ISS, NOAA_18, NOAA_20};
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn unreachable_url(file: &str) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/{}", addr, file)
    }

    #[tokio::test]
    async fn merges_cached_sources_and_skips_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("visual.txt"), tle_text(&[ISS, NOAA_18])).unwrap();

        let zip_path = dir.path().join("ALL_TLE.ZIP");
        let mut zip = ZipWriter::new(fs::File::create(&zip_path).unwrap());
        zip.start_file("ALL_TLE.TXT", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(tle_text(&[("ISS", ISS.1, ISS.2), NOAA_20]).as_bytes())
            .unwrap();
        zip.finish().unwrap();

        let mut sources = vec![
            SourceDescriptor::new(
                "Celestrak visual",
                &unreachable_url("visual.txt"),
                "visual.txt",
                "#00ff00",
            ),
            SourceDescriptor::new(
                "Missing",
                &unreachable_url("missing.txt"),
                "missing.txt",
                "#ff0000",
            ),
            SourceDescriptor::new(
                "AUS-CITY all",
                &unreachable_url("ALL_TLE.ZIP"),
                "ALL_TLE.ZIP",
                "#ffffff",
            ),
        ];
        let cache = SourceCache::new(dir.path().to_path_buf(), "test").unwrap();
        let (catalog, reports) = build_catalog(&cache, &mut sources).await;

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.all()[0].name, "ISS");
        assert_eq!(catalog.all()[0].source.label, "AUS-CITY all");

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].records, 2);
        assert_eq!(reports[0].status, Some(CacheStatus::Stale));
        assert!(reports[1].error.is_some());
        assert_eq!(reports[1].records, 0);
        assert_eq!(reports[2].records, 2);
        assert_eq!(reports[2].replaced, 1);
    }

    #[tokio::test]
    async fn corrupt_archive_only_drops_that_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("classfd.zip"), b"not a zip").unwrap();
        fs::write(dir.path().join("visual.txt"), tle_text(&[ISS])).unwrap();

        let mut sources = vec![
            SourceDescriptor::new(
                "McCants",
                &unreachable_url("classfd.zip"),
                "classfd.zip",
                "#000000",
            ),
            SourceDescriptor::new(
                "visual",
                &unreachable_url("visual.txt"),
                "visual.txt",
                "#00ff00",
            ),
        ];
        let cache = SourceCache::new(dir.path().to_path_buf(), "test").unwrap();
        let (catalog, reports) = build_catalog(&cache, &mut sources).await;

        assert_eq!(catalog.len(), 1);
        assert!(reports[0].error.is_some());
        assert_eq!(reports[1].records, 1);
    }

    /// Serves `body` at /feed.txt.
    async fn serve_text(body: &'static str) -> String {
        let app = axum::Router::new()
            .route("/feed.txt", axum::routing::get(move || async move { body }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/feed.txt", addr)
    }

    #[tokio::test]
    async fn unwritable_destination_only_drops_that_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blocked"), "a file, not a directory").unwrap();
        fs::write(dir.path().join("visual.txt"), tle_text(&[ISS, NOAA_18])).unwrap();
        let url = serve_text("fresh feed").await;

        let mut sources = vec![
            SourceDescriptor::new("Blocked", &url, "blocked/feed.txt", "#ff0000"),
            SourceDescriptor::new(
                "visual",
                &unreachable_url("visual.txt"),
                "visual.txt",
                "#00ff00",
            ),
        ];
        let cache = SourceCache::new(dir.path().to_path_buf(), "test").unwrap();
        let (catalog, reports) = build_catalog(&cache, &mut sources).await;

        assert_eq!(catalog.len(), 2);
        let error = reports[0].error.as_deref().unwrap();
        assert!(error.starts_with("cannot write cache file"), "{}", error);
        assert_eq!(reports[0].records, 0);
        assert_eq!(reports[1].records, 2);
        assert_eq!(sources[0].etag, None);
    }

    #[test]
    fn load_file_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.txt");
        let mut bytes = b"ISS \xff\n".to_vec();
        bytes.extend_from_slice(format!("{}\n{}\n", ISS.1, ISS.2).as_bytes());
        fs::write(&path, bytes).unwrap();

        let parsed = load_file(&path, crate::test_support::source_tag("odd")).unwrap();
        assert_eq!(parsed.records.len(), 1);
    }
}
