pub mod archive;
mod cache;
mod error;
mod freshness;
mod pipeline;
mod types;

pub use cache::{ensure_cache_dir, SourceCache};
pub use error::{ArchiveError, FetchError};
pub use freshness::FreshnessStore;
pub use pipeline::{build_catalog, SourceReport};
pub use types::{CacheStatus, FetchOutcome, HexColor, SourceDescriptor};
