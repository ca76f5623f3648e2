mod catalog;
mod error;
mod parser;
mod record;

pub use catalog::{Catalog, Ingested};
pub use error::FormatError;
pub use parser::{ParseReport, Rejected, TleParser, TleTriplet};
pub use record::{IdentityKey, OrbitalRecord, SourceTag};
