mod error;
mod feed;
mod ingest;
mod parser;
mod record;

pub use error::{FetchError, IngestError, ParseError};
pub use feed::{ElementFeed, FileFeed, HttpFeed, StaticFeed};
pub use ingest::Ingestor;
pub use parser::{parse_feed, ValidationMode};
pub use record::OrbitalElementRecord;
