use std::sync::Arc;

use super::error::IngestError;
use super::feed::ElementFeed;
use super::parser::{parse_feed, ValidationMode};
use super::record::OrbitalElementRecord;
use crate::metrics::PipelineMetrics;
use crate::store::{SharedCollection, StoreError};

pub struct Ingestor {
    feed: Box<dyn ElementFeed>,
    records: SharedCollection<OrbitalElementRecord>,
    mode: ValidationMode,
    metrics: Arc<PipelineMetrics>,
}

impl Ingestor {
    pub fn new(
        feed: Box<dyn ElementFeed>,
        records: SharedCollection<OrbitalElementRecord>,
        mode: ValidationMode,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            feed,
            records,
            mode,
            metrics,
        }
    }

    /// Fetches the feed and upserts every record in it. Returns the number of records written.
    pub async fn ingest(&self) -> Result<usize, IngestError> {
        log::info!("Fetching element sets from {}", self.feed.source());
        let content = self.feed.fetch().await.inspect_err(|e| {
            log::warn!("Element feed {} failed: {}", self.feed.source(), e);
        })?;
        self.ingest_text(&content)
    }

    /// Parses already-fetched feed text and upserts it in one batch.
    pub fn ingest_text(&self, content: &str) -> Result<usize, IngestError> {
        let records = parse_feed(content, self.mode)?;
        let count = self.records.upsert_all(&records)?;
        self.metrics.record_ingest(count);
        log::info!("Stored {} element sets", count);
        Ok(count)
    }

    pub fn records(&self) -> Result<Vec<OrbitalElementRecord>, StoreError> {
        self.records.find_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FetchError, StaticFeed};
    use crate::store::MemoryCollection;
    use async_trait::async_trait;

    struct DownFeed;

    #[async_trait]
    impl ElementFeed for DownFeed {
        async fn fetch(&self) -> Result<String, FetchError> {
            Err(FetchError::Status(503))
        }

        fn source(&self) -> &str {
            "down"
        }
    }

    const FEED: &str = "\
ALPHA
1 00011U 59001A   24001.00000000  .00000000  00000-0  00000-0 0  9990
2 00011  32.0000 000.0000 0001000 000.0000 000.0000 11.00000000000000
BRAVO
1 00012U 59002A   24001.00000000  .00000000  00000-0  00000-0 0  9990
2 00012  32.0000 000.0000 0001000 000.0000 000.0000 11.00000000000000
";

    fn ingestor(feed: Box<dyn ElementFeed>) -> (Ingestor, SharedCollection<OrbitalElementRecord>) {
        let records: SharedCollection<OrbitalElementRecord> = Arc::new(MemoryCollection::new());
        let ingestor = Ingestor::new(
            feed,
            records.clone(),
            ValidationMode::Permissive,
            Arc::new(PipelineMetrics::default()),
        );
        (ingestor, records)
    }

    #[tokio::test]
    async fn ingest_upserts_all_blocks() {
        let (ingestor, records) = ingestor(Box::new(StaticFeed::new(FEED)));
        assert_eq!(ingestor.ingest().await.unwrap(), 2);

        let stored = records.find_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].catalog_id, 11);
        assert_eq!(stored[1].name, "BRAVO");
    }

    #[tokio::test]
    async fn records_missing_from_a_new_feed_are_kept() {
        let (ingestor, records) = ingestor(Box::new(StaticFeed::new(FEED)));
        records
            .upsert(&OrbitalElementRecord {
                catalog_id: 99,
                name: "OLD".into(),
                line1: "1 00099U".into(),
                line2: "2 00099".into(),
            })
            .unwrap();

        ingestor.ingest().await.unwrap();
        let ids: Vec<u32> = records.find_all().unwrap().iter().map(|r| r.catalog_id).collect();
        assert_eq!(ids, vec![11, 12, 99]);
    }

    #[tokio::test]
    async fn parse_failure_writes_nothing() {
        let broken = format!("{}GAMMA\n1 ABCDEU\n2 ABCDE\n", FEED);
        let (ingestor, records) = ingestor(Box::new(StaticFeed::new(broken)));

        let err = ingestor.ingest().await.unwrap_err();
        assert!(matches!(err, IngestError::Parse(ref e) if e.block == 2));
        assert!(records.find_all().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_surfaced() {
        let (ingestor, _) = ingestor(Box::new(DownFeed));
        let err = ingestor.ingest().await.unwrap_err();
        assert!(matches!(err, IngestError::Fetch(FetchError::Status(503))));
    }
}
