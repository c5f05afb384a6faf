//! Rust models matching the database schema.

use unfurl_common::MetadataRecord;

/// A row of the `metadata_cache` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedMetadata {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub site_name: Option<String>,
    /// Unix epoch seconds at which the row was written.
    pub cached_at: i64,
}

impl CachedMetadata {
    /// Build a row from a record at the given write time.
    ///
    /// Social fields are derived from the title on read and are not
    /// persisted.
    pub fn from_record(record: &MetadataRecord, cached_at: i64) -> Self {
        Self {
            url: record.canonical_url.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            image_url: record.image_url.clone(),
            site_name: record.site_name.clone(),
            cached_at,
        }
    }

    /// Convert back into the in-memory record shape.
    pub fn into_record(self) -> MetadataRecord {
        let mut record = MetadataRecord::new(&self.url);
        record.title = self.title;
        record.description = self.description;
        record.image_url = self.image_url;
        record.site_name = self.site_name;
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_record() {
        let mut record = MetadataRecord::new("https://example.com/a");
        record.title = Some("Hello".to_string());
        record.site_name = Some("Example".to_string());

        let row = CachedMetadata::from_record(&record, 1_700_000_000);
        assert_eq!(row.cached_at, 1_700_000_000);

        let back = row.into_record();
        assert_eq!(back, record);
    }
}
