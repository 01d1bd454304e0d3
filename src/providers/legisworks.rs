//! # Legisworks Historical Statute Store
//!
//! ## Purpose
//! Read-only access to the Legisworks historical Statutes at Large datasets:
//! one YAML file per physical volume, each listing the entries printed in
//! that volume with their start page, page count and law identification.
//!
//! An absent volume file is treated as an empty dataset rather than an
//! error; the datasets only cover the historical volumes and citations into
//! uncovered volumes simply find no match.

use crate::errors::Result;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

/// One entry of a historical volume dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VolumeEntry {
    pub volume: u32,
    pub page: u32,
    /// Number of pages the entry spans; absent for single-page entries in
    /// some dataset revisions
    #[serde(default)]
    pub npages: Option<u32>,
    #[serde(default)]
    pub congress: Option<u32>,
    #[serde(default)]
    pub number: Option<u32>,
    /// Entry kind: "publaw", "chap" (pre-modern chapter numbering),
    /// "private", ...
    #[serde(rename = "type", default)]
    pub entry_type: Option<String>,
    /// Legislative session within the congress, where numbering restarted
    #[serde(default)]
    pub session: Option<u32>,
    /// Citation text as printed in the volume index
    #[serde(default)]
    pub citation: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Subject line used by older volumes that carry no title
    #[serde(default)]
    pub topic: Option<String>,
    /// Scanned PDF file name within the volume
    #[serde(default)]
    pub file: Option<String>,
}

impl VolumeEntry {
    /// Best available display title
    pub fn display_title(&self) -> Option<String> {
        self.title.clone().or_else(|| self.topic.clone())
    }

    /// Whether the entry is a law in a citable numbering scheme
    pub fn is_law(&self) -> bool {
        matches!(self.entry_type.as_deref(), Some("publaw") | Some("chap"))
    }

    /// Half-open page containment: the entry starts on `page` or the target
    /// falls inside its page span.
    pub fn contains_page(&self, page: u32) -> bool {
        if self.page == page {
            return true;
        }
        match self.npages {
            Some(npages) => self.page <= page && page < self.page + npages,
            None => false,
        }
    }
}

/// Local per-volume dataset store
pub struct LegisworksStore {
    data_dir: PathBuf,
}

impl LegisworksStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Whether the dataset directory is present at all (health checks)
    pub fn dataset_present(&self) -> bool {
        self.data_dir.is_dir()
    }

    /// Load all entries of one volume. Returns an empty list when the
    /// dataset for that volume is absent.
    pub async fn lookup_historical_volume(&self, volume: u32) -> Result<Vec<VolumeEntry>> {
        let path = self.data_dir.join(format!("{volume:03}.yaml"));
        if !path.exists() {
            debug!(volume, "no dataset for volume");
            return Ok(Vec::new());
        }
        let body = tokio::fs::read_to_string(&path).await?;
        let entries: Vec<VolumeEntry> = serde_yaml::from_str(&body)?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_page() {
        let entry = VolumeEntry {
            volume: 50,
            page: 100,
            npages: Some(5),
            ..VolumeEntry::default()
        };
        assert!(entry.contains_page(100));
        assert!(entry.contains_page(102));
        assert!(entry.contains_page(104));
        assert!(!entry.contains_page(105));
        assert!(!entry.contains_page(106));
        assert!(!entry.contains_page(99));

        let single = VolumeEntry {
            volume: 50,
            page: 100,
            npages: None,
            ..VolumeEntry::default()
        };
        assert!(single.contains_page(100));
        assert!(!single.contains_page(101));
    }

    #[tokio::test]
    async fn test_lookup_reads_volume_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("050.yaml"),
            r#"
- volume: 50
  page: 100
  npages: 5
  type: publaw
  congress: 74
  number: 1
  title: Example Act
  file: example.pdf
"#,
        )
        .unwrap();

        let store = LegisworksStore::new(dir.path().to_path_buf());
        let entries = store.lookup_historical_volume(50).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].congress, Some(74));
        assert!(entries[0].is_law());
        assert_eq!(entries[0].display_title().as_deref(), Some("Example Act"));
    }

    #[tokio::test]
    async fn test_absent_volume_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LegisworksStore::new(dir.path().to_path_buf());
        let entries = store.lookup_historical_volume(7).await.unwrap();
        assert!(entries.is_empty());
    }
}
