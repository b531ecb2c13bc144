//! JSONL persistence for the final record set.
//!
//! Each run writes one UTF-8 file named
//! `rns_<method>_<UTC %Y%m%d_%H%M%S>.jsonl` under the output directory.
//! The first line is a `{"_metadata": ...}` object with the run
//! aggregates; every following line is one announcement record. Readers
//! are expected to skip lines they cannot parse.
//!
//! The timestamp makes filenames run-unique to second granularity; two
//! runs starting within the same second overwrite each other, which is an
//! accepted limitation of the naming scheme.

use crate::models::{Announcement, RunMetadata};
use chrono::Utc;
use serde_json::json;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Serialize the record set (metadata first) to a timestamped JSONL file.
///
/// Creates `out_dir` if absent and returns the written path. The caller
/// is responsible for not invoking this with an empty record set; a
/// zero-record run produces no file.
#[instrument(level = "info", skip_all, fields(out_dir = %out_dir.display(), method = %method))]
pub async fn write_records(
    records: &[Announcement],
    out_dir: &Path,
    method: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    fs::create_dir_all(out_dir).await?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let path = out_dir.join(format!("rns_{}_{}.jsonl", method, timestamp));

    let metadata = RunMetadata::compute(records);
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(serde_json::to_string(&json!({ "_metadata": metadata }))?);
    for record in records {
        lines.push(serde_json::to_string(record)?);
    }
    let mut body = lines.join("\n");
    body.push('\n');

    fs::write(&path, body).await?;
    info!(path = %path.display(), count = records.len(), "Wrote JSONL output");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RnsType;

    fn record(title: &str) -> Announcement {
        Announcement {
            title: title.to_string(),
            link: "https://example.com/a".to_string(),
            published: String::new(),
            summary: String::new(),
            category: String::new(),
            author: String::new(),
            guid: String::new(),
            source: "rss".to_string(),
            source_url: "https://example.com/rss".to_string(),
            source_priority: 1,
            ticker: "ACM".to_string(),
            company_name: "Acme Corp".to_string(),
            rns_type: RnsType::Results,
            scraped_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_records_layout() {
        let dir = std::env::temp_dir().join(format!("rns_writer_test_{}", std::process::id()));
        let records = vec![record("Acme Final Results"), record("Widget Dividend")];

        let path = write_records(&records, &dir, "all").await.unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("rns_all_"));
        assert_eq!(path.extension().unwrap(), "jsonl");

        let body = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["_metadata"]["total"], 2);
        assert_eq!(first["_metadata"]["by_source"]["rss"], 2);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["title"], "Acme Final Results");
        assert_eq!(second["rns_type"], "results");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_method_label_in_filename() {
        let dir = std::env::temp_dir().join(format!("rns_writer_label_{}", std::process::id()));
        let path = write_records(&[record("T")], &dir, "working").await.unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("rns_working_"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
