use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::PipelineError;
use crate::models::{DigestRequest, Report, ReportMetadata, ScoredChunk, TopChunk};

/// Assembles the report. Ranks follow the order of `top_chunks`, starting at 1.
pub fn build_report(
    input_documents: &[String],
    request: &DigestRequest,
    timestamp: DateTime<Utc>,
    top_chunks: &[ScoredChunk],
    refined_text: &str,
) -> Report {
    Report {
        metadata: ReportMetadata {
            input_documents: input_documents.to_vec(),
            persona: request.persona.clone(),
            job_to_be_done: request.job_to_be_done.clone(),
            timestamp,
        },
        top_chunks: top_chunks
            .iter()
            .zip(1u32..)
            .map(|(scored, rank)| TopChunk {
                document: scored.chunk.source_file().to_string(),
                page: scored.chunk.page(),
                section_title: scored.chunk.section_title().to_string(),
                importance_rank: rank,
            })
            .collect(),
        refined_text: refined_text.to_string(),
    }
}

/// Writes the report as 2-space indented JSON. The file is staged next to
/// `path` and renamed into place, so readers never see a partial report.
pub async fn write_report(path: &Path, report: &Report) -> Result<(), PipelineError> {
    let mut bytes = serde_json::to_vec_pretty(report)?;
    bytes.push(b'\n');

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let staging = staging_path(path);
    if let Err(error) = tokio::fs::write(&staging, &bytes).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(error.into());
    }
    if let Err(error) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(error.into());
    }

    info!(path = %path.display(), top_chunks = report.top_chunks.len(), "report written");
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "report.json".into());
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn scored(text: &str, page: u32, file: &str, score: f64) -> ScoredChunk {
        ScoredChunk {
            chunk: Chunk::new(text, page, file).expect("valid chunk"),
            score,
        }
    }

    fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn ranks_are_contiguous_from_one() {
        let top = vec![
            scored("beaches", 3, "south.pdf", 0.9),
            scored("hotels", 1, "north.pdf", 0.7),
            scored("museums", 8, "south.pdf", 0.4),
        ];
        let request = DigestRequest::new("Travel Planner", "Plan a trip");
        let documents = vec!["north.pdf".to_string(), "south.pdf".to_string()];

        let report = build_report(&documents, &request, fixed_timestamp(), &top, "digest");

        let ranks: Vec<u32> = report.top_chunks.iter().map(|c| c.importance_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(report.top_chunks[0].document, "south.pdf");
        assert_eq!(report.top_chunks[0].page, 3);
        assert_eq!(report.top_chunks[0].section_title, "Page 3");
        assert_eq!(report.metadata.input_documents, documents);
        assert_eq!(report.refined_text, "digest");
    }

    #[test]
    fn serialized_shape_matches_output_contract() {
        let top = vec![scored("beaches", 2, "south.pdf", 0.9)];
        let request = DigestRequest::new("Travel Planner", "Plan a trip");
        let report = build_report(
            &["south.pdf".to_string()],
            &request,
            fixed_timestamp(),
            &top,
            "digest",
        );

        let value = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(
            value,
            serde_json::json!({
                "metadata": {
                    "input_documents": ["south.pdf"],
                    "persona": "Travel Planner",
                    "job_to_be_done": "Plan a trip",
                    "timestamp": "2024-05-01T12:30:00Z"
                },
                "top_chunks": [
                    { "document": "south.pdf", "page": 2, "section_title": "Page 2", "importance_rank": 1 }
                ],
                "refined_text": "digest"
            })
        );
    }

    #[tokio::test]
    async fn written_report_round_trips_and_leaves_no_staging_file(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("out").join("result.json");
        let report = build_report(
            &["a.pdf".to_string()],
            &DigestRequest::new("Analyst", "Review revenue"),
            fixed_timestamp(),
            &[scored("revenue grew", 1, "a.pdf", 0.5)],
            "summary",
        );

        write_report(&path, &report).await?;

        let written = std::fs::read_to_string(&path)?;
        assert!(written.starts_with("{\n  \"metadata\""));
        let parsed: Report = serde_json::from_str(&written)?;
        assert_eq!(parsed, report);
        assert!(!dir.path().join("out").join("result.json.partial").exists());
        Ok(())
    }
}
