use crate::chunking::{chunk_page, ChunkingConfig};
use crate::error::ExtractionError;
use crate::extractor::PdfExtractor;
use crate::models::Chunk;
use crate::sentences::SentenceTokenizer;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// `*.pdf` files directly inside `folder`, sorted by path. A missing or
/// unreadable folder is an error, not an empty listing.
pub fn discover_pdf_files(folder: &Path) -> io::Result<Vec<PathBuf>> {
    if !std::fs::metadata(folder)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", folder.display()),
        ));
    }

    let mut files = Vec::new();

    for item in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = item.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    Ok(files)
}

/// Final path component, lossily decoded. Non-UTF-8 bytes become U+FFFD.
pub fn document_name(path: &Path) -> Result<String, ExtractionError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ExtractionError::MissingFileName(path.to_path_buf()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    /// File names of every input, readable or not, in input order.
    pub documents: Vec<String>,
    pub chunks: Vec<Chunk>,
    pub skipped_files: Vec<SkippedPdf>,
}

/// Chunks every page of `path`, tagging chunks with `name`.
pub fn chunk_document(
    path: &Path,
    name: &str,
    extractor: &dyn PdfExtractor,
    tokenizer: &dyn SentenceTokenizer,
    config: ChunkingConfig,
) -> Result<Vec<Chunk>, ExtractionError> {
    let pages = extractor.extract_pages(path)?;

    let mut chunks = Vec::new();
    for page in pages {
        let page_chunks = chunk_page(&page.text, page.number, name, config, tokenizer);
        debug!(document = %name, page = page.number, chunks = page_chunks.len(), "page chunked");
        chunks.extend(page_chunks);
    }

    Ok(chunks)
}

/// Chunks every file, recording unreadable ones instead of failing.
pub fn ingest_files_best_effort(
    files: &[PathBuf],
    extractor: &dyn PdfExtractor,
    tokenizer: &dyn SentenceTokenizer,
    config: ChunkingConfig,
) -> IngestionReport {
    let mut documents = Vec::with_capacity(files.len());
    let mut chunks = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let result = match document_name(path) {
            Ok(name) => {
                let result = chunk_document(path, &name, extractor, tokenizer, config);
                documents.push(name);
                result
            }
            Err(error) => {
                documents.push(path.to_string_lossy().into_owned());
                Err(error)
            }
        };

        match result {
            Ok(file_chunks) => chunks.extend(file_chunks),
            Err(error) => {
                warn!(path = %path.display(), %error, "skipped pdf");
                skipped_files.push(SkippedPdf {
                    path: path.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    IngestionReport {
        documents,
        chunks,
        skipped_files,
    }
}
