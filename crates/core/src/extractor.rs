use crate::error::ExtractionError;
use lopdf::Document;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

pub trait PdfExtractor {
    /// Pages in physical order. Pages without extractable text are omitted.
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractionError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, ExtractionError> {
        let file = File::open(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document =
            Document::load_from(BufReader::new(file)).map_err(|error| ExtractionError::PdfParse {
                path: path.to_path_buf(),
                details: error.to_string(),
            })?;

        let mut pages = Vec::new();
        for (page_no, _page_id) in document.get_pages() {
            let text = match document.extract_text(&[page_no]) {
                Ok(text) => text,
                Err(error) => {
                    debug!(path = %path.display(), page = page_no, %error, "page text unsupported");
                    continue;
                }
            };

            if text.trim().is_empty() {
                debug!(path = %path.display(), page = page_no, "page has no text");
                continue;
            }

            pages.push(PageText {
                number: page_no,
                text,
            });
        }

        Ok(pages)
    }
}

/// Writes a minimal text-only PDF, one page per entry. Blank entries become
/// pages without a content stream.
#[cfg(test)]
pub(crate) fn write_text_pdf(
    path: &Path,
    pages: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    use lopdf::content::Operation;
    use lopdf::Object;

    let pages = pages
        .iter()
        .map(|text| {
            if text.trim().is_empty() {
                return Vec::new();
            }
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        })
        .collect();
    write_pdf_operations(path, pages)
}

/// One page per operation list; an empty list leaves the page without contents.
#[cfg(test)]
pub(crate) fn write_pdf_operations(
    path: &Path,
    pages: Vec<Vec<lopdf::content::Operation>>,
) -> Result<(), Box<dyn std::error::Error>> {
    use lopdf::content::Content;
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for operations in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        if !operations.is_empty() {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            page.set("Contents", content_id);
        }
        kids.push(Object::from(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path)?;
    Ok(())
}
