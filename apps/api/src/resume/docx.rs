//! Minimal DOCX text extraction.
//!
//! A .docx file is a zip archive; the document body lives in
//! `word/document.xml`. We only need the visible text runs, so the reader
//! collects `<w:t>` character data and inserts a newline at each paragraph
//! close. Styling, tables and headers are ignored.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

pub fn extract_docx_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file).context("Not a valid DOCX archive")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX archive has no document body")?
        .read_to_string(&mut xml)
        .context("Failed to read document body")?;

    document_text(&xml)
}

/// Collects text runs from the WordprocessingML body.
fn document_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();

    loop {
        match reader.read_event().context("Malformed document XML")? {
            Event::Text(t) => {
                text.push_str(&t.unescape().context("Malformed character data")?);
            }
            // Paragraph boundary
            Event::End(e) if e.name().as_ref() == b"w:p" => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Senior backend engineer</w:t></w:r></w:p>
    <w:p><w:r><w:t>5 years of experience with distributed systems &amp; APIs</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn collects_paragraph_text_with_breaks() {
        let text = document_text(SAMPLE_DOCUMENT).unwrap();
        assert!(text.contains("Senior backend engineer\n"));
        assert!(text.contains("distributed systems & APIs"));
    }

    #[test]
    fn extracts_from_zip_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.docx");

        let file = std::fs::File::create(&path).unwrap();
        let mut archive = zip::ZipWriter::new(file);
        archive
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        archive.write_all(SAMPLE_DOCUMENT.as_bytes()).unwrap();
        archive.finish().unwrap();

        let text = extract_docx_text(&path).unwrap();
        assert!(text.contains("Senior backend engineer"));
    }

    #[test]
    fn rejects_non_zip_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.doc");
        std::fs::write(&path, b"this is not a zip archive").unwrap();

        assert!(extract_docx_text(&path).is_err());
    }
}
