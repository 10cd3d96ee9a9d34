//! DOCX paragraph text extraction.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use super::DocumentTextExtractor;
use crate::error::{DocxError, ExtractionError};

const DOCUMENT_PART: &str = "word/document.xml";

/// Reads the main document part of a DOCX archive, one line per paragraph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTextExtractor;

impl DocxTextExtractor {
    fn read_document_part(data: &[u8]) -> Result<String, DocxError> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| DocxError::Archive(e.to_string()))?;

        let mut part = match archive.by_name(DOCUMENT_PART) {
            Ok(part) => part,
            Err(ZipError::FileNotFound) => return Err(DocxError::MissingDocument),
            Err(e) => return Err(DocxError::Archive(e.to_string())),
        };

        let mut xml = String::with_capacity(part.size() as usize);
        part.read_to_string(&mut xml)
            .map_err(|e| DocxError::Archive(e.to_string()))?;
        Ok(xml)
    }
}

impl DocumentTextExtractor for DocxTextExtractor {
    fn extract_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let xml = Self::read_document_part(data)?;
        let paragraphs = paragraphs(&xml)?;
        debug!("Read {} paragraphs from DOCX", paragraphs.len());
        Ok(paragraphs.join("\n"))
    }
}

/// Collect the text of every `w:p` element in document order.
///
/// Runs (`w:t`) are concatenated; `w:tab` becomes a tab and `w:br`/`w:cr`
/// a newline. Tab stops declared in paragraph properties are not runs and
/// are ignored.
fn paragraphs(xml: &str) -> Result<Vec<String>, DocxError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| DocxError::Xml(e.to_string()))?
        {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"r" => in_run = true,
                b"t" => in_text = in_run,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" if in_run => current.push('\t'),
                b"br" | b"cr" if in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e.unescape().map_err(|e| DocxError::Xml(e.to_string()))?;
                current.push_str(&text);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with(part: &str, xml: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file(part, SimpleFileOptions::default()).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn body(paragraphs: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}</w:body></w:document>"#
        )
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let xml = body(
            r#"<w:p><w:r><w:t>Sr no.: S001</w:t></w:r></w:p>
               <w:p><w:r><w:t xml:space="preserve">Name: </w:t></w:r><w:r><w:t>Hemanshu Kasar</w:t></w:r></w:p>
               <w:p/>
               <w:p><w:r><w:t>Address: 7, gurudeo nagar</w:t></w:r></w:p>"#,
        );
        let text = DocxTextExtractor
            .extract_text(&docx_with(DOCUMENT_PART, &xml))
            .unwrap();
        assert_eq!(
            text,
            "Sr no.: S001\nName: Hemanshu Kasar\n\nAddress: 7, gurudeo nagar"
        );
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let xml = body(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>
               <w:r><w:t>City:</w:t><w:tab/><w:t>Tom &amp; Jerry</w:t><w:br/><w:t>x</w:t></w:r></w:p>"#,
        );
        let text = DocxTextExtractor
            .extract_text(&docx_with(DOCUMENT_PART, &xml))
            .unwrap();
        assert_eq!(text, "City:\tTom & Jerry\nx");
    }

    #[test]
    fn test_missing_document_part() {
        let data = docx_with("word/styles.xml", "<w:styles/>");
        let err = DocxTextExtractor.extract_text(&data).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(DocxError::MissingDocument)));
        assert_eq!(
            err.to_string(),
            "Error extracting text from DOCX: missing word/document.xml"
        );
    }

    #[test]
    fn test_not_an_archive() {
        let err = DocxTextExtractor.extract_text(b"plain text").unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(DocxError::Archive(_))));
    }
}
