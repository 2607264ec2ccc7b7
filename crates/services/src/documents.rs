//! Plain-text extraction from uploaded resumes and job descriptions.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ExtractError;

const DOCX_BODY: &str = "word/document.xml";

/// Upload formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
    /// Both `.docx` and legacy `.doc` uploads; only the zipped format parses.
    Word,
}

impl DocumentKind {
    /// Picks a format from the MIME type, falling back to the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::Unsupported` if neither matches a known format.
    pub fn detect(file_name: &str, mime: Option<&str>) -> Result<Self, ExtractError> {
        if let Some(kind) = mime.and_then(Self::from_mime) {
            return Ok(kind);
        }
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "txt" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            "docx" | "doc" => Ok(Self::Word),
            _ => Err(ExtractError::Unsupported),
        }
    }

    fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("text/plain") {
            Some(Self::Text)
        } else if mime.contains("application/pdf") {
            Some(Self::Pdf)
        } else if mime.contains("application/msword")
            || mime.contains("officedocument.wordprocessingml.document")
        {
            Some(Self::Word)
        } else {
            None
        }
    }
}

/// Extracts the text of an uploaded document.
///
/// # Errors
///
/// Returns `ExtractError::Unsupported` for unknown formats and a format-specific
/// variant when the bytes cannot be parsed.
pub fn extract_text(
    bytes: &[u8],
    file_name: &str,
    mime: Option<&str>,
) -> Result<String, ExtractError> {
    let kind = DocumentKind::detect(file_name, mime)?;
    log::debug!(
        "extracting {kind:?} text from {file_name} ({} bytes)",
        bytes.len()
    );
    let text = match kind {
        DocumentKind::Text => String::from_utf8_lossy(bytes).into_owned(),
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Pdf(e.to_string()))?,
        DocumentKind::Word => docx_text(bytes)?,
    };
    Ok(text.trim().to_string())
}

fn docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(format!("not a zip archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|_| ExtractError::Docx(format!("missing {DOCX_BODY}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => current.push('\t'),
                b"br" => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| ExtractError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(format!("xml error: {e}"))),
            Ok(_) => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx(body: &str) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut out);
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            writer.start_file(DOCX_BODY, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        out.into_inner()
    }

    #[test]
    fn detects_by_mime_then_extension() {
        assert_eq!(
            DocumentKind::detect("resume.bin", Some("application/pdf")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::detect("resume.DOCX", None).unwrap(),
            DocumentKind::Word
        );
        assert_eq!(
            DocumentKind::detect("notes.txt", Some("text/plain; charset=utf-8")).unwrap(),
            DocumentKind::Text
        );
        assert_eq!(
            DocumentKind::detect("old.doc", Some("application/msword")).unwrap(),
            DocumentKind::Word
        );
    }

    #[test]
    fn rejects_unknown_formats() {
        let err = extract_text(b"GIF89a", "photo.gif", Some("image/gif")).unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported));
        assert_eq!(
            err.to_string(),
            "Unsupported file type. Please upload PDF, DOCX, or TXT."
        );
    }

    #[test]
    fn plain_text_is_trimmed() {
        let text = extract_text(b"  Senior Rust Engineer\n\n", "job.txt", None).unwrap();
        assert_eq!(text, "Senior Rust Engineer");
    }

    #[test]
    fn reads_word_paragraphs() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Skills: </w:t></w:r><w:r><w:t>Rust &amp; SQL</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let text = extract_text(&docx(body), "resume.docx", None).unwrap();
        assert_eq!(text, "Jane Doe\nSkills: Rust & SQL");
    }

    #[test]
    fn legacy_doc_bytes_fail_cleanly() {
        let err = extract_text(b"\xD0\xCF\x11\xE0not a zip", "old.doc", None).unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }
}
