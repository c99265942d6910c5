//! Text sources: the file-acquisition boundary of the pipeline.
//!
//! The reconciler never touches files directly. Collaborators hand it
//! something that can produce text: an in-memory string, a path on disk
//! (CLI) or a browser `Blob` (WASM).

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

/// How raw bytes are decoded into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, falling back to ISO-8859-1 for legacy exports.
    #[default]
    Default,
    /// UTF-8; invalid sequences are replaced.
    Utf8,
}

/// Something that can be read to text.
pub trait TextSource {
    /// Read the whole source as text.
    fn read_as_text(&self, encoding: TextEncoding) -> impl Future<Output = io::Result<String>>;

    /// Short description for logs.
    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

impl TextSource for str {
    async fn read_as_text(&self, _encoding: TextEncoding) -> io::Result<String> {
        Ok(self.to_string())
    }
}

impl TextSource for String {
    async fn read_as_text(&self, _encoding: TextEncoding) -> io::Result<String> {
        Ok(self.clone())
    }
}

/// A document on the local filesystem.
///
/// With the `native` feature reads go through `tokio::fs`, so several
/// sources joined together read concurrently; this needs a tokio runtime.
/// Without it the read blocks the calling task.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileSource {
    async fn read_as_text(&self, encoding: TextEncoding) -> io::Result<String> {
        #[cfg(feature = "native")]
        let bytes = tokio::fs::read(&self.path).await?;
        #[cfg(not(feature = "native"))]
        let bytes = std::fs::read(&self.path)?;
        Ok(decode_text(bytes, encoding))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Decode raw bytes per `encoding`, dropping a leading byte-order mark.
pub fn decode_text(bytes: Vec<u8>, encoding: TextEncoding) -> String {
    let text = match encoding {
        TextEncoding::Default => match String::from_utf8(bytes) {
            Ok(text) => text,
            // ISO-8859-1 maps every byte to the code point of the same value.
            Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
        },
        TextEncoding::Utf8 => String::from_utf8_lossy(&bytes).into_owned(),
    };

    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_utf8() {
        let bytes = "Produto;Açúcar".as_bytes().to_vec();
        assert_eq!(decode_text(bytes.clone(), TextEncoding::Default), "Produto;Açúcar");
        assert_eq!(decode_text(bytes, TextEncoding::Utf8), "Produto;Açúcar");
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "Ação" in ISO-8859-1
        let bytes = vec![0x41, 0xe7, 0xe3, 0x6f];
        assert_eq!(decode_text(bytes.clone(), TextEncoding::Default), "Ação");
        assert_eq!(decode_text(bytes, TextEncoding::Utf8), "A\u{fffd}\u{fffd}o");
    }

    #[test]
    fn test_decode_strips_bom() {
        let bytes = b"\xef\xbb\xbf<NFe/>".to_vec();
        assert_eq!(decode_text(bytes.clone(), TextEncoding::Default), "<NFe/>");
        assert_eq!(decode_text(bytes, TextEncoding::Utf8), "<NFe/>");
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laudo.csv");
        std::fs::write(&path, "Nota;1234").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.read_as_text(TextEncoding::Utf8).await.unwrap(), "Nota;1234");
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let source = FileSource::new("/nonexistent/nfe.xml");
        assert!(source.read_as_text(TextEncoding::Default).await.is_err());
    }
}
