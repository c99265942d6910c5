//! Error types for the nfrecon-core library.

use thiserror::Error;

/// Main error type for the nfrecon library.
#[derive(Error, Debug)]
pub enum NfreconError {
    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading an XML invoice into an element tree.
#[derive(Error, Debug)]
pub enum XmlError {
    /// The underlying reader rejected the input.
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: u64, message: String },

    /// The document ended with open elements.
    #[error("unclosed element <{0}>")]
    UnclosedElement(String),

    /// A closing tag did not match the open element.
    #[error("expected </{expected}>, found </{found}>")]
    MismatchedEnd { expected: String, found: String },

    /// The input had no elements at all.
    #[error("document has no root element")]
    Empty,
}

/// Errors an extractor recovers from by returning an empty record.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The source document could not be parsed.
    #[error("malformed document: {0}")]
    MalformedDocument(#[from] XmlError),

    /// The source could not be read.
    #[error("failed to read source: {0}")]
    Read(#[from] std::io::Error),
}

/// Result type for the nfrecon library.
pub type Result<T> = std::result::Result<T, NfreconError>;
