//! Error types for hOCR parsing operations.

use thiserror::Error;

/// Error types that can occur while loading or interrogating an hOCR document.
///
/// All variants are hard, locally unrecoverable failures surfaced to the
/// direct caller of the operation that detected them. A malformed property on
/// one node fails only that node's property, bbox, or confidence access, not
/// the whole document.
///
/// # Examples
///
/// ```
/// use hocr_core::{HocrDocument, HocrError};
///
/// match HocrDocument::from_bytes(b"", "utf-8") {
///     Err(HocrError::EmptyDocument) => {}
///     other => panic!("expected EmptyDocument, got {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum HocrError {
    /// A `BBox` was constructed from wrong-shaped or non-integral input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A `title` attribute violated the hOCR property micro-syntax: a segment
    /// that does not split into key and value, a bbox with the wrong argument
    /// count or a non-integer argument, or a non-float confidence value.
    #[error("Malformed OCR properties: {0}")]
    MalformedOcr(String),

    /// The declared byte encoding is unknown or cannot decode the input.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The decoded input has zero length.
    #[error("Document is empty")]
    EmptyDocument,

    /// File I/O error while loading a document.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for [`Result<T, HocrError>`].
pub type Result<T> = std::result::Result<T, HocrError>;
