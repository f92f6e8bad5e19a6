//! hOCR document loading and document-level queries.

use encoding_rs::Encoding;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::bbox::BBox;
use crate::error::{HocrError, Result};
use crate::node::HocrNode;

/// A non-fatal issue detected while interrogating a document.
///
/// The hOCR spec requires exactly one `ocr-system` and one
/// `ocr-capabilities` metadata field per document; this implementation
/// enforces the requirement as a warning, not a hard failure. Warnings are
/// also emitted through the [`log`] facade at the point of detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The metadata field the diagnostic concerns.
    pub field: String,
    /// Human-readable description of the issue.
    pub message: String,
}

impl Diagnostic {
    fn missing_meta(field: &str) -> Self {
        Self {
            field: field.to_string(),
            message: format!("missing required metadata: no meta tag named {field}"),
        }
    }
}

/// An owned, parsed hOCR document.
///
/// Owns the parsed tree for the document lifetime and is read-only after
/// construction; [`HocrNode`] handles borrow from it.
///
/// # Examples
///
/// ```
/// use hocr_core::HocrDocument;
///
/// let markup = "<html><body>\
///     <div class='ocr_page' title='bbox 0 0 1000 1400'>\
///         <span class='ocrx_word' title='bbox 10 10 60 30; x_wconf 96'>Foo</span>\
///     </div>\
/// </body></html>";
/// let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8")?;
/// let page = document.iter().find(|n| n.ocr_class() == Some("ocr_page")).unwrap();
/// assert_eq!(page.words().len(), 1);
/// # Ok::<(), hocr_core::HocrError>(())
/// ```
pub struct HocrDocument {
    html: Html,
}

impl HocrDocument {
    /// Decodes `bytes` with the declared encoding and parses the result.
    ///
    /// The encoding label is resolved per the WHATWG encoding standard
    /// (`"utf-8"`, `"iso-8859-1"`, `"shift_jis"`, ...).
    ///
    /// # Errors
    ///
    /// - [`HocrError::Encoding`] when the label is unknown or the bytes are
    ///   not valid in the declared encoding.
    /// - [`HocrError::EmptyDocument`] when the decoded content has zero
    ///   length.
    pub fn from_bytes(bytes: &[u8], encoding_label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(encoding_label.as_bytes()).ok_or_else(|| {
            HocrError::Encoding(format!("unknown encoding label: {encoding_label}"))
        })?;

        let (decoded, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            return Err(HocrError::Encoding(format!(
                "input is not valid {}",
                encoding.name()
            )));
        }

        if decoded.is_empty() {
            return Err(HocrError::EmptyDocument);
        }

        Ok(Self {
            html: Html::parse_document(&decoded),
        })
    }

    /// Reads a file and parses it with [`from_bytes`](Self::from_bytes).
    ///
    /// # Errors
    ///
    /// [`HocrError::Io`] on read failure, plus everything `from_bytes`
    /// returns.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P, encoding_label: &str) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, encoding_label)
    }

    /// The root `<html>` element.
    #[must_use]
    pub fn root(&self) -> HocrNode<'_> {
        HocrNode::from_element(self.html.root_element())
    }

    /// The `<body>` element, or `None` when the document has none.
    #[must_use]
    pub fn body(&self) -> Option<HocrNode<'_>> {
        let selector = Selector::parse("body").ok()?;
        self.html
            .select(&selector)
            .next()
            .map(HocrNode::from_element)
    }

    /// The content of the `meta[name='ocr-system']` tag, which names the
    /// software that produced the document.
    ///
    /// Absence is a warning, not an error: `None` is returned, a warning is
    /// logged, and [`metadata_diagnostics`](Self::metadata_diagnostics)
    /// reports the issue. Multiple matching tags silently use the first.
    #[must_use]
    pub fn ocr_system(&self) -> Option<String> {
        match self.meta_content("ocr-system") {
            Some(content) => Some(content.to_string()),
            None => {
                log::warn!("missing required metadata: ocr-system");
                None
            }
        }
    }

    /// The capability tokens declared by `meta[name='ocr-capabilities']`:
    /// the hOCR element classes and properties a consumer can expect to
    /// encounter in this document.
    ///
    /// Absence is a warning, not an error: an empty list is returned.
    #[must_use]
    pub fn ocr_capabilities(&self) -> Vec<String> {
        match self.meta_content("ocr-capabilities") {
            Some(content) => content.split_whitespace().map(str::to_string).collect(),
            None => {
                log::warn!("missing required metadata: ocr-capabilities");
                Vec::new()
            }
        }
    }

    /// Structured channel for the non-fatal metadata warnings: one
    /// [`Diagnostic`] per missing required meta tag, empty when the
    /// document declares both.
    #[must_use]
    pub fn metadata_diagnostics(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for field in ["ocr-system", "ocr-capabilities"] {
            if self.meta_content(field).is_none() {
                diagnostics.push(Diagnostic::missing_meta(field));
            }
        }
        diagnostics
    }

    /// Iterates the tree depth-first pre-order, starting at the body (or
    /// the root when no body exists), yielding every element node
    /// including non-hOCR ones.
    pub fn iter(&self) -> impl Iterator<Item = HocrNode<'_>> {
        self.body().unwrap_or_else(|| self.root()).descendants()
    }

    /// The outer bbox enclosing every bbox in the tree.
    ///
    /// Collects the bbox of every node seen by [`iter`](Self::iter) and
    /// aggregates with [`BBox::max_bbox`]; `None` when no node has one.
    ///
    /// # Errors
    ///
    /// Propagates [`HocrError::MalformedOcr`] from any node whose bbox
    /// property is malformed.
    pub fn bbox(&self) -> Result<Option<BBox>> {
        let mut boxes = Vec::new();
        for node in self.iter() {
            if let Some(bbox) = node.bbox()? {
                boxes.push(bbox);
            }
        }
        Ok(BBox::max_bbox(&boxes))
    }

    /// Reconstructs the text of the whole document; pages join with a
    /// blank line. See [`HocrNode::ocr_text`].
    #[must_use]
    pub fn ocr_text(&self) -> String {
        self.body().unwrap_or_else(|| self.root()).ocr_text()
    }

    fn meta_content(&self, name: &str) -> Option<&str> {
        let selector = Selector::parse(&format!("meta[name='{name}']")).ok()?;
        self.html
            .select(&selector)
            .next()
            .and_then(|meta| meta.value().attr("content"))
    }
}

impl std::fmt::Debug for HocrDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HocrDocument")
            .field("ocr_system", &self.meta_content("ocr-system"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "<html><head>\
        <meta name='ocr-system' content='tesseract 4.0.0-beta.1'/>\
        <meta name='ocr-capabilities' content='ocr_page ocr_line ocrx_word'/>\
    </head><body>\
        <div class='ocr_page' title='bbox 0 0 1000 1000'>\
            <span class='ocr_line' title='bbox 25 25 975 80'>\
                <span class='ocrx_word' title='bbox 25 25 150 80; x_wconf 93'>Foo</span>\
            </span>\
        </div>\
    </body></html>";

    #[test]
    fn test_from_bytes_empty() {
        assert!(matches!(
            HocrDocument::from_bytes(b"", "utf-8"),
            Err(HocrError::EmptyDocument)
        ));
    }

    #[test]
    fn test_from_bytes_unknown_encoding_label() {
        let err = HocrDocument::from_bytes(b"<html></html>", "no-such-charset").unwrap_err();
        match err {
            HocrError::Encoding(msg) => assert!(msg.contains("no-such-charset")),
            other => panic!("expected Encoding, got {other:?}"),
        }
    }

    #[test]
    fn test_from_bytes_wrong_declared_encoding() {
        // "café" encoded as latin-1; 0xE9 is not valid UTF-8
        let bytes = b"<html><body>caf\xe9</body></html>";
        assert!(matches!(
            HocrDocument::from_bytes(bytes, "utf-8"),
            Err(HocrError::Encoding(_))
        ));
        // with the correct declaration it decodes fine
        assert!(HocrDocument::from_bytes(bytes, "iso-8859-1").is_ok());
    }

    #[test]
    fn test_root_and_body() {
        let document = HocrDocument::from_bytes(VALID.as_bytes(), "utf-8").unwrap();
        assert_eq!(document.root().tag_name(), "html");
        assert_eq!(document.body().unwrap().tag_name(), "body");
    }

    #[test]
    fn test_ocr_system() {
        let document = HocrDocument::from_bytes(VALID.as_bytes(), "utf-8").unwrap();
        assert_eq!(
            document.ocr_system().as_deref(),
            Some("tesseract 4.0.0-beta.1")
        );
    }

    #[test]
    fn test_ocr_capabilities() {
        let document = HocrDocument::from_bytes(VALID.as_bytes(), "utf-8").unwrap();
        assert_eq!(
            document.ocr_capabilities(),
            vec!["ocr_page", "ocr_line", "ocrx_word"]
        );
    }

    #[test]
    fn test_missing_metadata_is_nonfatal() {
        let document =
            HocrDocument::from_bytes(b"<html><body><p>Foo</p></body></html>", "utf-8").unwrap();
        assert_eq!(document.ocr_system(), None);
        assert!(document.ocr_capabilities().is_empty());

        let diagnostics = document.metadata_diagnostics();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].field, "ocr-system");
        assert_eq!(diagnostics[1].field, "ocr-capabilities");
    }

    #[test]
    fn test_multiple_meta_tags_use_first() {
        let markup = "<html><head>\
            <meta name='ocr-system' content='first'/>\
            <meta name='ocr-system' content='second'/>\
        </head><body></body></html>";
        let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8").unwrap();
        assert_eq!(document.ocr_system().as_deref(), Some("first"));
    }

    #[test]
    fn test_iter_yields_every_element() {
        let markup = "<html><body>\
            <div class='ocr_page'><br/><span>loose</span></div>\
        </body></html>";
        let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8").unwrap();
        let tags: Vec<&str> = document.iter().map(|n| n.tag_name()).collect();
        // body itself, then every element including non-hOCR ones
        assert_eq!(tags, vec!["body", "div", "br", "span"]);
    }

    #[test]
    fn test_document_bbox_none() {
        let document =
            HocrDocument::from_bytes(b"<html><body><p>Foo</p></body></html>", "utf-8").unwrap();
        assert_eq!(document.bbox().unwrap(), None);
    }

    #[test]
    fn test_document_bbox_single() {
        let document = HocrDocument::from_bytes(VALID.as_bytes(), "utf-8").unwrap();
        assert_eq!(document.bbox().unwrap(), Some(BBox::new(0, 0, 1000, 1000)));
    }

    #[test]
    fn test_document_bbox_aggregates_overlapping() {
        let markup = "<html><body>\
            <div title='bbox 25 25 1175 300'></div>\
            <div title='bbox 100 200 900 650'></div>\
        </body></html>";
        let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8").unwrap();
        assert_eq!(document.bbox().unwrap(), Some(BBox::new(25, 25, 1175, 650)));
    }

    #[test]
    fn test_document_bbox_propagates_malformed() {
        let markup = "<html><body><div title='bbox 1 2 3'></div></body></html>";
        let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8").unwrap();
        assert!(matches!(
            document.bbox(),
            Err(HocrError::MalformedOcr(_))
        ));
    }

    #[test]
    fn test_document_ocr_text() {
        let markup = "<html><body>\
            <div class='ocr_page'><p class='ocr_par'>\
                <span class='ocr_line'><span class='ocrx_word'>One</span></span>\
            </p></div>\
            <div class='ocr_page'><p class='ocr_par'>\
                <span class='ocr_line'><span class='ocrx_word'>Two</span></span>\
            </p></div>\
        </body></html>";
        let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8").unwrap();
        assert_eq!(document.ocr_text(), "One\n\nTwo");
    }
}
