//! Parser for hOCR documents.
//!
//! hOCR is an HTML-based format for OCR output: element `class` attributes
//! carry tokens prefixed `ocr`/`ocrx` denoting semantic roles (page, column
//! area, paragraph, line, word), and `title` attributes carry a
//! semicolon-delimited list of `key value...` properties such as bounding
//! boxes and confidence scores.
//!
//! This crate exposes a structured, validated view over that markup:
//!
//! - [`HocrDocument`] owns the parsed tree, validates the input encoding and
//!   non-emptiness, and answers document-level queries (metadata, outer
//!   bounding box, full text).
//! - [`HocrNode`] is a cheap non-owning handle over one element, deriving
//!   its [`BBox`], confidence, class taxonomy, relative geometry, and
//!   normalized text on demand. Nothing is cached; every access reparses
//!   the underlying attributes.
//! - [`BBox`] is the XYXY pixel rectangle used throughout.
//!
//! ```
//! use hocr_core::{BBox, HocrDocument};
//!
//! let markup = "<html><body>\
//!     <div class='ocr_page' title='bbox 0 0 200 100'>\
//!         <span class='ocr_line' title='bbox 10 10 190 30'>\
//!             <span class='ocrx_word' title='bbox 10 10 90 30; x_wconf 96'>Hello</span>\
//!             <span class='ocrx_word' title='bbox 100 10 190 30; x_wconf 93'>world</span>\
//!         </span>\
//!     </div>\
//! </body></html>";
//!
//! let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8")?;
//! assert_eq!(document.bbox()?, Some(BBox::new(0, 0, 200, 100)));
//! assert_eq!(document.ocr_text(), "Hello world");
//! # Ok::<(), hocr_core::HocrError>(())
//! ```

pub mod bbox;
pub mod document;
pub mod error;
pub mod node;
pub mod properties;

pub use bbox::BBox;
pub use document::{Diagnostic, HocrDocument};
pub use error::{HocrError, Result};
pub use node::{ElementFamily, HocrNode};
pub use properties::{parse_properties, HocrProperties};
