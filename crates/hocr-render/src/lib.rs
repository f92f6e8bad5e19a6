//! Styled-HTML rendering for parsed hOCR documents.
//!
//! Takes the structured view exposed by [`hocr_core`] and rebuilds it as a
//! normalized HTML document whose pages, areas, paragraphs, lines, and
//! words are absolutely positioned from their bounding boxes, so the
//! recognized text can be overlaid, inspected, or post-processed visually.
//!
//! Word spans can be merged before rendering (see
//! [`Converter::merge_words`]): useful when several adjacent detections are
//! known to form one logical token, e.g. a product name matched against a
//! catalog.

pub mod render;

mod merge;

pub use render::{Converter, RenderSettings};
