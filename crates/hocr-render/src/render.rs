//! The converter: parsed hOCR in, positioned styled HTML out.
//!
//! The output mirrors the source layout: one `.ocr_page` div per page,
//! sized from the page bbox, with areas, paragraphs, lines, and words as
//! absolutely positioned children offset against their enclosing box. Word
//! spans carry their recognized text, a `data-confidence` attribute, and a
//! font size derived from the median line height of their paragraph.

use hocr_core::{BBox, HocrDocument, HocrNode, Result};
use serde::{Deserialize, Serialize};

use crate::merge::WordMerge;

/// Fixed stylesheet emitted into the output document head.
const DOCUMENT_STYLE: &str = "#ocr_document { width: 100%; }\n\
.ocr_page { margin: 0 auto; border: 1px solid black; }\n";

/// Settings controlling the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Factor applied to every position and dimension in the output.
    pub scaling_factor: f64,
}

impl Default for RenderSettings {
    #[inline]
    fn default() -> Self {
        Self { scaling_factor: 1.0 }
    }
}

/// Renders a parsed hOCR document into a positioned HTML view.
///
/// The converter never mutates the parsed tree; recorded word merges are
/// applied as an overlay while rendering.
///
/// # Examples
///
/// ```
/// use hocr_core::HocrDocument;
/// use hocr_render::{Converter, RenderSettings};
///
/// let markup = "<html><body>\
///     <div class='ocr_page' title='bbox 0 0 200 100'></div>\
/// </body></html>";
/// let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8")?;
/// let converter = Converter::new(&document, RenderSettings::default());
/// let html = converter.render()?;
/// assert!(html.contains("class=\"ocr_page\""));
/// # Ok::<(), hocr_core::HocrError>(())
/// ```
pub struct Converter<'a> {
    document: &'a HocrDocument,
    settings: RenderSettings,
    merges: Vec<WordMerge>,
}

impl<'a> Converter<'a> {
    /// Creates a converter over `document`.
    #[must_use]
    pub fn new(document: &'a HocrDocument, settings: RenderSettings) -> Self {
        Self {
            document,
            settings,
            merges: Vec::new(),
        }
    }

    /// Records a merge of the word nodes named by `word_ids`.
    ///
    /// The rendered output drops the named words and emits one synthesized
    /// word in place of the first: its bbox is the enclosing box over the
    /// removed words, its confidence the minimum of theirs, and its text
    /// the space-joined originals. Supplying `replacement` overrides the
    /// text and forces the confidence to 100. Ids that match nothing are
    /// skipped; a set that matches nothing at all is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates [`hocr_core::HocrError::MalformedOcr`] from the merged
    /// words' bbox or confidence properties.
    pub fn merge_words(&mut self, word_ids: &[&str], replacement: Option<&str>) -> Result<()> {
        if let Some(merge) = WordMerge::collect(self.document, word_ids, replacement)? {
            self.merges.push(merge);
        }
        Ok(())
    }

    /// Renders the document to its styled HTML string.
    ///
    /// Nodes without a bbox cannot be positioned and are skipped with a
    /// warning; the core stays strict, the renderer is lenient.
    ///
    /// # Errors
    ///
    /// Propagates [`hocr_core::HocrError::MalformedOcr`] from any rendered
    /// node with a malformed bbox or confidence property.
    pub fn render(&self) -> Result<String> {
        let mut out = String::with_capacity(4096);
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n<style>\n");
        out.push_str(DOCUMENT_STYLE);
        out.push_str("</style>\n</head>\n<body>\n<div id=\"ocr_document\">\n");

        let root = self
            .document
            .body()
            .unwrap_or_else(|| self.document.root());
        for page in root.pages() {
            self.render_page(&mut out, page)?;
        }

        out.push_str("</div>\n</body>\n</html>\n");
        Ok(out)
    }

    fn render_page(&self, out: &mut String, page: HocrNode<'_>) -> Result<()> {
        let Some(bbox) = page.bbox()? else {
            log::warn!("skipping page {:?} without bbox", page.id());
            return Ok(());
        };

        let scale = self.settings.scaling_factor;
        out.push_str(&format!(
            "<div class=\"ocr_page\"{} style=\"height: {}px; width: {}px; position: relative;\">\n",
            id_attr(&page),
            scale * bbox.height() as f64,
            scale * bbox.width() as f64,
        ));

        for area in page.areas() {
            self.render_area(out, area)?;
        }

        out.push_str("</div>\n");
        Ok(())
    }

    fn render_area(&self, out: &mut String, area: HocrNode<'_>) -> Result<()> {
        let Some(style) = self.positioned_style(&area)? else {
            log::warn!("skipping area {:?} without bbox", area.id());
            return Ok(());
        };

        out.push_str(&format!(
            "<div class=\"ocr_area\"{} style=\"{style}\">\n",
            id_attr(&area)
        ));
        for paragraph in area.paragraphs() {
            self.render_paragraph(out, paragraph)?;
        }
        out.push_str("</div>\n");
        Ok(())
    }

    fn render_paragraph(&self, out: &mut String, paragraph: HocrNode<'_>) -> Result<()> {
        let Some(style) = self.positioned_style(&paragraph)? else {
            log::warn!("skipping paragraph {:?} without bbox", paragraph.id());
            return Ok(());
        };

        out.push_str(&format!(
            "<div class=\"ocr_paragraph\"{} style=\"{style}\">\n",
            id_attr(&paragraph)
        ));

        let lines = paragraph.lines();
        let median_height = self.median_line_height(&lines)?;
        for line in lines {
            self.render_line(out, line, median_height)?;
        }

        out.push_str("</div>\n");
        Ok(())
    }

    fn render_line(&self, out: &mut String, line: HocrNode<'_>, median_height: f64) -> Result<()> {
        let Some(style) = self.positioned_style(&line)? else {
            log::warn!("skipping line {:?} without bbox", line.id());
            return Ok(());
        };

        out.push_str(&format!(
            "<div class=\"ocr_line\"{} style=\"{style}\">\n",
            id_attr(&line)
        ));
        for word in line.words() {
            self.render_word(out, word, median_height)?;
        }
        out.push_str("</div>\n");
        Ok(())
    }

    fn render_word(&self, out: &mut String, word: HocrNode<'_>, median_height: f64) -> Result<()> {
        if let Some(id) = word.id() {
            if let Some(merge) = self.merges.iter().find(|m| m.removes(id)) {
                if merge.target_id == id {
                    return self.render_merged_word(out, &word, merge, median_height);
                }
                // dropped by the merge; the target carries the content
                return Ok(());
            }
        }

        let Some(style) = self.positioned_style(&word)? else {
            log::warn!("skipping word {:?} without bbox", word.id());
            return Ok(());
        };

        let confidence = word.confidence()?.unwrap_or(0.0);
        self.emit_word_span(out, id_attr(&word), &style, confidence, &word.ocr_text(), median_height);
        Ok(())
    }

    fn render_merged_word(
        &self,
        out: &mut String,
        word: &HocrNode<'_>,
        merge: &WordMerge,
        median_height: f64,
    ) -> Result<()> {
        let Some(bbox) = merge.bbox else {
            log::warn!("skipping merged word {} without bbox", merge.target_id);
            return Ok(());
        };

        // same coordinate-frame translation the core applies in rel_bbox
        let rel = match word.parent_bbox()? {
            Some(parent) => BBox::new(
                bbox.x0 - parent.x0,
                bbox.y0 - parent.y0,
                bbox.x1 - parent.x0,
                bbox.y1 - parent.y0,
            ),
            None => bbox,
        };

        let scale = self.settings.scaling_factor;
        let style = format!(
            "position: absolute; top: {}px; left: {}px; height: {}px; width: {}px; \
             overflow: visible; white-space: nowrap;",
            scale * rel.y0 as f64,
            scale * rel.x0 as f64,
            scale * bbox.height() as f64,
            scale * bbox.width() as f64,
        );
        let id = format!(" id=\"{}\"", escape_attr(&merge.target_id));
        self.emit_word_span(out, id, &style, merge.confidence, &merge.text, median_height);
        Ok(())
    }

    fn emit_word_span(
        &self,
        out: &mut String,
        id_attr: String,
        style: &str,
        confidence: f64,
        text: &str,
        median_height: f64,
    ) {
        out.push_str(&format!(
            "<span class=\"ocr_word\"{id_attr} style=\"{style} font-size: {}px;\" \
             data-confidence=\"{confidence}\">{}</span>\n",
            0.8 * median_height,
            escape_text(text),
        ));
    }

    /// Absolute-positioning style for a node, offset against the closest
    /// ancestor bbox (the node's output parent carries that same box).
    fn positioned_style(&self, node: &HocrNode<'_>) -> Result<Option<String>> {
        let Some(bbox) = node.bbox()? else {
            return Ok(None);
        };
        let Some(rel) = node.rel_bbox()? else {
            return Ok(None);
        };

        let scale = self.settings.scaling_factor;
        Ok(Some(format!(
            "position: absolute; top: {}px; left: {}px; height: {}px; width: {}px; \
             overflow: visible; white-space: nowrap;",
            scale * rel.y0 as f64,
            scale * rel.x0 as f64,
            scale * bbox.height() as f64,
            scale * bbox.width() as f64,
        )))
    }

    /// Median height over the lines' boxes, scaled. Lines without a bbox
    /// are left out; no lines with a bbox yields 0.
    fn median_line_height(&self, lines: &[HocrNode<'_>]) -> Result<f64> {
        let mut heights = Vec::new();
        for line in lines {
            if let Some(bbox) = line.bbox()? {
                heights.push(bbox.height());
            }
        }

        if heights.is_empty() {
            return Ok(0.0);
        }

        heights.sort_unstable();
        let middle = (heights.len() - 1) / 2;
        let median = if heights.len() % 2 == 1 {
            heights[middle] as f64
        } else {
            (heights[middle] + heights[middle + 1]) as f64 / 2.0
        };

        Ok(self.settings.scaling_factor * median)
    }
}

fn id_attr(node: &HocrNode<'_>) -> String {
    match node.id() {
        Some(id) => format!(" id=\"{}\"", escape_attr(id)),
        None => String::new(),
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKUP: &str = "<html><body>\
        <div class='ocr_page' id='page_1' title='bbox 0 0 1000 600'>\
         <div class='ocr_carea' id='block_1' title='bbox 10 10 900 560'>\
          <p class='ocr_par' id='par_1' title='bbox 10 10 900 560'>\
           <span class='ocr_line' id='line_1' title='bbox 10 10 900 60'>\
            <span class='ocrx_word' id='w1' title='bbox 10 10 200 60; x_wconf 90'>Acme</span>\
            <span class='ocrx_word' id='w2' title='bbox 220 10 400 60; x_wconf 75'>Super</span>\
            <span class='ocrx_word' id='w3' title='bbox 420 10 640 60; x_wconf 82'>Widget</span>\
           </span>\
          </p>\
         </div>\
        </div>\
    </body></html>";

    fn document() -> HocrDocument {
        HocrDocument::from_bytes(MARKUP.as_bytes(), "utf-8").unwrap()
    }

    #[test]
    fn test_render_positions_the_page() {
        let document = document();
        let converter = Converter::new(&document, RenderSettings::default());
        let html = converter.render().unwrap();

        assert!(html.contains("<div id=\"ocr_document\">"));
        assert!(html.contains(
            "<div class=\"ocr_page\" id=\"page_1\" style=\"height: 600px; width: 1000px; position: relative;\">"
        ));
    }

    #[test]
    fn test_render_offsets_children_against_the_enclosing_box() {
        let document = document();
        let converter = Converter::new(&document, RenderSettings::default());
        let html = converter.render().unwrap();

        // area at (10, 10) within the page at (0, 0)
        assert!(html.contains("class=\"ocr_area\" id=\"block_1\" style=\"position: absolute; top: 10px; left: 10px;"));
        // first word is flush with its line's origin
        assert!(html.contains("id=\"w1\" style=\"position: absolute; top: 0px; left: 0px; height: 50px; width: 190px;"));
    }

    #[test]
    fn test_render_emits_words_with_confidence_and_font_size() {
        let document = document();
        let converter = Converter::new(&document, RenderSettings::default());
        let html = converter.render().unwrap();

        // one line of height 50 -> median 50 -> font size 40
        assert!(html.contains("font-size: 40px;"));
        assert!(html.contains("data-confidence=\"90\">Acme</span>"));
        assert!(html.contains("data-confidence=\"82\">Widget</span>"));
    }

    #[test]
    fn test_render_applies_the_scaling_factor() {
        let document = document();
        let converter = Converter::new(&document, RenderSettings { scaling_factor: 2.0 });
        let html = converter.render().unwrap();

        assert!(html.contains("height: 1200px; width: 2000px; position: relative;"));
        assert!(html.contains("font-size: 80px;"));
    }

    #[test]
    fn test_render_applies_word_merges() {
        let document = document();
        let mut converter = Converter::new(&document, RenderSettings::default());
        converter.merge_words(&["w2", "w3"], None).unwrap();
        let html = converter.render().unwrap();

        // w2 anchors the synthesized word; w3 is gone
        assert!(html.contains("data-confidence=\"75\">Super Widget</span>"));
        assert!(!html.contains("id=\"w3\""));
        // merged box (220, 10, 640, 60) relative to the line origin (10, 10)
        assert!(html.contains("id=\"w2\" style=\"position: absolute; top: 0px; left: 210px; height: 50px; width: 420px;"));
    }

    #[test]
    fn test_render_merge_with_replacement_text() {
        let document = document();
        let mut converter = Converter::new(&document, RenderSettings::default());
        converter.merge_words(&["w1", "w2"], Some("AcmeSuper")).unwrap();
        let html = converter.render().unwrap();

        assert!(html.contains("data-confidence=\"100\">AcmeSuper</span>"));
        assert!(!html.contains(">Acme</span>"));
    }

    #[test]
    fn test_render_escapes_word_text() {
        let markup = MARKUP.replace(">Acme<", ">&lt;Acme&amp;Co&gt;<");
        let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8").unwrap();
        let converter = Converter::new(&document, RenderSettings::default());
        let html = converter.render().unwrap();

        assert!(html.contains(">&lt;Acme&amp;Co&gt;</span>"));
    }

    #[test]
    fn test_pages_without_bbox_are_skipped() {
        let markup = "<html><body><div class='ocr_page' id='p'></div></body></html>";
        let document = HocrDocument::from_bytes(markup.as_bytes(), "utf-8").unwrap();
        let converter = Converter::new(&document, RenderSettings::default());
        let html = converter.render().unwrap();

        assert!(!html.contains("class=\"ocr_page\""));
        // the shell is still produced
        assert!(html.contains("<div id=\"ocr_document\">"));
    }
}
