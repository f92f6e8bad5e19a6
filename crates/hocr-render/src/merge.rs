//! Word merging: collapsing a set of recognized word spans into one.
//!
//! Downstream consumers (catalog matching, manual correction) often know
//! that several adjacent word detections form a single logical token. A
//! merge removes those words from the rendered view and replaces them with
//! one synthesized word covering their combined area.

use std::collections::HashSet;

use hocr_core::{BBox, HocrDocument, HocrNode, Result};

/// One recorded merge, applied as an overlay at render time.
///
/// The parsed tree itself is never mutated; the renderer works on its own
/// view of the data.
#[derive(Debug, Clone)]
pub(crate) struct WordMerge {
    /// Id of the first merged word; the synthesized word is emitted in its
    /// place and under its id.
    pub(crate) target_id: String,
    /// Ids of every merged word; all but the target are dropped from the
    /// output.
    pub(crate) removed_ids: HashSet<String>,
    /// Enclosing bbox over the merged words' boxes, when any had one.
    pub(crate) bbox: Option<BBox>,
    /// Minimum confidence over the merged words, or 100 when the caller
    /// supplied replacement text.
    pub(crate) confidence: f64,
    /// The synthesized word's text.
    pub(crate) text: String,
}

impl WordMerge {
    /// Collects the merge data for `word_ids` from `document`.
    ///
    /// Ids that match no element are skipped; returns `None` when nothing
    /// matched (the merge is a no-op). A word without a confidence counts
    /// as confidence 0; a word without a bbox contributes nothing to the
    /// enclosing box.
    pub(crate) fn collect(
        document: &HocrDocument,
        word_ids: &[&str],
        replacement: Option<&str>,
    ) -> Result<Option<Self>> {
        let mut found: Vec<HocrNode<'_>> = Vec::new();
        for id in word_ids {
            match document.iter().find(|node| node.id() == Some(*id)) {
                Some(node) => found.push(node),
                None => log::warn!("merge_words: no element with id {id}, skipping"),
            }
        }

        let Some(first) = found.first() else {
            return Ok(None);
        };

        let target_id = first.id().unwrap_or_default().to_string();
        let mut removed_ids = HashSet::new();
        let mut texts = Vec::new();
        let mut confidence = f64::INFINITY;
        let mut boxes = Vec::new();

        for word in &found {
            if let Some(id) = word.id() {
                removed_ids.insert(id.to_string());
            }
            texts.push(word.ocr_text());
            confidence = confidence.min(word.confidence()?.unwrap_or(0.0));
            if let Some(bbox) = word.bbox()? {
                boxes.push(bbox);
            }
        }

        let text = match replacement {
            Some(content) => {
                confidence = 100.0;
                content.to_string()
            }
            None => texts.join(" "),
        };

        Ok(Some(Self {
            target_id,
            removed_ids,
            bbox: BBox::max_bbox(&boxes),
            confidence,
            text,
        }))
    }

    /// Whether `id` belongs to this merge's removed set.
    pub(crate) fn removes(&self, id: &str) -> bool {
        self.removed_ids.contains(id)
    }
}
