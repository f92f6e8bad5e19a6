//! Non-owning node handles over the parsed hOCR tree.
//!
//! [`HocrNode`] wraps a [`scraper::ElementRef`] and derives everything hOCR
//! encodes in the markup: the `ocr` class taxonomy, the `title` property
//! mapping, bounding-box geometry, confidence scores, and normalized text.
//! The tree is owned by [`HocrDocument`](crate::HocrDocument); handles borrow
//! from it and must not outlive it. All derived values are recomputed on
//! every access; callers that need stable values across repeated access
//! cache at the call site.

use std::collections::BTreeMap;

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

use crate::bbox::BBox;
use crate::error::{HocrError, Result};
use crate::properties::{parse_properties, HocrProperties};

/// The hOCR element families, identified by class-name convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementFamily {
    /// `ocr_page`
    Page,
    /// `ocr_carea`
    Area,
    /// `ocr_par`
    Paragraph,
    /// `ocr_line`
    Line,
    /// `ocrx_word` or `ocr_word`
    Word,
}

impl ElementFamily {
    /// Maps an hOCR class name to its element family.
    #[must_use]
    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            "ocr_page" => Some(Self::Page),
            "ocr_carea" => Some(Self::Area),
            "ocr_par" => Some(Self::Paragraph),
            "ocr_line" => Some(Self::Line),
            "ocrx_word" | "ocr_word" => Some(Self::Word),
            _ => None,
        }
    }

    /// The separator joining the text of this family's direct members:
    /// words in a line join with a space, lines in a paragraph with a
    /// newline, and everything above with a blank line.
    pub(crate) const fn child_separator(self) -> &'static str {
        match self {
            Self::Line | Self::Word => " ",
            Self::Paragraph => "\n",
            Self::Area | Self::Page => "\n\n",
        }
    }
}

impl std::fmt::Display for ElementFamily {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Page => "ocr_page",
            Self::Area => "ocr_carea",
            Self::Paragraph => "ocr_par",
            Self::Line => "ocr_line",
            Self::Word => "ocrx_word",
        };
        write!(f, "{s}")
    }
}

/// A non-owning view over one element of a parsed hOCR tree.
///
/// Cheap to copy; all accessors parse the underlying attributes on demand.
///
/// Two nodes compare equal when their subtrees are *functionally* equivalent
/// markup: attribute order, repeated spaces inside text, and whitespace
/// between tags are insignificant, while tag names, text content, and
/// attribute values are not.
#[derive(Debug, Clone, Copy)]
pub struct HocrNode<'a> {
    element: ElementRef<'a>,
}

impl<'a> HocrNode<'a> {
    /// Wraps an element handle of an externally owned tree.
    #[inline]
    #[must_use]
    pub fn from_element(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// The underlying element handle.
    #[inline]
    #[must_use]
    pub fn element(&self) -> ElementRef<'a> {
        self.element
    }

    /// The element's tag name.
    #[inline]
    #[must_use]
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// The element's `id` attribute.
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        self.element.value().attr("id")
    }

    /// The first class token starting with `ocr`.
    ///
    /// All elements defined by the hOCR specification carry a class name
    /// prefixed `ocr`/`ocrx`; an element whose class attribute has no such
    /// token is not an hOCR element.
    #[must_use]
    pub fn ocr_class(&self) -> Option<&'a str> {
        let classes = self.element.value().attr("class")?;
        classes
            .split_whitespace()
            .find(|token| token.starts_with("ocr"))
    }

    /// The element family of this node's [`ocr_class`](Self::ocr_class), if
    /// the class belongs to the page/area/paragraph/line/word taxonomy.
    #[must_use]
    pub fn element_family(&self) -> Option<ElementFamily> {
        self.ocr_class().and_then(ElementFamily::from_class)
    }

    /// Parses the node's `title` attribute into a property mapping.
    ///
    /// A missing or empty `title` yields an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns [`HocrError::MalformedOcr`] when a property segment does not
    /// split into key and value.
    pub fn properties(&self) -> Result<HocrProperties> {
        let title = self.element.value().attr("title").unwrap_or_default();
        parse_properties(title)
    }

    /// Parses the `bbox` property into a [`BBox`].
    ///
    /// The bbox is given in XYXY order: upper-left corner first, lower-right
    /// corner second, in pixels of the source image. An element without a
    /// `bbox` property yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`HocrError::MalformedOcr`] when the property value does not
    /// hold exactly four space-separated arguments, or when an argument does
    /// not parse as an integer.
    pub fn bbox(&self) -> Result<Option<BBox>> {
        let properties = self.properties()?;
        let Some(raw) = properties.get("bbox") else {
            return Ok(None);
        };

        let args: Vec<&str> = raw.split(' ').collect();
        if args.len() != 4 {
            return Err(HocrError::MalformedOcr(format!(
                "number of bbox arguments must be four (got {})",
                args.len()
            )));
        }

        let mut coords = [0i64; 4];
        for (slot, arg) in coords.iter_mut().zip(&args) {
            *slot = arg.parse::<i64>().map_err(|_| {
                HocrError::MalformedOcr(format!("bbox argument is not an integer: {arg}"))
            })?;
        }

        Ok(Some(BBox::new(coords[0], coords[1], coords[2], coords[3])))
    }

    /// Derives a single confidence value for this node.
    ///
    /// If `x_wconf` (whole-word confidence, 0–100) is present its value is
    /// returned, taking absolute precedence over `x_confs`. Otherwise, if
    /// `x_confs` (per-character confidences) is present, the arithmetic mean
    /// of its values is returned. With neither property, `Ok(None)`.
    ///
    /// The format also defines `nlp`, a per-character negative log
    /// probability. It is deliberately never read here: an NLP value is
    /// lower for higher-confidence input and the hOCR spec fixes no logarithm
    /// base, so it can neither be compared with nor averaged into the 0–100
    /// confidence scale.
    ///
    /// # Errors
    ///
    /// Returns [`HocrError::MalformedOcr`] when a present confidence value
    /// does not parse as a float.
    pub fn confidence(&self) -> Result<Option<f64>> {
        let properties = self.properties()?;

        if let Some(raw) = properties.get("x_wconf") {
            let value = raw.parse::<f64>().map_err(|_| {
                HocrError::MalformedOcr(format!("value of x_wconf must be a float: {raw}"))
            })?;
            return Ok(Some(value));
        }

        if let Some(raw) = properties.get("x_confs") {
            let mut sum = 0.0;
            let mut count = 0usize;
            for token in raw.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| {
                    HocrError::MalformedOcr(format!("values of x_confs must be floats: {token}"))
                })?;
                sum += value;
                count += 1;
            }
            if count > 0 {
                return Ok(Some(sum / count as f64));
            }
        }

        Ok(None)
    }

    /// The parent element, or `None` at the tree root.
    #[must_use]
    pub fn parent(&self) -> Option<HocrNode<'a>> {
        self.element
            .parent()
            .and_then(ElementRef::wrap)
            .map(Self::from_element)
    }

    /// Iterates over the direct child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = HocrNode<'a>> + 'a {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .map(Self::from_element)
    }

    /// Iterates over this element and its descendants, depth-first
    /// pre-order, yielding every element node including non-hOCR ones.
    pub fn descendants(&self) -> impl Iterator<Item = HocrNode<'a>> + 'a {
        self.element
            .descendants()
            .filter_map(ElementRef::wrap)
            .map(Self::from_element)
    }

    /// The bbox of the closest ancestor that exposes one.
    ///
    /// Walks strictly upward (self excluded) and returns the first bbox
    /// found, or `None` when no ancestor up to the root has one.
    ///
    /// # Errors
    ///
    /// Propagates [`HocrError::MalformedOcr`] from an ancestor whose bbox
    /// property is malformed.
    pub fn parent_bbox(&self) -> Result<Option<BBox>> {
        for ancestor in self.element.ancestors().filter_map(ElementRef::wrap) {
            if let Some(bbox) = Self::from_element(ancestor).bbox()? {
                return Ok(Some(bbox));
            }
        }
        Ok(None)
    }

    /// This node's bbox translated into the coordinate frame of the closest
    /// ancestor bbox.
    ///
    /// The coordinates in hOCR are absolute pixel positions in the source
    /// image. This subtracts the ancestor bbox's upper-left corner from both
    /// corners of this node's bbox. Returns `None` when this node has no
    /// bbox, and the absolute bbox unchanged when no ancestor has one.
    ///
    /// # Errors
    ///
    /// Propagates [`HocrError::MalformedOcr`] from a malformed bbox on this
    /// node or an ancestor.
    pub fn rel_bbox(&self) -> Result<Option<BBox>> {
        let Some(own) = self.bbox()? else {
            return Ok(None);
        };

        let Some(parent) = self.parent_bbox()? else {
            return Ok(Some(own));
        };

        Ok(Some(BBox::new(
            own.x0 - parent.x0,
            own.y0 - parent.y0,
            own.x1 - parent.x0,
            own.y1 - parent.y0,
        )))
    }

    /// All `ocr_page` descendants in document order.
    #[must_use]
    pub fn pages(&self) -> Vec<HocrNode<'a>> {
        self.family_members(ElementFamily::Page)
    }

    /// All `ocr_carea` descendants in document order.
    #[must_use]
    pub fn areas(&self) -> Vec<HocrNode<'a>> {
        self.family_members(ElementFamily::Area)
    }

    /// All `ocr_par` descendants in document order.
    #[must_use]
    pub fn paragraphs(&self) -> Vec<HocrNode<'a>> {
        self.family_members(ElementFamily::Paragraph)
    }

    /// All `ocr_line` descendants in document order.
    #[must_use]
    pub fn lines(&self) -> Vec<HocrNode<'a>> {
        self.family_members(ElementFamily::Line)
    }

    /// All word descendants (`ocrx_word` or `ocr_word`) in document order.
    #[must_use]
    pub fn words(&self) -> Vec<HocrNode<'a>> {
        self.family_members(ElementFamily::Word)
    }

    /// Descendants of the given family, arbitrarily nested, self excluded.
    fn family_members(&self, family: ElementFamily) -> Vec<HocrNode<'a>> {
        self.descendants()
            .skip(1)
            .filter(|node| node.element_family() == Some(family))
            .collect()
    }

    /// Reconstructs the human-readable text of this subtree.
    ///
    /// hOCR markup mixes literal whitespace with semantic structure; only
    /// the nesting level introduces whitespace into the result:
    ///
    /// - word text is kept as-is, with structural whitespace collapsed
    /// - words within a line join with a single space
    /// - lines within a paragraph join with a newline
    /// - paragraphs within an area, areas within a page, and pages within
    ///   the document join with a blank line
    /// - elements without an hOCR class are transparent: their content is
    ///   absorbed in document order as if inlined
    #[must_use]
    pub fn ocr_text(&self) -> String {
        match self.element_family() {
            Some(family) => subtree_text(self.element, family),
            None => {
                let mut fragments = Vec::new();
                collect_fragments(self.element, &mut fragments);
                fragments.join("\n\n")
            }
        }
    }

    /// Serializes this subtree to its HTML string form.
    #[must_use]
    pub fn html(&self) -> String {
        self.element.html()
    }
}

impl PartialEq for HocrNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        structurally_equivalent(self.element, other.element)
    }
}

/// Collapses every whitespace run to a single space and trims the ends.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of one classified subtree, joining members with the separator the
/// family implies.
fn subtree_text(element: ElementRef<'_>, family: ElementFamily) -> String {
    if family == ElementFamily::Word {
        let text: String = element.text().collect();
        return normalize_whitespace(&text);
    }

    let mut fragments = Vec::new();
    collect_fragments(element, &mut fragments);
    fragments.join(family.child_separator())
}

/// Gathers the text fragments produced by an element's children.
///
/// Classified children contribute their joined subtree text as one fragment;
/// unclassified wrapper elements are transparent and splice their own
/// children's fragments in place; loose text nodes participate directly.
/// Whitespace-only text is structural and dropped.
fn collect_fragments(element: ElementRef<'_>, fragments: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let normalized = normalize_whitespace(text);
            if !normalized.is_empty() {
                fragments.push(normalized);
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let node = HocrNode::from_element(child_element);
            match node.element_family() {
                Some(family) => {
                    let text = subtree_text(child_element, family);
                    if !text.is_empty() {
                        fragments.push(text);
                    }
                }
                None => collect_fragments(child_element, fragments),
            }
        }
    }
}

/// A child item with formatting noise removed, for structural comparison.
enum NormalizedChild<'a> {
    Text(String),
    Element(ElementRef<'a>),
}

/// Children of an element with whitespace-only text dropped and adjacent
/// text runs merged and collapsed. Comments are ignored.
fn normalized_children(element: ElementRef<'_>) -> Vec<NormalizedChild<'_>> {
    let mut out: Vec<NormalizedChild<'_>> = Vec::new();
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let normalized = normalize_whitespace(text);
            if normalized.is_empty() {
                continue;
            }
            if let Some(NormalizedChild::Text(previous)) = out.last_mut() {
                previous.push(' ');
                previous.push_str(&normalized);
            } else {
                out.push(NormalizedChild::Text(normalized));
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            out.push(NormalizedChild::Element(child_element));
        }
    }
    out
}

/// Functional markup equivalence: same tag, same attribute set regardless of
/// order, and recursively equivalent children with insignificant whitespace
/// collapsed away.
fn structurally_equivalent(a: ElementRef<'_>, b: ElementRef<'_>) -> bool {
    if a.value().name() != b.value().name() {
        return false;
    }

    let a_attrs: BTreeMap<&str, &str> = a.value().attrs().collect();
    let b_attrs: BTreeMap<&str, &str> = b.value().attrs().collect();
    if a_attrs != b_attrs {
        return false;
    }

    let a_children = normalized_children(a);
    let b_children = normalized_children(b);
    if a_children.len() != b_children.len() {
        return false;
    }

    a_children
        .iter()
        .zip(&b_children)
        .all(|(x, y)| match (x, y) {
            (NormalizedChild::Text(s), NormalizedChild::Text(t)) => s == t,
            (NormalizedChild::Element(e), NormalizedChild::Element(f)) => {
                structurally_equivalent(*e, *f)
            }
            _ => false,
        })
}
